//! Namespace-aware element walking over quick-xml.
//!
//! Both the morphology dictionary and the book files are consumed as a flat
//! stream of open/close/text nodes with the element depth attached, which is
//! all the descendant queries in this crate need.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::io::BufRead;

use crate::errors::MarkupError;

pub(crate) enum Node<'a, 'e> {
    Open {
        depth: usize,
        namespace: Option<&'a str>,
        element: &'a BytesStart<'e>,
    },
    Close {
        depth: usize,
    },
    Text(&'a str),
}

/// Stream every node of the document to `visit`.
///
/// The root element sits at depth 0. Self-closing elements produce an
/// `Open` followed by a `Close`. Fails when the reader rejects the markup,
/// when input ends inside an element, or when there is no single root.
pub(crate) fn walk<R, F>(reader: R, mut visit: F) -> Result<(), MarkupError>
where
    R: BufRead,
    F: FnMut(Node<'_, '_>) -> Result<(), MarkupError>,
{
    let mut reader = NsReader::from_reader(reader);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_of(&resolved)?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(MarkupError::TrailingContent);
                    }
                    saw_root = true;
                }
                visit(Node::Open {
                    depth,
                    namespace: namespace.as_deref(),
                    element: e,
                })?;
                if matches!(event, Event::Empty(_)) {
                    visit(Node::Close { depth })?;
                } else {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                visit(Node::Close { depth })?;
            }
            Event::Text(ref e) => {
                let text = e.unescape()?;
                visit(Node::Text(&text))?;
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e);
                visit(Node::Text(&text))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(MarkupError::Unclosed(depth));
    }
    if !saw_root {
        return Err(MarkupError::NoRoot);
    }
    Ok(())
}

fn namespace_of(resolved: &ResolveResult<'_>) -> Result<Option<String>, MarkupError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(MarkupError::UnboundPrefix(
            String::from_utf8_lossy(prefix).into_owned(),
        )),
    }
}

/// Unescaped value of attribute `name`, if present.
pub(crate) fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, MarkupError> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(xml: &str) -> Result<Vec<String>, MarkupError> {
        let mut seen = Vec::new();
        walk(xml.as_bytes(), |node| {
            match node {
                Node::Open {
                    depth,
                    namespace,
                    element,
                } => seen.push(format!(
                    "open {} {} {}",
                    depth,
                    String::from_utf8_lossy(element.local_name().as_ref()),
                    namespace.unwrap_or("-")
                )),
                Node::Close { depth } => seen.push(format!("close {}", depth)),
                Node::Text(text) if !text.trim().is_empty() => {
                    seen.push(format!("text {}", text))
                }
                Node::Text(_) => {}
            }
            Ok(())
        })?;
        Ok(seen)
    }

    #[test]
    fn reports_depth_and_namespace() {
        let seen = trace(r#"<a xmlns="http://x"><b>hi</b><c/></a>"#).unwrap();
        assert_eq!(
            seen,
            vec![
                "open 0 a http://x",
                "open 1 b http://x",
                "text hi",
                "close 1",
                "open 1 c http://x",
                "close 1",
                "close 0",
            ]
        );
    }

    #[test]
    fn unescapes_text_and_attributes() {
        let mut values = Vec::new();
        walk(r#"<a n="x&amp;y">1 &lt; 2</a>"#.as_bytes(), |node| {
            match node {
                Node::Open { element, .. } => values.push(attribute(element, "n")?.unwrap()),
                Node::Text(text) => values.push(text.to_string()),
                Node::Close { .. } => {}
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(values, vec!["x&y", "1 < 2"]);
    }

    #[test]
    fn rejects_unclosed_document() {
        assert!(matches!(
            trace("<a><b></b>"),
            Err(MarkupError::Unclosed(1))
        ));
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        assert!(matches!(trace("<a><b></a></b>"), Err(MarkupError::Xml(_))));
    }

    #[test]
    fn rejects_empty_document() {
        assert!(matches!(trace("   "), Err(MarkupError::NoRoot)));
    }

    #[test]
    fn rejects_second_root() {
        assert!(matches!(
            trace("<a></a><b></b>"),
            Err(MarkupError::TrailingContent)
        ));
    }

    #[test]
    fn rejects_undeclared_prefix() {
        assert!(matches!(
            trace("<a><x:b/></a>"),
            Err(MarkupError::UnboundPrefix(_))
        ));
    }
}
