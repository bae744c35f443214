//! Morphology code dictionary (`Oshm.xml`) and code lookup.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

use crate::errors::{ExtractError, MarkupError};
use crate::markup::{self, Node};
use crate::source;

/// Namespace of the `entryFree` elements in the morphology dictionary.
pub const TEI_NAMESPACE: &str = "http://www.crosswire.org/2008/TEIOSIS/namespace";

/// Description stored for an entry with no leading text at all.
pub const NO_DESCRIPTION: &str = "No description";

/// Description reported for a code the dictionary does not know.
pub const UNKNOWN: &str = "Unknown";

/// Morphology code to human-readable description. Later entries overwrite earlier ones.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MorphologyDictionary {
    entries: HashMap<String, String>,
}

/// A morphology code paired with its resolved description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMorph {
    pub code: String,
    pub description: String,
    pub known: bool,
}

struct PendingEntry {
    depth: usize,
    code: Option<String>,
    text: String,
    leading: bool,
}

impl MorphologyDictionary {
    /// Load the dictionary at `path`, never failing.
    ///
    /// An unreadable or malformed file is logged and whatever entries were
    /// read before the fault are kept, so lookups degrade to [`UNKNOWN`].
    pub fn load(path: &Path) -> Self {
        tracing::info!("Loading morphology descriptions from {}", path.display());
        let mut dictionary = Self::default();

        let outcome = source::open(path).and_then(|reader| {
            dictionary
                .read_entries(reader)
                .map_err(|e| ExtractError::malformed(path, e))
        });

        match outcome {
            Ok(_) => tracing::info!(
                "Total morphology descriptions loaded: {}",
                dictionary.len()
            ),
            Err(e) => tracing::error!(
                "Failed to load morphology descriptions: {}; continuing with {} entries",
                e,
                dictionary.len()
            ),
        }
        dictionary
    }

    /// Insert every `entryFree` element from `reader`, returning how many were stored.
    ///
    /// Entries are inserted as they are encountered, so on error the
    /// dictionary holds everything before the fault.
    pub fn read_entries<R: BufRead>(&mut self, reader: R) -> Result<usize, MarkupError> {
        let mut pending: Option<PendingEntry> = None;
        let mut stored = 0usize;

        markup::walk(reader, |node| {
            match node {
                Node::Open {
                    depth,
                    namespace,
                    element,
                } => {
                    if let Some(entry) = pending.as_mut() {
                        entry.leading = false;
                    } else if element.local_name().as_ref() == b"entryFree"
                        && namespace == Some(TEI_NAMESPACE)
                    {
                        pending = Some(PendingEntry {
                            depth,
                            code: markup::attribute(element, "n")?,
                            text: String::new(),
                            leading: true,
                        });
                    }
                }
                Node::Text(text) => {
                    if let Some(entry) = pending.as_mut().filter(|e| e.leading) {
                        entry.text.push_str(text);
                    }
                }
                Node::Close { depth } => {
                    if pending.as_ref().is_some_and(|e| e.depth == depth) {
                        if let Some(entry) = pending.take() {
                            if self.finish_entry(entry) {
                                stored += 1;
                            }
                        }
                    }
                }
            }
            Ok(())
        })?;

        Ok(stored)
    }

    /// Returns false when the entry had no code and was dropped.
    fn finish_entry(&mut self, entry: PendingEntry) -> bool {
        let Some(code) = entry.code else {
            tracing::warn!("Skipping morphology entry without a code");
            return false;
        };
        // Blank but present text is stored trimmed (as ""), not replaced.
        let description = if entry.text.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            entry.text.trim().to_string()
        };
        tracing::trace!(
            "[MORPHOLOGY] Loaded entry '{}' with description '{}'",
            code,
            description
        );
        if self.entries.contains_key(&code) {
            tracing::debug!("[MORPHOLOGY] Duplicate code '{}', keeping the later entry", code);
        }
        self.insert(code, description);
        true
    }

    pub fn insert(&mut self, code: impl Into<String>, description: impl Into<String>) {
        self.entries.insert(code.into(), description.into());
    }

    pub fn describe(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Resolve `code`, substituting [`UNKNOWN`] on a miss.
    pub fn parse_morphology(&self, code: &str) -> ParsedMorph {
        match self.describe(code) {
            Some(description) => ParsedMorph {
                code: code.to_string(),
                description: description.to_string(),
                known: true,
            },
            None => ParsedMorph {
                code: code.to_string(),
                description: UNKNOWN.to_string(),
                known: false,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders as a one-entry mapping literal: `{'HVqp3ms': 'Verb qal perfect'}`.
impl fmt::Display for ParsedMorph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}: {}}}",
            quote_literal(&self.code),
            quote_literal(&self.description)
        )
    }
}

/// Single-quoted string literal, switching to double quotes when that avoids escaping.
fn quote_literal(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if needs_escape(c) => push_escaped(&mut out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Characters a mapping literal spells as a hex escape rather than verbatim.
///
/// Covers controls, separators other than the ASCII space, and the
/// invisible formatting characters (soft hyphen, zero-width and bidi marks).
fn needs_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{a0}'
                | '\u{ad}'
                | '\u{61c}'
                | '\u{1680}'
                | '\u{180e}'
                | '\u{2000}'..='\u{200f}'
                | '\u{2028}'..='\u{202f}'
                | '\u{205f}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{3000}'
                | '\u{feff}'
        )
}

fn push_escaped(out: &mut String, c: char) {
    let code = c as u32;
    if code < 0x100 {
        out.push_str(&format!("\\x{:02x}", code));
    } else if code < 0x10000 {
        out.push_str(&format!("\\u{:04x}", code));
    } else {
        out.push_str(&format!("\\U{:08x}", code));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const OSHM: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <TEI xmlns="http://www.crosswire.org/2008/TEIOSIS/namespace">
          <text>
            <body>
              <entryFree n="HVqp3ms">Verb qal perfect third masculine singular</entryFree>
              <entryFree n="HNcmpa">  Noun common masculine plural absolute  </entryFree>
              <entryFree n="HR"></entryFree>
              <entryFree n="HTd"/>
              <entryFree n="HX">   </entryFree>
              <entryFree n="HN">
                <note>only a note</note>
              </entryFree>
              <entryFree n="HC">Conjunction<note>waw</note> trailing</entryFree>
              <entryFree>orphan</entryFree>
            </body>
          </text>
        </TEI>
    "#};

    fn load(xml: &str) -> MorphologyDictionary {
        let mut dictionary = MorphologyDictionary::default();
        dictionary.read_entries(xml.as_bytes()).unwrap();
        dictionary
    }

    #[test]
    fn loads_codes_and_trimmed_descriptions() {
        let dictionary = load(OSHM);
        assert_eq!(
            dictionary.describe("HVqp3ms"),
            Some("Verb qal perfect third masculine singular")
        );
        assert_eq!(
            dictionary.describe("HNcmpa"),
            Some("Noun common masculine plural absolute")
        );
    }

    #[test]
    fn missing_text_gets_placeholder() {
        let dictionary = load(OSHM);
        assert_eq!(dictionary.describe("HR"), Some(NO_DESCRIPTION));
        assert_eq!(dictionary.describe("HTd"), Some(NO_DESCRIPTION));
    }

    #[test]
    fn whitespace_only_text_is_stored_empty() {
        let dictionary = load(OSHM);
        assert_eq!(dictionary.describe("HX"), Some(""));
        assert_eq!(dictionary.describe("HN"), Some(""));
        assert_eq!(
            dictionary.parse_morphology("HN").to_string(),
            "{'HN': ''}"
        );
    }

    #[test]
    fn description_is_text_before_first_child() {
        assert_eq!(load(OSHM).describe("HC"), Some("Conjunction"));
    }

    #[test]
    fn entries_without_code_are_skipped() {
        assert_eq!(load(OSHM).len(), 7);
    }

    #[test]
    fn stored_count_excludes_entries_without_code() {
        let mut dictionary = MorphologyDictionary::default();
        let stored = dictionary.read_entries(OSHM.as_bytes()).unwrap();
        assert_eq!(stored, 7);
        assert_eq!(stored, dictionary.len());
    }

    #[test]
    fn last_duplicate_wins() {
        let dictionary = load(indoc! {r#"
            <TEI xmlns="http://www.crosswire.org/2008/TEIOSIS/namespace">
              <entryFree n="HR">first</entryFree>
              <entryFree n="HR">second</entryFree>
            </TEI>
        "#});
        assert_eq!(dictionary.describe("HR"), Some("second"));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn entries_outside_tei_namespace_are_ignored() {
        let dictionary = load(r#"<TEI><entryFree n="HR">Preposition</entryFree></TEI>"#);
        assert!(dictionary.is_empty());
    }

    #[test]
    fn malformed_markup_keeps_entries_read_so_far() {
        let mut dictionary = MorphologyDictionary::default();
        let result = dictionary.read_entries(
            indoc! {r#"
                <TEI xmlns="http://www.crosswire.org/2008/TEIOSIS/namespace">
                  <entryFree n="HR">Preposition</entryFree>
                  <entryFree n="HC">Conjunction</wrong>
            "#}
            .as_bytes(),
        );
        assert!(result.is_err());
        assert_eq!(dictionary.describe("HR"), Some("Preposition"));
    }

    #[test]
    fn unreadable_file_loads_empty() {
        let dictionary = MorphologyDictionary::load(Path::new("/nonexistent/Oshm.xml"));
        assert!(dictionary.is_empty());
    }

    #[test]
    fn known_code_resolves_to_description() {
        let mut dictionary = MorphologyDictionary::default();
        dictionary.insert("HVqp3ms", "Description");
        let parsed = dictionary.parse_morphology("HVqp3ms");
        assert!(parsed.known);
        assert_eq!(parsed.to_string(), "{'HVqp3ms': 'Description'}");
    }

    #[test]
    fn unknown_code_resolves_to_unknown() {
        let parsed = MorphologyDictionary::default().parse_morphology("Xzzz");
        assert!(!parsed.known);
        assert_eq!(parsed.description, UNKNOWN);
        assert_eq!(parsed.to_string(), "{'Xzzz': 'Unknown'}");
    }

    #[test]
    fn literal_quoting_follows_content() {
        assert_eq!(quote_literal("it's"), "\"it's\"");
        assert_eq!(quote_literal(r#"a'b"c"#), r#"'a\'b"c'"#);
        assert_eq!(quote_literal(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn invisible_characters_are_hex_escaped() {
        assert_eq!(quote_literal("b\u{b}c"), r"'b\x0bc'");
        assert_eq!(quote_literal("a\u{7f}"), r"'a\x7f'");
        assert_eq!(quote_literal("x\u{a0}y"), r"'x\xa0y'");
        assert_eq!(quote_literal("z\u{200d}w"), r"'z\u200dw'");
        assert_eq!(quote_literal("\t\n"), r"'\t\n'");
        assert_eq!(quote_literal("בָּרָ֣א noun"), "'בָּרָ֣א noun'");
    }
}
