//! XeLaTeX rendering of a verse range from the extracted table.
//!
//! Consumes only the eight-column CSV, so it can run against any earlier
//! extraction output.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::emit::OutputRow;
use crate::errors::{ExtractError, Result};

pub const TYPESETTER: &str = "xelatex";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Only rows whose Verse ID starts with this are rendered.
    pub prefix: String,
    pub title: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            prefix: "Gen.1.".to_string(),
            title: "Genesis Chapter 1".to_string(),
        }
    }
}

pub fn load_rows(path: &Path) -> Result<Vec<OutputRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<OutputRow>, _>>()?;
    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Words of consecutive rows sharing a Verse ID, empty texts dropped.
pub fn group_verses<'r>(rows: &'r [OutputRow], prefix: &str) -> Vec<(&'r str, Vec<&'r str>)> {
    let mut verses: Vec<(&str, Vec<&str>)> = Vec::new();
    for row in rows.iter().filter(|r| r.verse_id.starts_with(prefix)) {
        let starts_new = verses
            .last()
            .map_or(true, |(id, _)| *id != row.verse_id.as_str());
        if starts_new {
            verses.push((row.verse_id.as_str(), Vec::new()));
        }
        if !row.word_text.is_empty() {
            if let Some((_, words)) = verses.last_mut() {
                words.push(row.word_text.as_str());
            }
        }
    }
    verses
}

/// `Gen.1.3` → `1:3`; ids with fewer than three segments are returned unchanged.
pub fn verse_label(verse_id: &str) -> String {
    let parts: Vec<&str> = verse_id.split('.').collect();
    if parts.len() < 3 {
        return verse_id.to_string();
    }
    format!("{}:{}", parts[parts.len() - 2], parts[parts.len() - 1])
}

fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                out.push('\\');
                out.push(ch);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_latex(rows: &[OutputRow], options: &ReportOptions) -> String {
    let title = escape_latex(&options.title);
    let mut latex = String::new();
    latex.push_str(
        r"\documentclass{article}
\usepackage{fontspec}
\usepackage{polyglossia}
\usepackage{tcolorbox}
\setdefaultlanguage{english}
\setotherlanguage{hebrew}
\newfontfamily\hebrewfont[Script=Hebrew]{Times New Roman}
",
    );
    latex.push_str(&format!("\n\\title{{{} Verses}}\n\\date{{}}\n\n", title));
    latex.push_str("\\begin{document}\n\\maketitle\n");
    latex.push_str(&format!("\\section*{{{}}}\n\n\\subsection*{{Verses}}\n", title));

    for (verse_id, words) in group_verses(rows, &options.prefix) {
        latex.push_str(&format!(
            "\\textbf{{Verse {}}}\n\n",
            escape_latex(&verse_label(verse_id))
        ));
        for word in words {
            latex.push_str(&format!(
                "\\begin{{tcolorbox}}[sharp corners, colframe=black!75, colback=white!90] \\hebrewfont {} \\end{{tcolorbox}} ",
                escape_latex(word)
            ));
        }
        latex.push_str("\n\n");
    }

    latex.push_str("\\end{document}\n");
    latex
}

pub fn write_tex(rows: &[OutputRow], options: &ReportOptions, tex_path: &Path) -> Result<()> {
    fs::write(tex_path, render_latex(rows, options)).map_err(|e| ExtractError::io(tex_path, e))?;
    tracing::info!("Wrote {}", tex_path.display());
    Ok(())
}

/// Run the typesetter on `tex_path`, writing into its directory.
///
/// A failing exit status is logged and returned, not turned into an error.
pub fn compile(tex_path: &Path) -> Result<ExitStatus> {
    compile_with(tex_path, None)
}

/// `search_path` replaces `PATH` when looking up the typesetter.
fn compile_with(tex_path: &Path, search_path: Option<&OsStr>) -> Result<ExitStatus> {
    let located = match search_path {
        Some(paths) => which::which_in(TYPESETTER, Some(paths), "."),
        None => which::which(TYPESETTER),
    };
    let program = located.map_err(|e| ExtractError::Typesetter {
        program: TYPESETTER.to_string(),
        message: e.to_string(),
    })?;
    let output_dir: PathBuf = match tex_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let status = Command::new(&program)
        .arg("-interaction=nonstopmode")
        .arg("-output-directory")
        .arg(&output_dir)
        .arg(tex_path)
        .status()
        .map_err(|e| ExtractError::Typesetter {
            program: program.display().to_string(),
            message: e.to_string(),
        })?;

    if status.success() {
        tracing::info!("Typeset {} into {}", tex_path.display(), output_dir.display());
    } else {
        tracing::warn!("{} exited with {}", TYPESETTER, status);
    }
    Ok(status)
}
