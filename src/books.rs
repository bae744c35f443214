//! The canonical book-order table and its optional YAML override.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ExtractError, Result};

/// Book label and file name, in traversal order.
pub const CANONICAL_BOOKS: &[(&str, &str)] = &[
    ("Genesis", "Gen.xml"),
    ("Exodus", "Exod.xml"),
    ("Leviticus", "Lev.xml"),
    ("Numbers", "Num.xml"),
    ("Deuteronomy", "Deut.xml"),
    ("Joshua", "Josh.xml"),
    ("Judges", "Judg.xml"),
    ("1 Samuel", "1Sam.xml"),
    ("2 Samuel", "2Sam.xml"),
    ("1 Kings", "1Kgs.xml"),
    ("2 Kings", "2Kgs.xml"),
    ("Isaiah", "Isa.xml"),
    ("Jeremiah", "Jer.xml"),
    ("Ezekiel", "Ezek.xml"),
    ("Hosea", "Hos.xml"),
    ("Joel", "Joel.xml"),
    ("Amos", "Amos.xml"),
    ("Obadiah", "Obad.xml"),
    ("Jonah", "Jonah.xml"),
    ("Micah", "Mic.xml"),
    ("Nahum", "Nah.xml"),
    ("Habakkuk", "Hab.xml"),
    ("Zephaniah", "Zeph.xml"),
    ("Haggai", "Hag.xml"),
    ("Zechariah", "Zech.xml"),
    ("Malachi", "Mal.xml"),
    ("Psalms", "Ps.xml"),
    ("Proverbs", "Prov.xml"),
    ("Job", "Job.xml"),
    ("Song of Songs", "Song.xml"),
    ("Ruth", "Ruth.xml"),
    ("Lamentations", "Lam.xml"),
    ("Ecclesiastes", "Eccl.xml"),
    ("Esther", "Esth.xml"),
    ("Daniel", "Dan.xml"),
    ("Ezra", "Ezra.xml"),
    ("Nehemiah", "Neh.xml"),
    ("1 Chronicles", "1Chr.xml"),
    ("2 Chronicles", "2Chr.xml"),
];

/// File name looked up inside the corpus directory when no `--books` is given.
pub const BOOK_MAP_FILE: &str = "books.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookEntry {
    pub label: String,
    pub file: String,
}

// === Book map YAML structure ===

#[derive(Debug, Deserialize)]
struct BookMapSchema {
    books: Vec<BookEntry>,
}

/// Ordered book-label to file-name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMap {
    entries: Vec<BookEntry>,
}

impl BookMap {
    pub fn canonical() -> Self {
        let entries = CANONICAL_BOOKS
            .iter()
            .map(|&(label, file)| BookEntry {
                label: label.to_string(),
                file: file.to_string(),
            })
            .collect();
        Self { entries }
    }

    pub fn from_entries(entries: Vec<BookEntry>) -> Self {
        Self { entries }
    }

    pub fn from_yaml_str(contents: &str) -> std::result::Result<Self, String> {
        let schema: BookMapSchema = serde_yaml::from_str(contents)
            .map_err(|e| format!("Failed to parse book map YAML: {}", e))?;
        if schema.books.is_empty() {
            return Err("book map lists no books".to_string());
        }
        Ok(Self::from_entries(schema.books))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
        Self::from_yaml_str(&contents).map_err(|message| ExtractError::BookMap {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Explicit path first, then `books.yaml` in the corpus directory, then the built-in table.
    pub fn resolve(explicit: Option<&Path>, corpus_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = corpus_dir.join(BOOK_MAP_FILE);
        if candidate.exists() {
            tracing::info!("Using book map {}", candidate.display());
            return Self::load(&candidate);
        }
        Ok(Self::canonical())
    }

    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full path of every book file under `corpus_dir`, in table order.
    pub fn paths_in(&self, corpus_dir: &Path) -> Vec<(String, PathBuf)> {
        self.entries
            .iter()
            .map(|entry| (entry.label.clone(), corpus_dir.join(&entry.file)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_table_has_39_books_from_genesis_to_chronicles() {
        let map = BookMap::canonical();
        assert_eq!(map.len(), 39);
        assert_eq!(map.entries()[0].label, "Genesis");
        assert_eq!(map.entries()[0].file, "Gen.xml");
        assert_eq!(map.entries()[38].label, "2 Chronicles");
        assert_eq!(map.entries()[38].file, "2Chr.xml");
    }

    #[test]
    fn canonical_order_puts_prophets_before_writings() {
        let map = BookMap::canonical();
        let labels: Vec<&str> = map
            .entries()
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        let malachi = labels.iter().position(|&l| l == "Malachi").unwrap();
        let psalms = labels.iter().position(|&l| l == "Psalms").unwrap();
        assert_eq!(psalms, malachi + 1);
    }

    #[test]
    fn yaml_override_keeps_listed_order() {
        let map = BookMap::from_yaml_str(
            "books:\n  - label: Ruth\n    file: Ruth.xml\n  - label: Jonah\n    file: Jonah.xml\n",
        )
        .unwrap();
        assert_eq!(
            map.entries(),
            &[
                BookEntry {
                    label: "Ruth".into(),
                    file: "Ruth.xml".into()
                },
                BookEntry {
                    label: "Jonah".into(),
                    file: "Jonah.xml".into()
                },
            ]
        );
    }

    #[test]
    fn empty_yaml_book_list_is_rejected() {
        assert!(BookMap::from_yaml_str("books: []\n").is_err());
        assert!(BookMap::from_yaml_str("not: a map").is_err());
    }

    #[test]
    fn resolve_falls_back_to_canonical() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            BookMap::resolve(None, dir.path()).unwrap(),
            BookMap::canonical()
        );
    }

    #[test]
    fn resolve_discovers_books_yaml_in_corpus_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(BOOK_MAP_FILE),
            "books:\n  - label: Ruth\n    file: Ruth.xml\n",
        )
        .unwrap();
        let map = BookMap::resolve(None, dir.path()).unwrap();
        assert_eq!(map.len(), 1);
    }
}
