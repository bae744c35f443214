//! Run order: dictionary, then every book in table order, then emission.

use std::path::{Path, PathBuf};

use crate::books::BookMap;
use crate::corpus::{self, Corpus};
use crate::emit;
use crate::errors::Result;
use crate::morphology::MorphologyDictionary;

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub corpus_dir: PathBuf,
    pub morphology: PathBuf,
    pub output: PathBuf,
    pub books: BookMap,
}

impl ExtractConfig {
    /// Relative dictionary paths are taken from the corpus directory.
    pub fn new(corpus_dir: impl Into<PathBuf>, morphology: &Path, output: impl Into<PathBuf>) -> Self {
        let corpus_dir = corpus_dir.into();
        let morphology = if morphology.is_absolute() {
            morphology.to_path_buf()
        } else {
            corpus_dir.join(morphology)
        };
        Self {
            corpus_dir,
            morphology,
            output: output.into(),
            books: BookMap::canonical(),
        }
    }

    pub fn with_books(mut self, books: BookMap) -> Self {
        self.books = books;
        self
    }
}

/// A book that contributed nothing, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBook {
    pub label: String,
    pub reason: String,
}

/// Result of traversing every book, before emission.
#[derive(Debug)]
pub struct CorpusBuild {
    pub corpus: Corpus,
    pub books_processed: usize,
    pub skipped: Vec<SkippedBook>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub build: CorpusBuild,
    pub dictionary_entries: usize,
    pub rows_written: usize,
}

/// Traverse `books` in order, committing each one that parses.
///
/// `on_book` is called with each label after that book is finished,
/// whether it was ingested or skipped.
pub fn build_corpus(
    books: &[(String, PathBuf)],
    dictionary: &MorphologyDictionary,
    mut on_book: impl FnMut(&str),
) -> CorpusBuild {
    let mut corpus = Corpus::new();
    let mut books_processed = 0usize;
    let mut skipped = Vec::new();

    for (label, path) in books {
        match corpus::load_book(path, label, dictionary) {
            Ok(book) => {
                corpus.ingest(book);
                books_processed += 1;
            }
            Err(e) => {
                tracing::error!("[ERROR] Skipping '{}': {}", label, e);
                skipped.push(SkippedBook {
                    label: label.clone(),
                    reason: e.to_string(),
                });
            }
        }
        on_book(label);
    }

    CorpusBuild {
        corpus,
        books_processed,
        skipped,
    }
}

/// Full extraction run. Only failing to write the output aborts it.
pub fn run(config: &ExtractConfig, on_book: impl FnMut(&str)) -> Result<RunSummary> {
    let dictionary = MorphologyDictionary::load(&config.morphology);
    let books = config.books.paths_in(&config.corpus_dir);
    let build = build_corpus(&books, &dictionary, on_book);
    let rows_written = emit::write_csv(&build.corpus, &config.output)?;

    Ok(RunSummary {
        build,
        dictionary_entries: dictionary.len(),
        rows_written,
    })
}
