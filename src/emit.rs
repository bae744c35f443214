//! Flattening the record store into the eight-column table.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::corpus::{Corpus, VerseGroup, WordRecord};
use crate::errors::{ExtractError, Result};
use crate::frequency::FrequencyAggregate;

/// Header of the output table, in column order.
pub const COLUMNS: [&str; 8] = [
    "Verse ID",
    "Lemma",
    "Lemma Number",
    "Word Text",
    "Raw Morph",
    "Parsed Morph",
    "Lemma Hapax",
    "Lemma Number Hapax",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(rename = "Verse ID")]
    pub verse_id: String,
    #[serde(rename = "Lemma")]
    pub lemma: String,
    #[serde(rename = "Lemma Number")]
    pub lemma_number: String,
    #[serde(rename = "Word Text")]
    pub word_text: String,
    #[serde(rename = "Raw Morph")]
    pub raw_morph: String,
    #[serde(rename = "Parsed Morph")]
    pub parsed_morph: String,
    #[serde(rename = "Lemma Hapax")]
    pub lemma_hapax: String,
    #[serde(rename = "Lemma Number Hapax")]
    pub lemma_number_hapax: String,
}

fn flag(hapax: bool) -> String {
    let value = if hapax { "Yes" } else { "No" };
    value.to_string()
}

impl OutputRow {
    pub fn new(verse: &VerseGroup, word: &WordRecord, aggregate: &FrequencyAggregate) -> Self {
        Self {
            verse_id: verse.verse_id.clone(),
            lemma: word.lemma.clone(),
            lemma_number: word.lemma_number.clone(),
            word_text: word.word_text.clone(),
            raw_morph: word.raw_morph.clone(),
            parsed_morph: word.parsed_morph.to_string(),
            lemma_hapax: flag(aggregate.lemma_hapax(&word.lemma)),
            lemma_number_hapax: flag(aggregate.lemma_number_hapax(&word.lemma_number)),
        }
    }
}

/// One row per stored word, in record-store order.
///
/// Reads only the corpus; call it after the last book has been ingested,
/// otherwise hapax flags reflect a partial count.
pub fn rows(corpus: &Corpus) -> impl Iterator<Item = OutputRow> + '_ {
    let aggregate = corpus.aggregate();
    corpus
        .words()
        .map(move |(verse, word)| OutputRow::new(verse, word, aggregate))
}

/// Write the header and every row as CSV, returning the row count.
pub fn write_rows<W: Write>(corpus: &Corpus, writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    let mut written = 0usize;
    for row in rows(corpus) {
        csv_writer.serialize(&row)?;
        written += 1;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(written)
}

pub fn write_csv(corpus: &Corpus, path: &Path) -> Result<usize> {
    let file = File::create(path).map_err(|e| ExtractError::io(path, e))?;
    let written = write_rows(corpus, BufWriter::with_capacity(256 * 1024, file))?;
    tracing::info!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}
