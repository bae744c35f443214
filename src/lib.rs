//! Per-word morphology extraction from OSIS-tagged Hebrew Bible books, with
//! corpus-wide hapax legomena flags at the lemma and lemma-number level.
//!
//! Books are traversed one at a time into a [`corpus::Corpus`], which owns
//! both the record store and the [`frequency::FrequencyAggregate`]. Rows are
//! emitted only after the last book is ingested, since a word's hapax status
//! depends on its count across the whole corpus.

pub mod books;
pub mod corpus;
pub mod emit;
pub mod errors;
pub mod frequency;
pub mod lemma;
pub mod logging;
mod markup;
pub mod morphology;
pub mod pipeline;
pub mod report;
pub mod source;

pub use books::BookMap;
pub use corpus::{Corpus, VerseGroup, WordRecord};
pub use errors::{ExtractError, MarkupError, Result};
pub use frequency::FrequencyAggregate;
pub use morphology::MorphologyDictionary;
pub use pipeline::{ExtractConfig, RunSummary};
