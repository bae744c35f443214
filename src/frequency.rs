//! Corpus-wide occurrence counts.
//!
//! Counts only grow. A key is a hapax when its final count is exactly one,
//! which is only meaningful once every book has been counted.

use std::collections::HashMap;

use crate::corpus::WordRecord;

/// Occurrence counter over one key space.
#[derive(Debug, Default, Clone)]
pub struct Tally {
    counts: HashMap<String, usize>,
    total: usize,
}

impl Tally {
    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
        self.total += 1;
    }

    /// Zero for keys never seen.
    pub fn count_of(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_hapax(&self, key: &str) -> bool {
        self.count_of(key) == 1
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn hapax_count(&self) -> usize {
        self.counts.values().filter(|&&count| count == 1).count()
    }
}

/// Lemma and lemma-number tallies, fed once per word token.
#[derive(Debug, Default, Clone)]
pub struct FrequencyAggregate {
    pub lemmas: Tally,
    pub lemma_numbers: Tally,
}

impl FrequencyAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, word: &WordRecord) {
        self.lemmas.increment(&word.lemma);
        self.lemma_numbers.increment(&word.lemma_number);
    }

    pub fn lemma_hapax(&self, lemma: &str) -> bool {
        self.lemmas.is_hapax(lemma)
    }

    pub fn lemma_number_hapax(&self, lemma_number: &str) -> bool {
        self.lemma_numbers.is_hapax(lemma_number)
    }
}
