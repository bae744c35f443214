//! Lemma number extraction from Strong's-style lemma strings.

use lazy_static::lazy_static;
use regex::Regex;

/// Returned when a lemma carries no digits.
pub const NO_NUMBER: &str = "No number found";

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// First maximal run of ASCII digits in `lemma`, verbatim.
///
/// Composite lemmas such as `b/7225` yield the number of the first morpheme
/// that has one.
pub fn extract_lemma_number(lemma: &str) -> String {
    DIGIT_RUN
        .find(lemma)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NO_NUMBER.to_string())
}
