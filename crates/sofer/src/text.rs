//! Small text utilities shared across the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal marker standing in for a word the OCR could not recover.
pub const PLACEHOLDER: &str = "[...]";

static PLACEHOLDER_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\.\.\.\](?:\s+\[\.\.\.\])+").expect("placeholder run regex pattern is valid and should compile")
});

/// Collapse runs of adjacent `[...]` markers separated only by whitespace
/// into a single marker.
pub fn collapse_placeholders(text: &str) -> String {
    PLACEHOLDER_RUN.replace_all(text, PLACEHOLDER).into_owned()
}

/// Character-level Levenshtein distance.
///
/// Operates on Unicode scalar values, not bytes; OCR confusions in Hebrew
/// are single-letter substitutions and must measure as distance 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

/// Count letters usable for margin-word suppression: Hebrew letters plus
/// ASCII alphabetics.
pub fn count_letters(text: &str) -> usize {
    text.chars()
        .filter(|c| crate::script::is_hebrew_char(*c) || c.is_ascii_alphabetic())
        .count()
}

/// Count Hebrew letters in a string.
pub fn count_hebrew_chars(text: &str) -> usize {
    text.chars().filter(|c| crate::script::is_hebrew_char(*c)).count()
}
