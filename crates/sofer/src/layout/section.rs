//! Section-number detection on paragraph-leading words.

use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted section-number shapes, tried in order: a Hebrew letter, digit
/// run, or Latin letter that is period-suffixed, parenthesized, or carries
/// a bare closing parenthesis.
static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[\u{05D0}-\u{05EA}]\.$",
        r"^\([\u{05D0}-\u{05EA}]\)$",
        r"^[\u{05D0}-\u{05EA}]\)$",
        r"^\d+\.$",
        r"^\(\d+\)$",
        r"^\d+\)$",
        r"^[a-zA-Z]\.$",
        r"^\([a-zA-Z]\)$",
        r"^[a-zA-Z]\)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("section number regex pattern is valid and should compile"))
    .collect()
});

/// Detect a section number at the start of a line.
///
/// The first word is tried on its own; when that fails and a second word
/// exists, the concatenation is tried to repair OCR splits like `1` + `.`.
pub fn detect_section_number(first_word: &str, second_word: Option<&str>) -> Option<String> {
    if SECTION_PATTERNS.iter().any(|p| p.is_match(first_word)) {
        return Some(first_word.to_string());
    }
    if let Some(second) = second_word {
        let combined = format!("{}{}", first_word, second);
        if SECTION_PATTERNS.iter().any(|p| p.is_match(&combined)) {
            return Some(combined);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hebrew_letter_with_period() {
        assert_eq!(detect_section_number("א.", None).as_deref(), Some("א."));
    }

    #[test]
    fn test_hebrew_letter_parenthesized() {
        assert_eq!(detect_section_number("(א)", None).as_deref(), Some("(א)"));
        assert_eq!(detect_section_number("ב)", None).as_deref(), Some("ב)"));
    }

    #[test]
    fn test_digits() {
        assert_eq!(detect_section_number("12.", None).as_deref(), Some("12."));
        assert_eq!(detect_section_number("(3)", None).as_deref(), Some("(3)"));
        assert_eq!(detect_section_number("7)", None).as_deref(), Some("7)"));
    }

    #[test]
    fn test_latin_letter() {
        assert_eq!(detect_section_number("a.", None).as_deref(), Some("a."));
        assert_eq!(detect_section_number("(B)", None).as_deref(), Some("(B)"));
    }

    #[test]
    fn test_split_marker_repaired_from_second_word() {
        assert_eq!(detect_section_number("1", Some(".")).as_deref(), Some("1."));
        assert_eq!(detect_section_number("(א", Some(")")).as_deref(), Some("(א)"));
    }

    #[test]
    fn test_combined_only_tried_after_first_fails() {
        // The first word alone already matches; the second is ignored.
        assert_eq!(detect_section_number("א.", Some("המשך")).as_deref(), Some("א."));
    }

    #[test]
    fn test_plain_word_is_not_a_section() {
        assert_eq!(detect_section_number("שלום", None), None);
        assert_eq!(detect_section_number("שלום", Some("עולם")), None);
    }

    #[test]
    fn test_bare_letter_without_punctuation_is_not_a_section() {
        assert_eq!(detect_section_number("א", None), None);
    }
}
