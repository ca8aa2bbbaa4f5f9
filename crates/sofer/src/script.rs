//! Script classification of OCR word tokens.
//!
//! Every recognized word is bucketed by the scripts of its characters before
//! any filtering or correction decision is made. The classification is cheap
//! and recomputed on demand; it is never stored on the word box.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches short section labels: an optional opening parenthesis, a run of
/// Hebrew letters / ASCII alphanumerics, and an optional closing parenthesis
/// or period. Examples: `א.`, `(3)`, `12.`, `b)`.
static SECTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?[\u{05D0}-\u{05EA}a-zA-Z0-9]+[\).]?$")
        .expect("section marker regex pattern is valid and should compile")
});

/// Script bucket of a single OCR token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    /// Only Hebrew letters (plus digits/punctuation).
    Hebrew,
    /// Hebrew and Latin letters mixed in one token.
    HebrewMixed,
    /// Latin letters without any Hebrew.
    LatinOnly,
    /// Digits without any letters.
    Number,
    /// No letters and no digits.
    Punctuation,
    /// A short section label such as `א.` or `(3)`.
    SectionMarker,
    /// Degenerate repetition the OCR produces on smudges and rules.
    Garbage,
}

impl ScriptClass {
    /// Classify a token. The decision order matters: garbage beats
    /// everything, and short Hebrew section labels beat plain Hebrew.
    pub fn of(text: &str) -> ScriptClass {
        let stripped = strip_bidi_controls(text);
        let chars: Vec<char> = stripped.chars().collect();
        let len = chars.len();

        let mut hebrew = 0usize;
        let mut latin = 0usize;
        let mut digit = 0usize;
        let mut punct = 0usize;
        for &c in &chars {
            if is_hebrew_char(c) {
                hebrew += 1;
            } else if c.is_ascii_alphabetic() {
                latin += 1;
            } else if c.is_ascii_digit() {
                digit += 1;
            } else if !c.is_alphanumeric() && !c.is_whitespace() {
                punct += 1;
            }
        }
        let letters_or_digits = hebrew + latin + digit;

        let run = max_identical_run(&chars);
        if (len >= 4 && run >= 4) || (len > 5 && run * 2 > len) {
            return ScriptClass::Garbage;
        }
        if letters_or_digits == 0 && len <= 1 {
            return ScriptClass::Garbage;
        }

        if len <= 5 && (hebrew > 0 || digit > 0) && (punct > 0 || len <= 2) && SECTION_MARKER.is_match(&stripped) {
            return ScriptClass::SectionMarker;
        }

        if hebrew == 0 && latin == 0 && digit == 0 {
            return ScriptClass::Punctuation;
        }
        if hebrew == 0 && latin == 0 {
            return ScriptClass::Number;
        }
        if hebrew > 0 {
            return if latin > 0 { ScriptClass::HebrewMixed } else { ScriptClass::Hebrew };
        }
        if latin > 0 {
            return ScriptClass::LatinOnly;
        }

        ScriptClass::Punctuation
    }

    /// Hebrew or Hebrew-mixed.
    pub fn is_hebrew(self) -> bool {
        matches!(self, ScriptClass::Hebrew | ScriptClass::HebrewMixed)
    }
}

/// True for Unicode scalars in the Hebrew block (U+0590–U+05FF).
pub fn is_hebrew_char(c: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&c)
}

/// True if the string contains at least one Hebrew scalar. This is the
/// "Hebrew token" test applied to masked-LM predictions.
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(is_hebrew_char)
}

/// Remove bidirectional control marks that the OCR engine (or a copy/paste
/// path) may embed in a token: LRM/RLM, the embedding controls, and the
/// isolate controls.
pub fn strip_bidi_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'))
        .collect()
}

fn max_identical_run(chars: &[char]) -> usize {
    let mut best = 0usize;
    let mut current = 0usize;
    let mut last: Option<char> = None;
    for &c in chars {
        if Some(c) == last {
            current += 1;
        } else {
            current = 1;
            last = Some(c);
        }
        best = best.max(current);
    }
    best
}
