//! Word box construction: keep/placeholder policy and duplicate suppression.

use super::margin::tag_margin_boxes;
use super::tsv::TsvWord;
use crate::config::FilterConfig;
use crate::script::{ScriptClass, is_hebrew_char};
use crate::types::{BoxFrame, WordBox, compose_line_id};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowAction {
    Keep,
    Placeholder,
}

/// Build the page's word boxes from parsed OCR rows.
///
/// Applies reversed-parenthesis normalization, the per-script confidence
/// policy, duplicate-overlap suppression, and finally margin tagging.
/// Input order is preserved.
pub fn build_word_boxes(rows: Vec<TsvWord>, config: &FilterConfig) -> Vec<WordBox> {
    let mut boxes: Vec<WordBox> = Vec::with_capacity(rows.len());
    let mut next_id = 0u64;

    for row in rows {
        let text = normalize_reversed_parens(&row.text);
        if text.is_empty() {
            continue;
        }

        let action = match ScriptClass::of(&text) {
            ScriptClass::Hebrew | ScriptClass::HebrewMixed => {
                if row.confidence > config.hebrew_min_confidence {
                    RowAction::Keep
                } else {
                    RowAction::Placeholder
                }
            }
            ScriptClass::Number | ScriptClass::Punctuation | ScriptClass::SectionMarker => {
                if row.confidence > config.symbol_min_confidence {
                    RowAction::Keep
                } else {
                    RowAction::Placeholder
                }
            }
            // The language model decides what to do with Latin words later.
            ScriptClass::LatinOnly => RowAction::Keep,
            ScriptClass::Garbage => RowAction::Placeholder,
        };

        let frame = BoxFrame::new(row.left, row.top, row.width, row.height);
        if is_duplicate(&boxes, &frame, config.duplicate_overlap_ratio) {
            continue;
        }

        let mut word = WordBox {
            id: next_id,
            text: text.into_owned(),
            frame,
            line_id: compose_line_id(row.block, row.par, row.line),
            word_num: row.word,
            confidence: row.confidence,
            is_margin: false,
            is_placeholder: false,
        };
        if action == RowAction::Placeholder {
            word.make_placeholder();
        }

        boxes.push(word);
        next_id += 1;
    }

    tag_margin_boxes(&mut boxes, &config.margin);
    boxes
}

fn is_duplicate(accepted: &[WordBox], frame: &BoxFrame, overlap_ratio: f32) -> bool {
    accepted.iter().any(|existing| {
        let smaller = existing.frame.area().min(frame.area());
        smaller > 0.0 && existing.frame.overlap_area(frame) > overlap_ratio * smaller
    })
}

/// Fix parentheses the OCR reads in visual order on RTL pages.
///
/// `)3(` becomes `(3)`, and a lone leading `)` on an otherwise plain token
/// wraps it: `)3` becomes `(3)`. Only tokens whose payload is entirely
/// Hebrew letters or ASCII digits are rewritten.
pub fn normalize_reversed_parens(text: &str) -> Cow<'_, str> {
    let chars: Vec<char> = text.chars().collect();

    if chars.len() >= 3 && chars[0] == ')' && chars[chars.len() - 1] == '(' {
        let inner: String = chars[1..chars.len() - 1].iter().collect();
        if is_hebrew_or_digits(&inner) {
            return Cow::Owned(format!("({})", inner));
        }
    }

    if chars.len() >= 2 && chars[0] == ')' && chars[chars.len() - 1] != '(' {
        let rest: String = chars[1..].iter().collect();
        if is_hebrew_or_digits(&rest) {
            return Cow::Owned(format!("({})", rest));
        }
    }

    Cow::Borrowed(text)
}

fn is_hebrew_or_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| is_hebrew_char(c) || c.is_ascii_digit())
}
