//! Language-model word correction.
//!
//! Runs four phases over a page's word boxes, in place:
//!
//! 1. Latin-garbage replacement: on lines with Hebrew context, Latin words
//!    are re-predicted through the masked LM and either replaced by a
//!    confident Hebrew candidate or demoted to placeholders.
//! 2. Hebrew near-miss correction: confident same-length candidates at
//!    Levenshtein distance 1 replace their word.
//! 3. Confusion-pair fallback for words the vocabulary does not know.
//! 4. Rule-based Latin cleanup on lines without Hebrew context; this phase
//!    runs even when no model is available.
//!
//! Boxes are processed line by line in ascending `line_id`, and within a
//! line in ascending `word_num`, so a rerun reproduces the same output.

use crate::config::LmConfig;
use crate::lm::MaskedLm;
use crate::script::{ScriptClass, contains_hebrew};
use crate::text::levenshtein;
use crate::types::WordBox;
use std::collections::BTreeMap;

/// Hebrew letter pairs the OCR engine is known to confuse.
pub const CONFUSION_PAIRS: [(char, char); 6] =
    [('ר', 'ד'), ('ב', 'כ'), ('ו', 'ז'), ('ה', 'ח'), ('ם', 'ס'), ('ן', 'ו')];

/// Minimum Hebrew words for a line to count as Hebrew context.
const HEBREW_CONTEXT_MIN: usize = 2;
/// Latin word count that triggers the rule-based cleanup on non-Hebrew lines.
const LATIN_CLEANUP_MIN: usize = 3;

/// Four-phase word corrector over one page.
#[derive(Debug)]
pub struct LmPostProcessor<'a> {
    lm: &'a MaskedLm,
    config: &'a LmConfig,
}

impl<'a> LmPostProcessor<'a> {
    pub fn new(lm: &'a MaskedLm, config: &'a LmConfig) -> Self {
        Self { lm, config }
    }

    /// Run all phases. Rewrites box text and placeholder flags in place;
    /// geometry and identity never change.
    pub async fn run(&self, boxes: &mut [WordBox]) {
        if self.lm.is_ready() {
            self.replace_latin_garbage(boxes).await;
            self.correct_hebrew_near_misses(boxes).await;
            self.apply_confusion_fallback(boxes);
        }
        self.cleanup_latin_lines(boxes);
    }

    /// Phase 1: re-predict Latin words on Hebrew-context lines.
    async fn replace_latin_garbage(&self, boxes: &mut [WordBox]) {
        for line in lines_of(boxes) {
            if hebrew_count(boxes, &line) < HEBREW_CONTEXT_MIN {
                continue;
            }
            for &index in &line {
                if boxes[index].is_placeholder || ScriptClass::of(&boxes[index].text) != ScriptClass::LatinOnly {
                    continue;
                }

                let line_text = line_text(boxes, &line);
                let Some(prediction) = self.lm.predict_masked(&line_text, &boxes[index].text).await else {
                    // Inference failure: leave the word untouched.
                    continue;
                };

                match prediction.best_hebrew() {
                    Some(best) if best.probability >= self.config.latin_replace_threshold => {
                        tracing::debug!(from = %boxes[index].text, to = %best.token, "latin word replaced");
                        boxes[index].text = best.token.clone();
                        boxes[index].is_placeholder = false;
                    }
                    _ => boxes[index].make_placeholder(),
                }
            }
        }
    }

    /// Phase 2: same-length distance-1 corrections for Hebrew words.
    async fn correct_hebrew_near_misses(&self, boxes: &mut [WordBox]) {
        for line in lines_of(boxes) {
            if hebrew_count(boxes, &line) < HEBREW_CONTEXT_MIN {
                continue;
            }
            for &index in &line {
                let word = &boxes[index];
                if word.is_placeholder
                    || ScriptClass::of(&word.text) != ScriptClass::Hebrew
                    || word.text.chars().count() < self.config.min_word_len
                {
                    continue;
                }

                let line_text = line_text(boxes, &line);
                let Some(prediction) = self.lm.predict_masked(&line_text, &boxes[index].text).await else {
                    continue;
                };

                let current = boxes[index].text.clone();
                let current_len = current.chars().count();
                let accepted = prediction.top_k.iter().find(|candidate| {
                    candidate.probability >= self.config.near_miss_threshold
                        && contains_hebrew(&candidate.token)
                        && !candidate.token.starts_with("##")
                        && candidate.token != current
                        && candidate.token.chars().count() == current_len
                        && levenshtein(&candidate.token, &current) == 1
                });
                if let Some(candidate) = accepted {
                    tracing::debug!(from = %current, to = %candidate.token, "near-miss corrected");
                    boxes[index].text = candidate.token.clone();
                }
            }
        }
    }

    /// Phase 3: confusion-pair fallback for out-of-vocabulary Hebrew words.
    fn apply_confusion_fallback(&self, boxes: &mut [WordBox]) {
        for word in boxes.iter_mut() {
            if word.is_placeholder
                || ScriptClass::of(&word.text) != ScriptClass::Hebrew
                || word.text.chars().count() < self.config.min_word_len
            {
                continue;
            }
            if let Some(corrected) = self.lm.correct_by_confusion(&word.text, &CONFUSION_PAIRS) {
                tracing::debug!(from = %word.text, to = %corrected, "confusion pair corrected");
                word.text = corrected;
            }
        }
    }

    /// Phase 4: on lines with at most one Hebrew word but several Latin
    /// ones, the Latin words are OCR noise; demote them all.
    fn cleanup_latin_lines(&self, boxes: &mut [WordBox]) {
        for line in lines_of(boxes) {
            let mut hebrew = 0usize;
            let mut latin_indices = Vec::new();
            for &index in &line {
                if boxes[index].is_placeholder {
                    continue;
                }
                match ScriptClass::of(&boxes[index].text) {
                    ScriptClass::Hebrew | ScriptClass::HebrewMixed => hebrew += 1,
                    ScriptClass::LatinOnly => latin_indices.push(index),
                    _ => {}
                }
            }
            if hebrew <= 1 && latin_indices.len() >= LATIN_CLEANUP_MIN {
                for index in latin_indices {
                    boxes[index].make_placeholder();
                }
            }
        }
    }
}

/// Box indices grouped by line, lines in ascending `line_id`, boxes in
/// ascending `word_num`.
fn lines_of(boxes: &[WordBox]) -> Vec<Vec<usize>> {
    let mut lines: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, word) in boxes.iter().enumerate() {
        lines.entry(word.line_id).or_default().push(index);
    }
    lines
        .into_values()
        .map(|mut indices| {
            indices.sort_by_key(|&i| boxes[i].word_num);
            indices
        })
        .collect()
}

fn hebrew_count(boxes: &[WordBox], line: &[usize]) -> usize {
    line.iter()
        .filter(|&&i| !boxes[i].is_placeholder && ScriptClass::of(&boxes[i].text).is_hebrew())
        .count()
}

fn line_text(boxes: &[WordBox], line: &[usize]) -> String {
    let words: Vec<&str> = line.iter().map(|&i| boxes[i].text.as_str()).collect();
    words.join(" ")
}
