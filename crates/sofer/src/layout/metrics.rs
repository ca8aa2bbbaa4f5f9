//! Per-line aggregation of word box geometry.

use crate::script::ScriptClass;
use crate::types::WordBox;
use std::collections::BTreeMap;

/// Geometry and word statistics of one text line, derived on demand from
/// the page's non-margin boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMetrics {
    pub line_id: i64,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// All words on the line, placeholders included.
    pub word_count: usize,
    /// Non-placeholder words.
    pub content_words: usize,
    /// Non-placeholder Hebrew or Hebrew-mixed words.
    pub hebrew_words: usize,
    /// Non-placeholder Latin-only words.
    pub latin_words: usize,
    pub first_word: String,
    pub second_word: Option<String>,
}

impl LineMetrics {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn midpoint(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    /// Paragraph portion of the line id (`block * 10^3 + par`).
    pub fn paragraph_number(&self) -> i64 {
        self.line_id / 1_000
    }
}

/// Aggregate non-margin boxes into per-line metrics, sorted by `min_y`.
pub fn collect_line_metrics(boxes: &[WordBox]) -> Vec<LineMetrics> {
    let mut lines: BTreeMap<i64, Vec<&WordBox>> = BTreeMap::new();
    for word in boxes.iter().filter(|b| !b.is_margin) {
        lines.entry(word.line_id).or_default().push(word);
    }

    let mut metrics: Vec<LineMetrics> = lines
        .into_iter()
        .map(|(line_id, mut words)| {
            words.sort_by_key(|w| w.word_num);

            let mut min_x = f32::MAX;
            let mut max_x = f32::MIN;
            let mut min_y = f32::MAX;
            let mut max_y = f32::MIN;
            let mut content_words = 0usize;
            let mut hebrew_words = 0usize;
            let mut latin_words = 0usize;
            for word in &words {
                min_x = min_x.min(word.frame.x);
                max_x = max_x.max(word.frame.right());
                min_y = min_y.min(word.frame.y);
                max_y = max_y.max(word.frame.bottom());
                if !word.is_placeholder {
                    content_words += 1;
                    match ScriptClass::of(&word.text) {
                        ScriptClass::Hebrew | ScriptClass::HebrewMixed => hebrew_words += 1,
                        ScriptClass::LatinOnly => latin_words += 1,
                        _ => {}
                    }
                }
            }

            LineMetrics {
                line_id,
                min_x,
                max_x,
                min_y,
                max_y,
                word_count: words.len(),
                content_words,
                hebrew_words,
                latin_words,
                first_word: words[0].text.clone(),
                second_word: words.get(1).map(|w| w.text.clone()),
            }
        })
        .collect();

    metrics.sort_by(|a, b| a.min_y.total_cmp(&b.min_y));
    metrics
}
