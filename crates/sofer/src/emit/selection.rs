//! Selection model: user-selected boxes rendered as text.
//!
//! The pipeline produces immutable boxes; the selection layer passes the
//! picked subset here and receives a string back. No state flows the other
//! way.

use super::render_grouped;
use crate::text::collapse_placeholders;
use crate::types::WordBox;

/// Render a selected set of boxes.
///
/// Main-column selections come first, grouped into OCR paragraphs
/// (`line_id / 10^3`) ordered by first line, words by `word_num`. Margin
/// selections follow under a `[margin]` label, with words of fewer than
/// two Hebrew/Latin letters suppressed.
pub fn selection_text(selected: &[WordBox]) -> String {
    let main: Vec<&WordBox> = selected.iter().filter(|b| !b.is_margin).collect();
    let margin: Vec<&WordBox> = selected.iter().filter(|b| b.is_margin).collect();

    let main_text = render_grouped(&main, 0);
    let margin_text = render_grouped(&margin, 2);

    let combined = match (main_text.is_empty(), margin_text.is_empty()) {
        (_, true) => main_text,
        (true, false) => format!("[margin]\n{}", margin_text),
        (false, false) => format!("{}\n\n[margin]\n{}", main_text, margin_text),
    };
    collapse_placeholders(&combined)
}
