//! Structured output rendering.
//!
//! Three logical outputs: plain page text (role-labeled paragraphs),
//! a selection model for interactive word picking, and serialized
//! documents (Office Open XML and HTML).

pub mod docx;
pub mod html;
pub mod selection;

pub use docx::{docx_bytes, write_docx};
pub use html::render_html;
pub use selection::selection_text;

use crate::text::{collapse_placeholders, count_letters};
use crate::types::{DetectedParagraph, PageStructure, ParagraphRole, WordBox};
use itertools::Itertools;

/// Words of one line in `word_num` order.
fn line_words<'a>(boxes: &'a [WordBox], line_id: i64) -> Vec<&'a WordBox> {
    boxes
        .iter()
        .filter(|b| b.line_id == line_id)
        .sorted_by_key(|b| b.word_num)
        .collect()
}

/// Paragraph text: each line's words joined by spaces, lines flattened.
pub fn paragraph_text(boxes: &[WordBox], paragraph: &DetectedParagraph) -> String {
    paragraph
        .line_ids
        .iter()
        .map(|&line_id| line_words(boxes, line_id).iter().map(|b| b.text.as_str()).join(" "))
        .filter(|line| !line.is_empty())
        .join(" ")
}

/// Render a page's main text: paragraphs top-to-bottom separated by blank
/// lines, header/footer paragraphs labeled, placeholder runs collapsed.
pub fn page_text(boxes: &[WordBox], structure: &PageStructure) -> String {
    let rendered = structure
        .paragraphs
        .iter()
        .filter_map(|paragraph| {
            let text = paragraph_text(boxes, paragraph);
            if text.is_empty() {
                return None;
            }
            Some(match paragraph.role {
                ParagraphRole::Header => format!("[header] {}", text),
                ParagraphRole::Footer => format!("[footer] {}", text),
                ParagraphRole::Body | ParagraphRole::SectionHeading => text,
            })
        })
        .join("\n\n");
    collapse_placeholders(&rendered)
}

/// Render the margin column: margin boxes grouped into their OCR
/// paragraphs, with words too short to be real annotations suppressed.
pub fn margin_text(boxes: &[WordBox]) -> String {
    let margin: Vec<&WordBox> = boxes.iter().filter(|b| b.is_margin).collect();
    let rendered = render_grouped(&margin, 2);
    collapse_placeholders(&rendered)
}

/// Group boxes by paragraph id, order paragraphs by their first line id,
/// and render each as space-joined words. Words with fewer than
/// `min_letters` Hebrew/Latin letters are suppressed (placeholders always
/// pass).
pub(crate) fn render_grouped(boxes: &[&WordBox], min_letters: usize) -> String {
    let mut by_paragraph: Vec<(i64, Vec<&WordBox>)> = Vec::new();
    for (paragraph_id, group) in &boxes
        .iter()
        .sorted_by_key(|b| (b.line_id, b.word_num))
        .chunk_by(|b| b.paragraph_id())
    {
        by_paragraph.push((paragraph_id, group.copied().collect()));
    }
    by_paragraph.sort_by_key(|(_, words)| words.first().map(|w| w.line_id).unwrap_or(i64::MAX));

    by_paragraph
        .iter()
        .filter_map(|(_, words)| {
            let text = words
                .iter()
                .filter(|w| w.is_placeholder || count_letters(&w.text) >= min_letters)
                .map(|w| w.text.as_str())
                .join(" ");
            if text.is_empty() { None } else { Some(text) }
        })
        .join("\n\n")
}
