//! Core data model shared by every pipeline stage.
//!
//! A page flows through the pipeline as a sequence of [`WordBox`]es. The
//! ingest stage creates them, the margin detector flags them, the LM
//! post-processor rewrites their text in place, and the layout analyzer
//! derives a [`PageStructure`] from them. Later stages never mutate boxes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use crate::text::PLACEHOLDER;

/// Axis-aligned bounding rectangle in OCR pixel space, origin top-left,
/// Y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxFrame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxFrame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Area of the intersection with another frame; zero when disjoint.
    pub fn overlap_area(&self, other: &BoxFrame) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }
}

/// One recognized word with its geometry and correction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    /// Unique within a page; assigned in ingest order.
    pub id: u64,
    /// Current best guess. Mutated only by the LM post-processor.
    pub text: String,
    pub frame: BoxFrame,
    /// Composite `block * 10^6 + par * 10^3 + line`.
    pub line_id: i64,
    /// Ordinal of the word within its line.
    pub word_num: u32,
    /// Recognition confidence as reported by the OCR engine (0–100).
    pub confidence: f32,
    /// Set by the margin detector when the box sits in the left margin column.
    #[serde(default)]
    pub is_margin: bool,
    /// When set, `text` is the literal `[...]` marker.
    #[serde(default)]
    pub is_placeholder: bool,
}

impl WordBox {
    /// Replace the text with the placeholder marker.
    pub fn make_placeholder(&mut self) {
        self.text = PLACEHOLDER.to_string();
        self.is_placeholder = true;
    }

    /// Paragraph portion of the line id (`block * 10^3 + par`).
    pub fn paragraph_id(&self) -> i64 {
        self.line_id / 1_000
    }
}

/// Compose the line id from the OCR block/paragraph/line ordinals.
pub fn compose_line_id(block: u32, par: u32, line: u32) -> i64 {
    i64::from(block) * 1_000_000 + i64::from(par) * 1_000 + i64::from(line)
}

/// Role of a detected paragraph on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphRole {
    Header,
    Footer,
    Body,
    SectionHeading,
}

/// A paragraph recovered by the layout analyzer: an ordered run of line ids
/// plus its role annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedParagraph {
    pub line_ids: Vec<i64>,
    pub role: ParagraphRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    #[serde(default)]
    pub is_centered: bool,
}

/// Full page layout: paragraphs top-to-bottom plus the header/footer line
/// id sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStructure {
    pub paragraphs: Vec<DetectedParagraph>,
    pub header_lines: BTreeSet<i64>,
    pub footer_lines: BTreeSet<i64>,
}

/// One token candidate from a masked prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrediction {
    pub token: String,
    pub probability: f32,
}

/// Top-K result of a single masked-LM evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskPrediction {
    /// Candidates in descending probability order.
    pub top_k: Vec<TokenPrediction>,
    /// Sum of probabilities of the Hebrew candidates among the top-K.
    pub hebrew_probability: f32,
}

impl MaskPrediction {
    /// Highest-probability candidate that is Hebrew and not a `##`
    /// continuation piece.
    pub fn best_hebrew(&self) -> Option<&TokenPrediction> {
        self.top_k
            .iter()
            .find(|p| crate::script::contains_hebrew(&p.token) && !p.token.starts_with("##"))
    }
}

/// Result of reconstructing one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOutput {
    pub boxes: Vec<WordBox>,
    pub structure: PageStructure,
    pub main_text: String,
    pub margin_text: String,
}

/// A logical document ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub pages: Vec<DocumentPage>,
}

/// One exported page: its reconstructed texts plus the layout used to
/// style them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub main_text: String,
    pub margin_text: String,
    pub structure: PageStructure,
}

impl From<&PageOutput> for DocumentPage {
    fn from(page: &PageOutput) -> Self {
        Self {
            main_text: page.main_text.clone(),
            margin_text: page.margin_text.clone(),
            structure: page.structure.clone(),
        }
    }
}
