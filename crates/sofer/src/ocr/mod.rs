//! OCR output ingestion.
//!
//! Consumes the word-level TSV rows produced by the OCR engine, applies the
//! script- and confidence-aware keep/placeholder policy, suppresses
//! duplicate boxes, and tags the left margin column. The result is the
//! page's [`crate::types::WordBox`] sequence that all later stages operate
//! on.

pub mod filter;
pub mod margin;
pub mod tsv;

/// Row level carrying individual words in the OCR TSV schema.
pub const TSV_WORD_LEVEL: u32 = 5;
/// Column count of the OCR TSV schema.
pub const TSV_MIN_FIELDS: usize = 12;

pub use filter::{build_word_boxes, normalize_reversed_parens};
pub use margin::tag_margin_boxes;
pub use tsv::{TsvWord, parse_tsv_words};
