//! Sofer - Hebrew Post-OCR Document Reconstruction
//!
//! Sofer turns the word-level output of an OCR engine over scanned Hebrew
//! documents into clean, structured text. Given recognized words with
//! bounding boxes and confidences, it filters and repairs them with a
//! masked Hebrew language model, recovers the page geometry (margin
//! column, header, footer, paragraphs, section headings, centered lines),
//! removes repeating watermark paragraphs across pages, and renders the
//! result as plain text, HTML, or a right-to-left DOCX package.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sofer::{MaskedLm, ReconstructionConfig, Vocabulary};
//! use std::sync::Arc;
//!
//! # async fn example() -> sofer::Result<()> {
//! let config = ReconstructionConfig::default();
//! let vocab = Arc::new(Vocabulary::from_file("vocab.txt")?);
//! // Without a model, rule-based cleanup still runs.
//! let lm = MaskedLm::disabled(vocab, &config.lm);
//!
//! let tsv = std::fs::read_to_string("page.tsv")?;
//! let page = sofer::process_page(&tsv, &lm, &config).await;
//! println!("{}", page.main_text);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Ingest** (`ocr`): TSV parsing, keep/placeholder filtering, duplicate
//!   suppression, margin column detection
//! - **Correction** (`lm`, `correct`): WordPiece tokenizer, masked-LM
//!   adapter, four-phase word correction
//! - **Layout** (`layout`): line metrics, header/footer, paragraphs,
//!   section headings, centering
//! - **Assembly** (`watermark`, `pipeline`): cross-page watermark removal,
//!   bounded-concurrency multi-page processing
//! - **Emit** (`emit`): page text, selection model, DOCX and HTML export

#![deny(unsafe_code)]

pub mod config;
pub mod correct;
pub mod emit;
pub mod error;
pub mod layout;
pub mod lm;
pub mod ocr;
pub mod pipeline;
pub mod script;
pub mod text;
pub mod types;
pub mod watermark;

pub use config::{ExportConfig, FilterConfig, LayoutConfig, LmConfig, MarginConfig, ReconstructionConfig};
pub use error::{Result, SoferError};
pub use lm::{MaskedLm, MaskedLmBackend, OnnxMaskedLm, Vocabulary, WordPieceTokenizer};
pub use pipeline::{build_document, process_page, process_pages};
pub use script::ScriptClass;
pub use types::*;

pub use emit::{docx_bytes, page_text, render_html, selection_text, write_docx};
pub use watermark::WatermarkFilter;
