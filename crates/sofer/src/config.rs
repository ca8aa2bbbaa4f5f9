//! Reconstruction configuration.
//!
//! Every tuning constant of the pipeline lives here with its production
//! default, so behavior can be adjusted from a TOML or JSON file without
//! touching call sites.

use crate::{Result, SoferError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub lm: LmConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl ReconstructionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| SoferError::validation_with_source(format!("invalid TOML config: {}", e), e))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| SoferError::validation_with_source(format!("invalid JSON config: {}", e), e))
    }
}

/// OCR ingest filtering thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Hebrew words below this confidence become placeholders.
    #[serde(default = "default_hebrew_min_confidence")]
    pub hebrew_min_confidence: f32,

    /// Numbers, punctuation and section markers below this confidence
    /// become placeholders.
    #[serde(default = "default_symbol_min_confidence")]
    pub symbol_min_confidence: f32,

    /// A new box is dropped when its overlap with an accepted box exceeds
    /// this fraction of the smaller box's area.
    #[serde(default = "default_duplicate_overlap_ratio")]
    pub duplicate_overlap_ratio: f32,

    #[serde(default)]
    pub margin: MarginConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            hebrew_min_confidence: default_hebrew_min_confidence(),
            symbol_min_confidence: default_symbol_min_confidence(),
            duplicate_overlap_ratio: default_duplicate_overlap_ratio(),
            margin: MarginConfig::default(),
        }
    }
}

/// Margin column detection parameters. The search targets right-to-left
/// pages where annotations sit in a narrow left column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginConfig {
    /// Minimum number of boxes before the detector runs at all.
    #[serde(default = "default_margin_min_boxes")]
    pub min_boxes: usize,

    /// Start of the search band as a fraction of the derived page width.
    #[serde(default = "default_margin_band_start")]
    pub band_start: f32,

    /// End of the search band as a fraction of the derived page width.
    #[serde(default = "default_margin_band_end")]
    pub band_end: f32,

    /// Minimum gap (as a fraction of the derived page width) for a margin
    /// boundary to be accepted.
    #[serde(default = "default_margin_min_gap_ratio")]
    pub min_gap_ratio: f32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            min_boxes: default_margin_min_boxes(),
            band_start: default_margin_band_start(),
            band_end: default_margin_band_end(),
            min_gap_ratio: default_margin_min_gap_ratio(),
        }
    }
}

/// Masked-LM correction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmConfig {
    /// Encoder sequence length, including `[CLS]` and `[SEP]`.
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Number of candidates extracted per masked prediction.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum probability for replacing a Latin word with a Hebrew
    /// candidate.
    #[serde(default = "default_latin_replace_threshold")]
    pub latin_replace_threshold: f32,

    /// Minimum probability for a Hebrew near-miss correction.
    #[serde(default = "default_near_miss_threshold")]
    pub near_miss_threshold: f32,

    /// Words shorter than this (in characters) are never corrected.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,

    /// Maximum number of pages reconstructed concurrently during an export.
    /// Tuned to keep the model queue full without memory blowup.
    #[serde(default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: usize,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            top_k: default_top_k(),
            latin_replace_threshold: default_latin_replace_threshold(),
            near_miss_threshold: default_near_miss_threshold(),
            min_word_len: default_min_word_len(),
            max_concurrent_pages: default_max_concurrent_pages(),
        }
    }
}

/// Page structure analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Header/footer gaps must exceed this multiple of the median
    /// inter-line gap.
    #[serde(default = "default_header_gap_factor")]
    pub header_gap_factor: f32,

    /// Maximum number of lines in a gap-detected header or footer.
    #[serde(default = "default_max_header_lines")]
    pub max_header_lines: usize,

    /// How many bottom lines the content-based footer extension examines.
    #[serde(default = "default_footer_scan_lines")]
    pub footer_scan_lines: usize,

    /// Paragraph-break gaps must exceed this multiple of the median
    /// inter-line gap.
    #[serde(default = "default_paragraph_gap_factor")]
    pub paragraph_gap_factor: f32,

    /// Lines narrower than this fraction of the reference width end their
    /// paragraph.
    #[serde(default = "default_short_line_ratio")]
    pub short_line_ratio: f32,

    /// Percentile of body line widths used as the reference width.
    #[serde(default = "default_width_percentile")]
    pub width_percentile: f32,

    /// Maximum distance between a line's midpoint and the page center
    /// (as a fraction of the reference width) for centered paragraphs.
    #[serde(default = "default_centering_ratio")]
    pub centering_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_gap_factor: default_header_gap_factor(),
            max_header_lines: default_max_header_lines(),
            footer_scan_lines: default_footer_scan_lines(),
            paragraph_gap_factor: default_paragraph_gap_factor(),
            short_line_ratio: default_short_line_ratio(),
            width_percentile: default_width_percentile(),
            centering_ratio: default_centering_ratio(),
        }
    }
}

/// Export options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Document title; falls back to a generic title when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
}

fn default_hebrew_min_confidence() -> f32 {
    5.0
}

fn default_symbol_min_confidence() -> f32 {
    20.0
}

fn default_duplicate_overlap_ratio() -> f32 {
    0.5
}

fn default_margin_min_boxes() -> usize {
    10
}

fn default_margin_band_start() -> f32 {
    0.30
}

fn default_margin_band_end() -> f32 {
    0.45
}

fn default_margin_min_gap_ratio() -> f32 {
    0.03
}

fn default_max_len() -> usize {
    128
}

fn default_top_k() -> usize {
    20
}

fn default_latin_replace_threshold() -> f32 {
    0.05
}

fn default_near_miss_threshold() -> f32 {
    0.15
}

fn default_min_word_len() -> usize {
    3
}

fn default_max_concurrent_pages() -> usize {
    4
}

fn default_header_gap_factor() -> f32 {
    3.0
}

fn default_max_header_lines() -> usize {
    3
}

fn default_footer_scan_lines() -> usize {
    8
}

fn default_paragraph_gap_factor() -> f32 {
    1.5
}

fn default_short_line_ratio() -> f32 {
    0.7
}

fn default_width_percentile() -> f32 {
    0.8
}

fn default_centering_ratio() -> f32 {
    0.08
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconstructionConfig::default();
        assert_eq!(config.filter.hebrew_min_confidence, 5.0);
        assert_eq!(config.filter.symbol_min_confidence, 20.0);
        assert_eq!(config.filter.duplicate_overlap_ratio, 0.5);
        assert_eq!(config.filter.margin.min_boxes, 10);
        assert_eq!(config.lm.max_len, 128);
        assert_eq!(config.lm.top_k, 20);
        assert_eq!(config.lm.max_concurrent_pages, 4);
        assert_eq!(config.layout.max_header_lines, 3);
        assert_eq!(config.layout.footer_scan_lines, 8);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sofer.toml");
        std::fs::write(
            &path,
            r#"
[lm]
top_k = 10
max_concurrent_pages = 2

[filter]
hebrew_min_confidence = 10.0
"#,
        )
        .unwrap();

        let config = ReconstructionConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.lm.top_k, 10);
        assert_eq!(config.lm.max_concurrent_pages, 2);
        assert_eq!(config.filter.hebrew_min_confidence, 10.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.lm.max_len, 128);
        assert_eq!(config.layout.header_gap_factor, 3.0);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sofer.json");
        std::fs::write(&path, r#"{"layout": {"short_line_ratio": 0.6}}"#).unwrap();

        let config = ReconstructionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.layout.short_line_ratio, 0.6);
        assert_eq!(config.layout.paragraph_gap_factor, 1.5);
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sofer.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = ReconstructionConfig::from_toml_file(&path).unwrap_err();
        assert!(matches!(err, SoferError::Validation { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ReconstructionConfig::from_toml_file("/nonexistent/sofer.toml").unwrap_err();
        assert!(matches!(err, SoferError::Io(_)));
    }
}
