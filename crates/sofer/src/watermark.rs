//! Cross-page watermark removal.
//!
//! Scanned filings often carry a stamp or watermark paragraph repeated on
//! every page. Paragraphs are normalized to a Hebrew-only signature and
//! counted across pages; signatures recurring on a majority of pages are
//! stripped from each page's text and structure.

use crate::emit::paragraph_text;
use crate::types::PageOutput;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Minimum number of pages before watermark detection activates.
const MIN_PAGES: usize = 3;
/// Minimum Hebrew letters in a signature for it to qualify.
const MIN_HEBREW_CHARS: usize = 4;

/// Signatures of paragraphs identified as repeating watermarks.
#[derive(Debug, Default)]
pub struct WatermarkFilter {
    signatures: AHashSet<String>,
}

impl WatermarkFilter {
    /// Detect watermark signatures across the pages of one export.
    pub fn detect(pages: &[PageOutput]) -> Self {
        if pages.len() < MIN_PAGES {
            return Self::default();
        }

        let mut page_counts: AHashMap<String, usize> = AHashMap::new();
        for page in pages {
            // Deduplicate within a page: a signature counts once per page.
            let mut seen: AHashSet<String> = AHashSet::new();
            for paragraph in split_paragraphs(&page.main_text) {
                let signature = hebrew_signature(paragraph);
                if signature.is_empty() {
                    continue;
                }
                seen.insert(signature);
            }
            for signature in seen {
                *page_counts.entry(signature).or_insert(0) += 1;
            }
        }

        let majority = pages.len() / 2;
        let signatures: AHashSet<String> = page_counts
            .into_iter()
            .filter(|(signature, count)| {
                *count > majority && crate::text::count_hebrew_chars(signature) >= MIN_HEBREW_CHARS
            })
            .map(|(signature, _)| signature)
            .collect();

        if !signatures.is_empty() {
            tracing::debug!(count = signatures.len(), "watermark signatures detected");
        }
        Self { signatures }
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn matches(&self, paragraph: &str) -> bool {
        self.signatures.contains(&hebrew_signature(paragraph))
    }

    /// Remove watermark paragraphs from the page's main text and from its
    /// structure. Header and footer line sets are preserved.
    pub fn strip(&self, page: &mut PageOutput) {
        if self.signatures.is_empty() {
            return;
        }

        let stripped_text = split_paragraphs(&page.main_text)
            .filter(|paragraph| !self.matches(paragraph))
            .join("\n\n");
        page.main_text = stripped_text;

        let boxes = std::mem::take(&mut page.boxes);
        page.structure
            .paragraphs
            .retain(|paragraph| !self.matches(&paragraph_text(&boxes, paragraph)));
        page.boxes = boxes;
    }
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

/// Normalize a paragraph to its Hebrew signature: only words containing at
/// least one Hebrew letter, joined by single spaces.
fn hebrew_signature(paragraph: &str) -> String {
    paragraph
        .split_whitespace()
        .filter(|word| crate::script::contains_hebrew(word))
        .join(" ")
}
