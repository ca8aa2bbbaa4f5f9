//! Masked language model adapter.
//!
//! Wraps an external masked LM behind the narrow contract the corrector
//! needs: top-K candidates at a masked word, a vocabulary membership test,
//! and the confusion-pair fallback. The model handle is passed explicitly
//! into the post-processor; there is no process-global instance.

pub mod backend;
pub mod tokenizer;
pub mod vocab;

pub use backend::{MaskedLmBackend, OnnxMaskedLm};
pub use tokenizer::{EncodedInput, WordPieceTokenizer};
pub use vocab::{SpecialTokens, Vocabulary};

use crate::config::LmConfig;
use crate::script::contains_hebrew;
use crate::types::{MaskPrediction, TokenPrediction};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Shared masked-LM handle: tokenizer + optional inference backend.
///
/// Cheap to clone; pages processed in parallel share one instance. When no
/// backend is attached (`disabled`), predictions return `None` and callers
/// skip LM-driven correction gracefully.
#[derive(Debug, Clone)]
pub struct MaskedLm {
    backend: Option<Arc<dyn MaskedLmBackend>>,
    tokenizer: WordPieceTokenizer,
    max_len: usize,
    top_k: usize,
}

impl std::fmt::Debug for dyn MaskedLmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MaskedLmBackend")
    }
}

impl MaskedLm {
    pub fn new(backend: Arc<dyn MaskedLmBackend>, vocab: Arc<Vocabulary>, config: &LmConfig) -> Self {
        Self {
            backend: Some(backend),
            tokenizer: WordPieceTokenizer::new(vocab),
            max_len: config.max_len,
            top_k: config.top_k,
        }
    }

    /// An adapter without an inference backend: vocabulary-only operations
    /// still work, predictions are absent.
    pub fn disabled(vocab: Arc<Vocabulary>, config: &LmConfig) -> Self {
        Self {
            backend: None,
            tokenizer: WordPieceTokenizer::new(vocab),
            max_len: config.max_len,
            top_k: config.top_k,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    pub fn tokenizer(&self) -> &WordPieceTokenizer {
        &self.tokenizer
    }

    /// Predict candidates for `word_to_mask` within `line_text`.
    ///
    /// Returns `None` when the model is absent, the word produced no mask
    /// position, or inference failed; per-word failures never abort a page.
    pub async fn predict_masked(&self, line_text: &str, word_to_mask: &str) -> Option<MaskPrediction> {
        let backend = self.backend.as_ref()?;

        let encoded = self.tokenizer.encode_with_mask(line_text, word_to_mask, self.max_len);
        let first_mask = *encoded.mask_positions.first()?;

        let logits = match backend.forward(&encoded).await {
            Ok(logits) => logits,
            Err(e) => {
                tracing::warn!(word = word_to_mask, "masked prediction failed: {}", e);
                return None;
            }
        };
        let row = logits.row(first_mask);

        let probabilities = softmax(row.as_slice()?);
        let mut indexed: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));

        let vocab = self.tokenizer.vocab();
        let top_k: Vec<TokenPrediction> = indexed
            .into_iter()
            .take(self.top_k)
            .filter_map(|(id, probability)| {
                vocab.token_at(id as u32).map(|token| TokenPrediction {
                    token: token.to_string(),
                    probability,
                })
            })
            .collect();

        let hebrew_probability = top_k
            .iter()
            .filter(|p| contains_hebrew(&p.token))
            .map(|p| p.probability)
            .sum();

        Some(MaskPrediction { top_k, hebrew_probability })
    }

    /// Single-substitution correction against a set of visually confusable
    /// letter pairs.
    ///
    /// Words already in the vocabulary are left alone. A correction is
    /// returned only when exactly one in-vocabulary candidate exists;
    /// ambiguity means no correction.
    pub fn correct_by_confusion(&self, word: &str, pairs: &[(char, char)]) -> Option<String> {
        if self.tokenizer.is_in_vocab(word) {
            return None;
        }

        let chars: Vec<char> = word.chars().collect();
        let mut candidates = BTreeSet::new();
        for (position, &c) in chars.iter().enumerate() {
            for &(a, b) in pairs {
                let replacement = if c == a {
                    b
                } else if c == b {
                    a
                } else {
                    continue;
                };
                let mut candidate = chars.clone();
                candidate[position] = replacement;
                let candidate: String = candidate.into_iter().collect();
                if self.tokenizer.is_in_vocab(&candidate) {
                    candidates.insert(candidate);
                }
            }
        }

        if candidates.len() == 1 {
            candidates.into_iter().next()
        } else {
            None
        }
    }
}

/// Numerically stable softmax: shift by the row maximum before
/// exponentiation.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}
