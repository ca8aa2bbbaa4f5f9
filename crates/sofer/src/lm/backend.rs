//! Masked language model backends.
//!
//! The pipeline only consumes a narrow contract: three integer sequences in,
//! one logits matrix out. The production backend wraps an ONNX Runtime
//! session; tests substitute a canned backend.

use super::tokenizer::EncodedInput;
use crate::{Result, SoferError};
use async_trait::async_trait;
use ndarray::{Array2, ArrayView3};
use std::path::Path;
use std::sync::Mutex;

/// A masked-LM evaluation backend.
///
/// `forward` returns one logits row per input position (`[max_len, vocab]`).
/// Implementations are shared across concurrently processed pages and must
/// serialize access to any mutable model state internally.
#[async_trait]
pub trait MaskedLmBackend: Send + Sync {
    async fn forward(&self, input: &EncodedInput) -> Result<Array2<f32>>;
}

/// ONNX Runtime backend for a BERT-style masked LM.
///
/// Inputs `input_ids` / `attention_mask` / `token_type_ids` of shape
/// `[1, max_len]` (i64), output `logits` of shape `[1, max_len, vocab]`
/// in f32 or f16.
pub struct OnnxMaskedLm {
    session: Mutex<ort::session::Session>,
    max_len: usize,
}

impl std::fmt::Debug for OnnxMaskedLm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxMaskedLm").field("max_len", &self.max_len).finish()
    }
}

impl OnnxMaskedLm {
    /// Load the model from an `.onnx` file.
    pub fn from_file(model_path: impl AsRef<Path>, max_len: usize) -> Result<Self> {
        let path = model_path.as_ref();
        let session = ort::session::Session::builder()
            .and_then(|mut builder| builder.commit_from_file(path))
            .map_err(|e| {
                SoferError::inference_with_source(format!("failed to load masked-LM model at '{}'", path.display()), e)
            })?;
        Ok(Self { session: Mutex::new(session), max_len })
    }

    fn extract_logits(
        shape: &[i64],
        data: Vec<f32>,
        max_len: usize,
    ) -> Result<Array2<f32>> {
        if shape.len() != 3 || shape[0] != 1 || shape[1] != max_len as i64 {
            return Err(SoferError::inference(format!(
                "unexpected logits shape {:?}, expected [1, {}, vocab]",
                shape, max_len
            )));
        }
        let vocab_size = shape[2] as usize;
        if data.len() != max_len * vocab_size {
            return Err(SoferError::inference(format!(
                "logits data size mismatch: expected {}, got {}",
                max_len * vocab_size,
                data.len()
            )));
        }
        let view = ArrayView3::from_shape((1, max_len, vocab_size), &data)
            .map_err(|e| SoferError::inference_with_source("logits tensor reshape failed", e))?;
        Ok(view.index_axis(ndarray::Axis(0), 0).to_owned())
    }
}

#[async_trait]
impl MaskedLmBackend for OnnxMaskedLm {
    async fn forward(&self, input: &EncodedInput) -> Result<Array2<f32>> {
        let ids = Array2::from_shape_vec((1, self.max_len), input.input_ids.clone())
            .map_err(|e| SoferError::inference_with_source("input_ids shape mismatch", e))?;
        let attention = Array2::from_shape_vec((1, self.max_len), input.attention_mask.clone())
            .map_err(|e| SoferError::inference_with_source("attention_mask shape mismatch", e))?;
        let type_ids = Array2::from_shape_vec((1, self.max_len), input.token_type_ids.clone())
            .map_err(|e| SoferError::inference_with_source("token_type_ids shape mismatch", e))?;

        let ids_tensor = ort::value::TensorRef::from_array_view(ids.view())
            .map_err(|e| SoferError::inference_with_source("input_ids tensor conversion failed", e))?;
        let attention_tensor = ort::value::TensorRef::from_array_view(attention.view())
            .map_err(|e| SoferError::inference_with_source("attention_mask tensor conversion failed", e))?;
        let type_ids_tensor = ort::value::TensorRef::from_array_view(type_ids.view())
            .map_err(|e| SoferError::inference_with_source("token_type_ids tensor conversion failed", e))?;

        let inputs = ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => attention_tensor,
            "token_type_ids" => type_ids_tensor,
        ];

        // The session holds mutable internal state; one prediction at a time.
        let mut session = self
            .session
            .lock()
            .map_err(|_| SoferError::LockPoisoned("masked-LM session".to_string()))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| SoferError::inference_with_source("masked-LM forward pass failed", e))?;

        let logits = &outputs["logits"];
        let (shape, data) = match logits.try_extract_tensor::<f32>() {
            Ok((shape, data)) => (shape.to_vec(), data.to_vec()),
            Err(_) => {
                let (shape, data) = logits.try_extract_tensor::<half::f16>().map_err(|e| {
                    SoferError::inference_with_source("logits tensor is neither f32 nor f16", e)
                })?;
                tracing::warn!("masked-LM logits are f16, widening to f32");
                (shape.to_vec(), data.iter().map(|v| v.to_f32()).collect())
            }
        };

        Self::extract_logits(&shape, data, self.max_len)
    }
}
