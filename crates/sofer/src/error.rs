//! Error types for Sofer.
//!
//! All fallible operations return [`Result`], built on [`SoferError`].
//!
//! The pipeline is lenient locally and strict structurally:
//!
//! - Malformed OCR rows, unavailable language models and failed per-word
//!   predictions are encoded as absence (skipped rows, `None` predictions,
//!   untouched boxes) and never surface as errors.
//! - Structural problems (a missing vocabulary file, a corrupt model, an
//!   export that cannot be serialized) are real errors and bubble up.
//! - `SoferError::Io` (from `std::io::Error`) always bubbles up unchanged.
use thiserror::Error;

/// Result type alias using `SoferError`.
pub type Result<T> = std::result::Result<T, SoferError>;

/// Main error type for all Sofer operations.
#[derive(Debug, Error)]
pub enum SoferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Vocabulary error: {message}")]
    Vocabulary {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Inference error: {message}")]
    Inference {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SoferError {
    fn from(err: serde_json::Error) -> Self {
        SoferError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<zip::result::ZipError> for SoferError {
    fn from(err: zip::result::ZipError) -> Self {
        SoferError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        paste::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl SoferError {
    error_constructor!(parsing, Parsing);
    error_constructor!(vocabulary, Vocabulary);
    error_constructor!(inference, Inference);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SoferError = io_err.into();
        assert!(matches!(err, SoferError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error() {
        let err = SoferError::parsing("bad row");
        assert_eq!(err.to_string(), "Parsing error: bad row");
    }

    #[test]
    fn test_vocabulary_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
        let err = SoferError::vocabulary_with_source("vocab unreadable", source);
        assert_eq!(err.to_string(), "Vocabulary error: vocab unreadable");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_inference_error() {
        let err = SoferError::inference("session failed");
        assert_eq!(err.to_string(), "Inference error: session failed");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: SoferError = json_err.into();
        assert!(matches!(err, SoferError::Serialization { .. }));
    }

    #[test]
    fn test_lock_poisoned_error() {
        let err = SoferError::LockPoisoned("model session".to_string());
        assert_eq!(err.to_string(), "Lock poisoned: model session");
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/vocab.txt")?;
            Ok(content)
        }
        assert!(matches!(read().unwrap_err(), SoferError::Io(_)));
    }
}
