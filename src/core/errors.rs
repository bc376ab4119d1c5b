//! Error types for the predictor pipeline.
//!
//! This module defines the errors that can occur while loading a model,
//! batching inputs, running inference, and decoding output tensors, along
//! with helper constructors for building them with context.
//!
//! All errors propagate to the immediate caller; nothing is retried or
//! downgraded to a default value inside the crate, with the single documented
//! exception of the classification decoder's index-0 probabilities fallback.

use thiserror::Error;

use crate::core::tensor::DType;

/// Convenient result alias for predictor operations.
pub type PredictResult<T> = Result<T, PredictError>;

/// Enum representing the errors surfaced by the predictor pipeline.
#[derive(Error, Debug)]
pub enum PredictError {
    /// Model manifest, label resource, or engine graph could not be loaded.
    #[error("load failed: {message}")]
    Load {
        /// A message describing what failed to load.
        message: String,
        /// The underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Prediction input was absent, empty, or of the wrong kind.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Sample tensors with differing shapes were batched together, or a
    /// buffer length contradicts its declared shape.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The expected shape (or element count).
        expected: Vec<usize>,
        /// The actual shape (or element count).
        actual: Vec<usize>,
    },

    /// An element kind the operation does not support.
    #[error("unsupported dtype {dtype} for {context}")]
    UnsupportedDtype {
        /// The offending element kind.
        dtype: DType,
        /// The operation that rejected it.
        context: String,
    },

    /// A required output role was missing or an output tensor was
    /// inconsistent with its peers.
    #[error("decode failed: {message}")]
    Decode {
        /// A message describing the decode failure.
        message: String,
    },

    /// Opaque failure surfaced from the external inference engine, tagged
    /// with the originating operation for diagnostics.
    #[error("engine failure during {operation}")]
    Engine {
        /// The operation that was running when the engine failed.
        operation: String,
        /// The engine's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor reshaping.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl PredictError {
    /// Creates a load error from a message alone.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a load error wrapping an underlying cause.
    pub fn load_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Load {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a shape-mismatch error.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an unsupported-dtype error for the named operation.
    pub fn unsupported_dtype(dtype: DType, context: impl Into<String>) -> Self {
        Self::UnsupportedDtype {
            dtype,
            context: context.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a decode error for an output whose element count contradicts
    /// the count implied by another output.
    pub fn decode_count_mismatch(output: &str, expected: usize, actual: usize) -> Self {
        Self::Decode {
            message: format!(
                "output '{}' has {} elements, expected {}",
                output, actual, expected
            ),
        }
    }

    /// Creates an engine error tagged with the originating operation.
    pub fn engine(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Engine {
            operation: operation.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = PredictError::unsupported_dtype(DType::Int64, "input batching");
        assert_eq!(err.to_string(), "unsupported dtype int64 for input batching");

        let err = PredictError::shape_mismatch(&[3, 224, 224], &[3, 256, 256]);
        assert!(err.to_string().contains("[3, 224, 224]"));
        assert!(err.to_string().contains("[3, 256, 256]"));
    }

    #[test]
    fn decode_count_mismatch_names_the_output() {
        let err = PredictError::decode_count_mismatch("scores", 4, 7);
        assert_eq!(
            err.to_string(),
            "decode failed: output 'scores' has 7 elements, expected 4"
        );
    }

    #[test]
    fn engine_error_carries_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "device lost");
        let err = PredictError::engine("predict", inner);
        assert_eq!(err.to_string(), "engine failure during predict");
        assert!(std::error::Error::source(&err).is_some());
    }
}
