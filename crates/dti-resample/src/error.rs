//! Error types for the dti-resample crate.

use std::path::PathBuf;

use dti_field::FieldError;
use dti_tensor::TensorError;
use thiserror::Error;

/// Errors that can occur while transforming or resampling tensor fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    /// The affine map's linear part is not invertible.
    #[error("degenerate affine transform: determinant {determinant}")]
    DegenerateTransform {
        /// Determinant of the rejected linear part.
        determinant: f64,
    },

    /// Tensor reorientation failed at an output grid location.
    #[error("invalid tensor at output grid index {index:?}")]
    InvalidTensorAt {
        /// Output grid index being computed when the error occurred.
        index: [usize; 3],
        /// The underlying algebra error.
        #[source]
        source: TensorError,
    },

    /// Interpolation failed while sampling for an output grid location.
    #[error("sampling failed for output grid index {index:?}")]
    SampleAt {
        /// Output grid index being computed when the error occurred.
        index: [usize; 3],
        /// The underlying field error.
        #[source]
        source: FieldError,
    },

    /// A field-level error outside the per-point loop.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The legacy transform file could not be read or parsed.
    #[error("cannot read transform file {path}: {reason}")]
    TransformFile {
        /// Path of the offending file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The resampling was cancelled before completion.
    #[error("resampling cancelled")]
    Cancelled,
}

impl ResampleError {
    /// Creates a degenerate transform error.
    #[must_use]
    pub const fn degenerate_transform(determinant: f64) -> Self {
        Self::DegenerateTransform { determinant }
    }

    /// Creates a located invalid tensor error.
    #[must_use]
    pub const fn invalid_tensor_at(index: [usize; 3], source: TensorError) -> Self {
        Self::InvalidTensorAt { index, source }
    }

    /// Creates a located sampling error.
    #[must_use]
    pub const fn sample_at(index: [usize; 3], source: FieldError) -> Self {
        Self::SampleAt { index, source }
    }

    /// Creates a transform file error.
    #[must_use]
    pub fn transform_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::TransformFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_degenerate_transform() {
        let err = ResampleError::degenerate_transform(0.0);
        assert!(err.to_string().contains("degenerate"));
    }

    #[test]
    fn error_invalid_tensor_at_carries_index() {
        let err =
            ResampleError::invalid_tensor_at([3, 1, 4], TensorError::invalid_tensor(-0.1));
        assert!(err.to_string().contains("[3, 1, 4]"));
    }

    #[test]
    fn error_transform_file() {
        let err = ResampleError::transform_file("/tmp/missing.trsf", "no such file");
        assert!(err.to_string().contains("missing.trsf"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn error_cancelled() {
        assert_eq!(ResampleError::Cancelled.to_string(), "resampling cancelled");
    }
}
