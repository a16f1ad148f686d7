//! Error types for the dti-field crate.

use dti_tensor::TensorError;
use thiserror::Error;

/// Errors that can occur in tensor field operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// Requested geometry is internally inconsistent.
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// Tensor data length does not match the geometry's point count.
    #[error("data length mismatch: geometry has {expected} points, got {actual} tensors")]
    DataLength {
        /// Point count implied by the geometry.
        expected: usize,
        /// Number of tensors supplied.
        actual: usize,
    },

    /// A tensor at a specific grid location failed the matrix logarithm.
    #[error("tensor at grid index {index:?} is not positive-definite")]
    NonPositiveDefiniteAt {
        /// Grid index of the offending tensor.
        index: [usize; 3],
        /// The underlying algebra error.
        #[source]
        source: TensorError,
    },
}

impl FieldError {
    /// Creates an invalid geometry error.
    #[must_use]
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::Geometry(reason.into())
    }

    /// Creates a data length mismatch error.
    #[must_use]
    pub const fn data_length(expected: usize, actual: usize) -> Self {
        Self::DataLength { expected, actual }
    }

    /// Creates a located non-positive-definite error.
    #[must_use]
    pub const fn non_positive_definite_at(index: [usize; 3], source: TensorError) -> Self {
        Self::NonPositiveDefiniteAt { index, source }
    }
}

/// Result type for tensor field operations.
pub type Result<T> = std::result::Result<T, FieldError>;
