//! Error types for the dti-tensor crate.

use thiserror::Error;

/// Errors that can occur in tensor algebra operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TensorError {
    /// Matrix logarithm attempted on a non-positive-definite tensor.
    #[error("matrix log of non-positive-definite tensor: eigenvalue {eigenvalue}")]
    NonPositiveDefinite {
        /// The offending (non-positive) eigenvalue.
        eigenvalue: f64,
    },

    /// An operation required an SPD tensor and got something else.
    #[error("tensor is not positive semi-definite: eigenvalue {eigenvalue}")]
    InvalidTensor {
        /// The offending (negative) eigenvalue.
        eigenvalue: f64,
    },
}

impl TensorError {
    /// Creates a non-positive-definite error.
    #[must_use]
    pub const fn non_positive_definite(eigenvalue: f64) -> Self {
        Self::NonPositiveDefinite { eigenvalue }
    }

    /// Creates an invalid tensor error.
    #[must_use]
    pub const fn invalid_tensor(eigenvalue: f64) -> Self {
        Self::InvalidTensor { eigenvalue }
    }
}

/// Result type for tensor algebra operations.
pub type Result<T> = std::result::Result<T, TensorError>;
