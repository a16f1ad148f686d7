//! Log-Euclidean algebra for diffusion tensors.
//!
//! A diffusion tensor is a symmetric positive-definite (SPD) 3×3 matrix.
//! SPD matrices do not form a vector space: linearly interpolating or
//! averaging them can leave the SPD manifold and inflates determinants
//! ("tensor swelling"). This crate provides the log-Euclidean maps that fix
//! this: [`Tensor::log`] sends an SPD tensor into the vector space of
//! symmetric matrices, where linear operations are safe, and [`Tensor::exp`]
//! projects the result back onto the SPD manifold.
//!
//! # Tensor Algebra
//!
//! - [`Tensor`] - symmetric 3×3 matrix stored as 6 upper-triangle components
//! - [`Eigensystem`] - eigenvalues (ascending) and orthonormal eigenvectors
//! - [`Tensor::log`] / [`Tensor::exp`] - the log-Euclidean maps
//!
//! # Scalar Invariants
//!
//! - [`ScalarInvariant`] - rotation-invariant scalar summaries (mean
//!   diffusivity, fractional anisotropy, Westin shape coefficients, ...)
//!
//! # Example
//!
//! ```
//! use dti_tensor::Tensor;
//!
//! let t = Tensor::from_diagonal(2.0, 1.0, 0.5);
//! let log = t.log().unwrap();
//! let back = log.exp();
//!
//! for i in 0..6 {
//!     assert!((back.components()[i] - t.components()[i]).abs() < 1e-12);
//! }
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod eigen;
mod error;
mod invariants;
mod logexp;
mod tensor;

pub use eigen::Eigensystem;
pub use error::{Result, TensorError};
pub use invariants::ScalarInvariant;
pub use logexp::EIGENVALUE_TOLERANCE;
pub use tensor::Tensor;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Eigensystem, Result, ScalarInvariant, Tensor, TensorError};
}
