//! Affine resampling of diffusion-tensor fields.
//!
//! Resampling a tensor field is more than moving sample points: when the
//! coordinate frame itself transforms, each tensor must be reoriented by
//! the transform's linear part, and interpolation between samples must not
//! leave the SPD manifold. This crate composes both.
//!
//! # Affine Tensor Transform
//!
//! - [`AffineTensorTransform`] - affine map with a construction-time
//!   validated, cached inverse, plus the determinant-preserving tensor
//!   reorientation law
//! - [`read_legacy_transform`] - reader for the legacy textual transform
//!   format
//!
//! # Resampling Engine
//!
//! - [`resample`] - per-output-point inverse mapping, log-Euclidean
//!   interpolation, and reorientation, parallel over grid points
//! - [`resample_with_cancel`] - the same with cooperative cancellation
//! - [`resample_log_euclidean`] - the amortized whole-field log/exp
//!   strategy, numerically equivalent to per-point log-mode
//!
//! # Example
//!
//! ```
//! use dti_field::{FieldGeometry, TensorField, TensorInterpolator};
//! use dti_resample::{resample, AffineTensorTransform};
//! use dti_tensor::Tensor;
//! use nalgebra::{Matrix3, Vector3};
//!
//! let geometry = FieldGeometry::new([2, 2, 2])
//!     .unwrap()
//!     .with_origin(nalgebra::Point3::new(-0.5, -0.5, -0.5));
//! let input = TensorField::uniform(geometry.clone(), Tensor::from_diagonal(2.0, 1.0, 1.0));
//!
//! // 90 degree rotation about z.
//! let transform = AffineTensorTransform::new(
//!     Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
//!     Vector3::zeros(),
//! )
//! .unwrap();
//!
//! let output = resample(&input, &transform, geometry, &TensorInterpolator::default()).unwrap();
//! let t = output.get([0, 0, 0]).unwrap();
//! assert!((t.yy() - 2.0).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod affine;
mod engine;
mod error;
mod legacy;

pub use affine::AffineTensorTransform;
pub use engine::{resample, resample_log_euclidean, resample_with_cancel};
pub use error::{ResampleError, Result};
pub use legacy::read_legacy_transform;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        read_legacy_transform, resample, resample_log_euclidean, resample_with_cancel,
        AffineTensorTransform, ResampleError, Result,
    };
}
