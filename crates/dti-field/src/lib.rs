//! Rectilinear tensor fields and log-domain interpolation.
//!
//! A [`TensorField`] is a dense 3-D grid of diffusion tensors plus a
//! [`FieldGeometry`] describing where the grid sits in physical space
//! (origin, per-axis spacing, axis orientation). Grid-index and physical
//! coordinates convert both ways through the geometry, and the conversions
//! are consistent inverses.
//!
//! # Interpolation
//!
//! [`TensorInterpolator`] samples a field at arbitrary continuous
//! coordinates. The default mode interpolates in the log-Euclidean domain:
//! each neighbor is mapped through the matrix logarithm, the weighted
//! combination happens in that vector space, and the result is mapped back
//! with the matrix exponential, so interpolated tensors stay on the SPD
//! manifold instead of swelling.
//!
//! # Example
//!
//! ```
//! use dti_field::{FieldGeometry, TensorField, TensorInterpolator};
//! use dti_tensor::Tensor;
//!
//! let geometry = FieldGeometry::new([2, 2, 2]).unwrap();
//! let field = TensorField::uniform(geometry, Tensor::identity());
//!
//! let interpolator = TensorInterpolator::default();
//! let t = interpolator.interpolate(&field, [0.5, 0.5, 0.5]).unwrap();
//! assert!(t.is_valid());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod field;
mod geometry;
mod interpolation;

pub use error::{FieldError, Result};
pub use field::TensorField;
pub use geometry::FieldGeometry;
pub use interpolation::{InterpolationMethod, TensorInterpolator};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        FieldError, FieldGeometry, InterpolationMethod, Result, TensorField, TensorInterpolator,
    };
}
