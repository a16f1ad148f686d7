//! Continuous-coordinate sampling of tensor fields.

// Continuous indices are validated non-negative before truncation.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use dti_tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::field::TensorField;

/// Interpolation kernel for sampling a tensor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Trilinear combination of the 8 enclosing lattice points.
    #[default]
    Trilinear,

    /// The nearest lattice point (no combination).
    Nearest,
}

/// Samples a [`TensorField`] at continuous grid coordinates.
///
/// In log-space mode (the default) each contributing neighbor is mapped
/// through the matrix logarithm before weighting and the combined result
/// through the matrix exponential afterwards, so the sample is always a
/// valid SPD tensor and determinants do not swell between lattice points.
/// Raw mode combines stored values linearly and may leave the SPD
/// manifold; it exists for pipelines that log the whole field up front.
///
/// # Boundary policy
///
/// Coordinates outside `[0, size − 1]` on any axis (including NaN) yield
/// the background zero tensor. This is a deterministic substitution, never
/// an error and never extrapolation.
///
/// # Example
///
/// ```
/// use dti_field::{FieldGeometry, TensorField, TensorInterpolator};
/// use dti_tensor::Tensor;
///
/// let geometry = FieldGeometry::new([2, 1, 1]).unwrap();
/// let field = TensorField::uniform(geometry, Tensor::identity());
///
/// let interpolator = TensorInterpolator::default();
/// let t = interpolator.interpolate(&field, [0.5, 0.0, 0.0]).unwrap();
/// assert!(t.is_valid());
///
/// // Outside the domain: background, not an error.
/// let bg = interpolator.interpolate(&field, [-1.0, 0.0, 0.0]).unwrap();
/// assert_eq!(bg, Tensor::zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorInterpolator {
    method: InterpolationMethod,
    log_space: bool,
}

impl Default for TensorInterpolator {
    fn default() -> Self {
        Self::new(InterpolationMethod::Trilinear)
    }
}

impl TensorInterpolator {
    /// Creates an interpolator with the given kernel, in log-space mode.
    #[must_use]
    pub const fn new(method: InterpolationMethod) -> Self {
        Self {
            method,
            log_space: true,
        }
    }

    /// Creates a trilinear log-space interpolator.
    #[must_use]
    pub const fn trilinear() -> Self {
        Self::new(InterpolationMethod::Trilinear)
    }

    /// Creates a nearest-neighbor interpolator.
    #[must_use]
    pub const fn nearest() -> Self {
        Self::new(InterpolationMethod::Nearest)
    }

    /// Sets log-space mode.
    #[must_use]
    pub const fn with_log_space(mut self, log_space: bool) -> Self {
        self.log_space = log_space;
        self
    }

    /// Returns the interpolation kernel.
    #[must_use]
    pub const fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Returns true if this interpolator combines values in log-space.
    #[must_use]
    pub const fn log_space(&self) -> bool {
        self.log_space
    }

    /// Samples the field at a continuous grid coordinate.
    ///
    /// Sampling exactly at a lattice point returns that point's stored
    /// tensor bit-for-bit: neighbors with exactly zero weight are never
    /// evaluated, and the single-point case short-circuits the log/exp
    /// round trip.
    ///
    /// # Errors
    ///
    /// In log-space mode, returns [`FieldError::NonPositiveDefiniteAt`]
    /// naming the grid index of any contributing neighbor whose tensor is
    /// not positive-definite. Raw mode never fails.
    pub fn interpolate(&self, field: &TensorField, index: [f64; 3]) -> Result<Tensor> {
        let size = field.geometry().size();
        for axis in 0..3 {
            let limit = (size[axis] - 1) as f64;
            // NaN fails both comparisons and falls through to background.
            if !(index[axis] >= 0.0 && index[axis] <= limit) {
                return Ok(Tensor::zero());
            }
        }

        match self.method {
            InterpolationMethod::Nearest => {
                let nearest = [
                    round_clamped(index[0], size[0]),
                    round_clamped(index[1], size[1]),
                    round_clamped(index[2], size[2]),
                ];
                // A single sample needs no combination, so log-space is a
                // no-op here.
                Ok(*field.at(nearest))
            }
            InterpolationMethod::Trilinear => self.trilinear_sample(field, index, size),
        }
    }

    fn trilinear_sample(
        &self,
        field: &TensorField,
        index: [f64; 3],
        size: [usize; 3],
    ) -> Result<Tensor> {
        let mut lower = [0_usize; 3];
        let mut upper = [0_usize; 3];
        let mut frac = [0.0_f64; 3];
        for axis in 0..3 {
            let floor = index[axis].floor();
            let i0 = (floor as usize).min(size[axis] - 1);
            lower[axis] = i0;
            upper[axis] = (i0 + 1).min(size[axis] - 1);
            frac[axis] = index[axis] - floor;
        }

        if frac == [0.0; 3] {
            return Ok(*field.at(lower));
        }

        let mut accum = Tensor::zero();
        for corner in 0..8_usize {
            let mut weight = 1.0;
            let mut neighbor = [0_usize; 3];
            for axis in 0..3 {
                if corner & (1 << axis) == 0 {
                    weight *= 1.0 - frac[axis];
                    neighbor[axis] = lower[axis];
                } else {
                    weight *= frac[axis];
                    neighbor[axis] = upper[axis];
                }
            }
            if weight == 0.0 {
                continue;
            }

            let stored = field.at(neighbor);
            let value = if self.log_space {
                stored
                    .log()
                    .map_err(|source| FieldError::non_positive_definite_at(neighbor, source))?
            } else {
                *stored
            };
            accum += value * weight;
        }

        if self.log_space {
            Ok(accum.exp())
        } else {
            Ok(accum)
        }
    }
}

fn round_clamped(coordinate: f64, size: usize) -> usize {
    (coordinate.round() as usize).min(size - 1)
}
