//! Grid geometry: mapping between grid indices and physical space.

// Grid sizes are far below 2^53; usize -> f64 is exact in practice.
#![allow(clippy::cast_precision_loss)]

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Geometry of a rectilinear 3-D grid in physical space.
///
/// A grid index `[i, j, k]` maps to the physical point
/// `origin + direction · diag(spacing) · [i, j, k]ᵗ`. The inverse of
/// `direction · diag(spacing)` is computed once at construction, so
/// index-to-physical and physical-to-index conversions are consistent
/// inverses and safe to use concurrently.
///
/// Defaults: spacing `1.0` per axis, origin `0.0`, identity direction.
///
/// # Example
///
/// ```
/// use dti_field::FieldGeometry;
/// use nalgebra::Point3;
///
/// let geometry = FieldGeometry::new([4, 4, 4])
///     .unwrap()
///     .with_spacing([2.0, 2.0, 2.0])
///     .unwrap();
///
/// let p = geometry.index_to_physical([1, 2, 3]);
/// assert_eq!(p, Point3::new(2.0, 4.0, 6.0));
///
/// let ci = geometry.physical_to_continuous_index(p);
/// assert!((ci[0] - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    size: [usize; 3],
    spacing: [f64; 3],
    origin: Point3<f64>,
    direction: Matrix3<f64>,
    /// Cached `direction · diag(spacing)`.
    index_to_physical: Matrix3<f64>,
    /// Cached inverse of `index_to_physical`.
    physical_to_index: Matrix3<f64>,
}

impl FieldGeometry {
    /// Creates a geometry with the given size, unit spacing, zero origin,
    /// and identity direction.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Geometry`] if any size component is zero.
    pub fn new(size: [usize; 3]) -> Result<Self> {
        Self::build(size, [1.0; 3], Point3::origin(), Matrix3::identity())
    }

    /// Returns this geometry with a different spacing.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Geometry`] if any spacing component is not
    /// positive and finite.
    pub fn with_spacing(self, spacing: [f64; 3]) -> Result<Self> {
        Self::build(self.size, spacing, self.origin, self.direction)
    }

    /// Returns this geometry with a different origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Returns this geometry with a different grid-to-physical direction.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Geometry`] if the direction matrix is not
    /// invertible.
    pub fn with_direction(self, direction: Matrix3<f64>) -> Result<Self> {
        Self::build(self.size, self.spacing, self.origin, direction)
    }

    fn build(
        size: [usize; 3],
        spacing: [f64; 3],
        origin: Point3<f64>,
        direction: Matrix3<f64>,
    ) -> Result<Self> {
        if size.contains(&0) {
            return Err(FieldError::geometry(format!(
                "size components must be positive, got {size:?}"
            )));
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(FieldError::geometry(format!(
                "spacing components must be positive and finite, got {spacing:?}"
            )));
        }

        let index_to_physical =
            direction * Matrix3::from_diagonal(&Vector3::new(spacing[0], spacing[1], spacing[2]));
        let physical_to_index = index_to_physical
            .try_inverse()
            .ok_or_else(|| FieldError::geometry("direction matrix is not invertible"))?;

        Ok(Self {
            size,
            spacing,
            origin,
            direction,
            index_to_physical,
            physical_to_index,
        })
    }

    /// Returns the per-axis point count.
    #[must_use]
    pub const fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Returns the per-axis physical spacing.
    #[must_use]
    pub const fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Returns the physical position of grid index `[0, 0, 0]`.
    #[must_use]
    pub const fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Returns the grid-axis to physical-axis direction matrix.
    #[must_use]
    pub const fn direction(&self) -> &Matrix3<f64> {
        &self.direction
    }

    /// Returns the total number of grid points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// Returns true if the index is inside the grid.
    #[must_use]
    pub const fn contains_index(&self, index: [usize; 3]) -> bool {
        index[0] < self.size[0] && index[1] < self.size[1] && index[2] < self.size[2]
    }

    /// Flattens a grid index, x varying fastest.
    #[must_use]
    pub const fn linear_index(&self, index: [usize; 3]) -> usize {
        index[0] + self.size[0] * (index[1] + self.size[1] * index[2])
    }

    /// Expands a flat index back into a grid index triple.
    #[must_use]
    pub const fn index_from_linear(&self, linear: usize) -> [usize; 3] {
        let i = linear % self.size[0];
        let rest = linear / self.size[0];
        [i, rest % self.size[1], rest / self.size[1]]
    }

    /// Maps a grid index to its physical position.
    #[must_use]
    pub fn index_to_physical(&self, index: [usize; 3]) -> Point3<f64> {
        self.continuous_index_to_physical([index[0] as f64, index[1] as f64, index[2] as f64])
    }

    /// Maps a continuous grid coordinate to its physical position.
    #[must_use]
    pub fn continuous_index_to_physical(&self, index: [f64; 3]) -> Point3<f64> {
        self.origin + self.index_to_physical * Vector3::new(index[0], index[1], index[2])
    }

    /// Maps a physical position to a continuous grid coordinate.
    ///
    /// The result is unbounded: positions outside the grid yield
    /// coordinates outside `[0, size − 1]`.
    #[must_use]
    pub fn physical_to_continuous_index(&self, point: Point3<f64>) -> [f64; 3] {
        let index = self.physical_to_index * (point - self.origin);
        [index.x, index.y, index.z]
    }
}
