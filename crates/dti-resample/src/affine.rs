//! Affine spatial maps and the induced tensor reorientation law.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use dti_tensor::{Tensor, TensorError};

use crate::error::{ResampleError, Result};

/// An affine map `x' = M·x + t` together with the tensor transformation
/// law it induces.
///
/// The inverse pair (`M⁻¹`, `−M⁻¹·t`) is computed once at construction and
/// cached; a singular `M` is rejected with
/// [`ResampleError::DegenerateTransform`] before any resampling work can
/// start. The value is immutable afterwards, so the cached inverse can be
/// read concurrently without synchronization;
/// [`with_matrix`](Self::with_matrix) and
/// [`with_translation`](Self::with_translation) derive a new validated
/// transform instead of mutating in place.
///
/// The map is spatially uniform: the same `M` applies at every point.
///
/// # Example
///
/// ```
/// use dti_resample::AffineTensorTransform;
/// use nalgebra::{Matrix3, Point3, Vector3};
///
/// let t = AffineTensorTransform::new(
///     Matrix3::identity() * 2.0,
///     Vector3::new(1.0, 0.0, 0.0),
/// )
/// .unwrap();
///
/// let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
/// assert_eq!(p, Point3::new(3.0, 2.0, 2.0));
///
/// let back = t.inverse_transform_point(&p);
/// assert!((back - Point3::new(1.0, 1.0, 1.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineTensorTransform {
    matrix: Matrix3<f64>,
    translation: Vector3<f64>,
    inverse_matrix: Matrix3<f64>,
    inverse_translation: Vector3<f64>,
}

impl AffineTensorTransform {
    /// Creates a transform from its linear part and translation.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::DegenerateTransform`] if `matrix` is not
    /// invertible.
    pub fn new(matrix: Matrix3<f64>, translation: Vector3<f64>) -> Result<Self> {
        let inverse_matrix = matrix
            .try_inverse()
            .ok_or_else(|| ResampleError::degenerate_transform(matrix.determinant()))?;
        Ok(Self {
            matrix,
            translation,
            inverse_matrix,
            inverse_translation: -(inverse_matrix * translation),
        })
    }

    /// Creates the identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
            inverse_matrix: Matrix3::identity(),
            inverse_translation: Vector3::zeros(),
        }
    }

    /// Creates a pure rotation.
    ///
    /// Rotations are always invertible, so this cannot fail.
    #[must_use]
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        let matrix = *rotation.matrix();
        Self {
            matrix,
            translation: Vector3::zeros(),
            inverse_matrix: matrix.transpose(),
            inverse_translation: Vector3::zeros(),
        }
    }

    /// Returns a transform with a different linear part, re-deriving the
    /// cached inverse.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::DegenerateTransform`] if `matrix` is not
    /// invertible.
    pub fn with_matrix(self, matrix: Matrix3<f64>) -> Result<Self> {
        Self::new(matrix, self.translation)
    }

    /// Returns a transform with a different translation, re-deriving the
    /// cached inverse translation.
    #[must_use]
    pub fn with_translation(mut self, translation: Vector3<f64>) -> Self {
        self.translation = translation;
        self.inverse_translation = -(self.inverse_matrix * translation);
        self
    }

    /// Returns the linear part `M`.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Returns the translation `t`.
    #[must_use]
    pub const fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Applies the forward map: `M·p + t`.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.matrix * point.coords + self.translation)
    }

    /// Applies the cached inverse map: `M⁻¹·(p − t)`.
    #[must_use]
    pub fn inverse_transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.inverse_matrix * point.coords + self.inverse_translation)
    }

    /// Applies the tensor transformation law `T' = M·T·Mᵗ`, rescaled to
    /// preserve the determinant.
    ///
    /// A raw congruence transform scales `det(T)` by `det(M)²`, a volume
    /// change with no physical meaning for a diffusion measurement; only
    /// the orientation and shape should transform. Rescaling by
    /// `det(M)^(−2/3)` restores the original determinant exactly (the
    /// documented normalization convention), and is well-defined even for
    /// positive semi-definite inputs with zero determinant.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidTensor`] if the input is not positive
    /// semi-definite.
    pub fn transform_tensor(&self, tensor: &Tensor) -> std::result::Result<Tensor, TensorError> {
        if let Some(eigenvalue) = tensor.validity_violation() {
            return Err(TensorError::invalid_tensor(eigenvalue));
        }

        let congruence = self.matrix * tensor.to_matrix() * self.matrix.transpose();
        // det(M·T·Mᵗ) = det(M)²·det(T).
        let determinant_gain = (self.matrix.determinant() * self.matrix.determinant()).cbrt();
        Ok(Tensor::from_matrix(&congruence).scaled(1.0 / determinant_gain))
    }

    /// Returns the algebraic inverse `(M⁻¹, −M⁻¹·t)`.
    ///
    /// Swaps the cached forward and inverse pairs, so this never fails and
    /// `inverse().inverse()` reproduces the original exactly.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            matrix: self.inverse_matrix,
            translation: self.inverse_translation,
            inverse_matrix: self.matrix,
            inverse_translation: self.translation,
        }
    }

    /// Composes this transform with another (`self ∘ other`).
    ///
    /// The result applies `other` first, then `self`. Both inverse caches
    /// compose analytically, so no re-inversion happens.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
            translation: self.matrix * other.translation + self.translation,
            inverse_matrix: other.inverse_matrix * self.inverse_matrix,
            inverse_translation: other.inverse_matrix * self.inverse_translation
                + other.inverse_translation,
        }
    }
}

impl Default for AffineTensorTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_tensor_eq(a: &Tensor, b: &Tensor, epsilon: f64) {
        for (x, y) in a.components().iter().zip(b.components()) {
            assert_relative_eq!(*x, y, epsilon = epsilon, max_relative = epsilon);
        }
    }

    #[test]
    fn singular_matrix_rejected_at_construction() {
        let err = AffineTensorTransform::new(Matrix3::zeros(), Vector3::zeros()).unwrap_err();
        assert!(matches!(
            err,
            ResampleError::DegenerateTransform { determinant } if determinant == 0.0
        ));
    }

    #[test]
    fn point_roundtrip() {
        let t = AffineTensorTransform::new(
            Matrix3::new(2.0, 0.5, 0.0, 0.0, 1.5, 0.25, 0.0, 0.0, 3.0),
            Vector3::new(1.0, -2.0, 0.5),
        )
        .unwrap();

        let p = Point3::new(0.3, -1.2, 2.5);
        let back = t.inverse_transform_point(&t.transform_point(&p));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn identity_transform_fixes_tensors() {
        let t = AffineTensorTransform::identity();
        let tensor = Tensor::from_components([2.0, 0.3, 0.1, 1.5, -0.2, 1.0]);
        let out = t.transform_tensor(&tensor).unwrap();
        assert_tensor_eq(&out, &tensor, 1e-12);
    }

    #[test]
    fn rotation_permutes_eigenvalues() {
        // 90 degrees about z: the x principal axis becomes y.
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let t = AffineTensorTransform::from_rotation(&rotation);

        let out = t
            .transform_tensor(&Tensor::from_diagonal(2.0, 1.0, 1.0))
            .unwrap();
        assert_tensor_eq(&out, &Tensor::from_diagonal(1.0, 2.0, 1.0), 1e-12);
    }

    #[test]
    fn transform_preserves_determinant() {
        let t = AffineTensorTransform::new(
            Matrix3::new(2.0, 0.1, 0.0, -0.3, 0.5, 0.2, 0.0, 0.4, 1.5),
            Vector3::zeros(),
        )
        .unwrap();

        let tensor = Tensor::from_diagonal(3.0, 2.0, 1.0);
        let out = t.transform_tensor(&tensor).unwrap();
        assert_relative_eq!(out.determinant(), tensor.determinant(), epsilon = 1e-10);
        assert!(out.is_valid());
    }

    #[test]
    fn transform_rejects_invalid_tensor() {
        let t = AffineTensorTransform::identity();
        let err = t
            .transform_tensor(&Tensor::from_diagonal(1.0, -1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, TensorError::InvalidTensor { .. }));
    }

    #[test]
    fn transform_accepts_psd_zero_determinant() {
        let t = AffineTensorTransform::new(Matrix3::identity() * 2.0, Vector3::zeros()).unwrap();
        let out = t
            .transform_tensor(&Tensor::from_diagonal(1.0, 1.0, 0.0))
            .unwrap();
        assert!(out.is_valid());
        assert_relative_eq!(out.determinant(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn double_inverse_is_identity_on_points_and_tensors() {
        let t = AffineTensorTransform::new(
            Matrix3::new(1.0, 0.2, 0.0, 0.0, 2.0, 0.1, 0.3, 0.0, 1.5),
            Vector3::new(4.0, -1.0, 2.0),
        )
        .unwrap();
        let tt = t.inverse().inverse();

        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), tt.transform_point(&p));

        let tensor = Tensor::from_diagonal(3.0, 2.0, 1.0);
        assert_eq!(
            t.transform_tensor(&tensor).unwrap(),
            tt.transform_tensor(&tensor).unwrap()
        );
    }

    #[test]
    fn with_translation_rebuilds_inverse() {
        let t = AffineTensorTransform::new(Matrix3::identity() * 2.0, Vector3::zeros())
            .unwrap()
            .with_translation(Vector3::new(6.0, 0.0, 0.0));

        let back = t.inverse_transform_point(&Point3::new(6.0, 0.0, 0.0));
        assert!((back - Point3::origin()).norm() < 1e-12);
    }

    #[test]
    fn compose_matches_sequential_application() {
        let a = AffineTensorTransform::new(
            Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.5, 0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        let b = AffineTensorTransform::new(
            Matrix3::new(1.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.2, 0.0, 1.0),
            Vector3::new(0.0, -1.0, 0.0),
        )
        .unwrap();

        let ab = a.compose(&b);
        let p = Point3::new(0.5, 1.5, -2.0);
        let sequential = a.transform_point(&b.transform_point(&p));
        assert!((ab.transform_point(&p) - sequential).norm() < 1e-12);

        // The composed inverse cache is consistent too.
        let back = ab.inverse_transform_point(&ab.transform_point(&p));
        assert!((back - p).norm() < 1e-12);
    }
}
