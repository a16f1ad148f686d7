//! Symmetric eigendecomposition of tensors.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::tensor::Tensor;

/// Eigendecomposition of a symmetric 3×3 tensor.
///
/// Eigenvalues are sorted ascending so tie-break-sensitive consumers see a
/// deterministic order; `eigenvectors` holds the corresponding orthonormal
/// eigenvectors as columns.
///
/// This is a transient value: it is recomputed per tensor per call and
/// never stored in a field.
///
/// # Example
///
/// ```
/// use dti_tensor::Tensor;
///
/// let t = Tensor::from_diagonal(3.0, 1.0, 2.0);
/// let eigen = t.eigensystem();
///
/// assert!((eigen.eigenvalues[0] - 1.0).abs() < 1e-12);
/// assert!((eigen.eigenvalues[1] - 2.0).abs() < 1e-12);
/// assert!((eigen.eigenvalues[2] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Eigensystem {
    /// Eigenvalues in ascending order.
    pub eigenvalues: [f64; 3],
    /// Orthonormal eigenvectors, one column per eigenvalue.
    pub eigenvectors: Matrix3<f64>,
}

impl Eigensystem {
    /// Reassembles the symmetric tensor `V · diag(λ) · Vᵗ`.
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// let t = Tensor::from_components([2.0, 0.5, 0.0, 1.5, 0.25, 1.0]);
    /// let back = t.eigensystem().recompose();
    ///
    /// for i in 0..6 {
    ///     assert!((back.components()[i] - t.components()[i]).abs() < 1e-10);
    /// }
    /// ```
    #[must_use]
    pub fn recompose(&self) -> Tensor {
        let lambda = Matrix3::from_diagonal(&Vector3::new(
            self.eigenvalues[0],
            self.eigenvalues[1],
            self.eigenvalues[2],
        ));
        Tensor::from_matrix(&(self.eigenvectors * lambda * self.eigenvectors.transpose()))
    }

    /// Returns a copy with each eigenvalue replaced by `f(λ)`, keeping the
    /// eigenvectors.
    #[must_use]
    pub fn map_eigenvalues(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            eigenvalues: [
                f(self.eigenvalues[0]),
                f(self.eigenvalues[1]),
                f(self.eigenvalues[2]),
            ],
            eigenvectors: self.eigenvectors,
        }
    }

    /// Returns the unit eigenvector of the largest eigenvalue (the
    /// principal diffusion direction).
    #[must_use]
    pub fn principal_direction(&self) -> Vector3<f64> {
        self.eigenvectors.column(2).into_owned()
    }
}

impl Tensor {
    /// Computes the eigendecomposition of this tensor.
    ///
    /// Degenerate inputs (repeated eigenvalues, the zero tensor) are
    /// handled without blow-up; the eigenvector basis is then one valid
    /// orthonormal choice among many.
    #[must_use]
    pub fn eigensystem(&self) -> Eigensystem {
        let eigen = SymmetricEigen::new(self.to_matrix());

        // nalgebra returns eigenvalues unordered; sort ascending and
        // permute the eigenvector columns to match.
        let mut order = [0_usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

        let eigenvalues = [
            eigen.eigenvalues[order[0]],
            eigen.eigenvalues[order[1]],
            eigen.eigenvalues[order[2]],
        ];
        let eigenvectors = Matrix3::from_columns(&[
            eigen.eigenvectors.column(order[0]).into_owned(),
            eigen.eigenvectors.column(order[1]).into_owned(),
            eigen.eigenvectors.column(order[2]).into_owned(),
        ]);

        Eigensystem {
            eigenvalues,
            eigenvectors,
        }
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
    fn eigenvalues_ascending() {
        let t = Tensor::from_diagonal(5.0, -1.0, 2.0);
        let eigen = t.eigensystem();
        assert!(eigen.eigenvalues[0] <= eigen.eigenvalues[1]);
        assert!(eigen.eigenvalues[1] <= eigen.eigenvalues[2]);
        assert_relative_eq!(eigen.eigenvalues[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.eigenvalues[2], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn eigenvectors_orthonormal() {
        let t = Tensor::from_components([2.0, 0.7, -0.3, 1.5, 0.1, 0.9]);
        let v = t.eigensystem().eigenvectors;
        let should_be_identity = v.transpose() * v;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn recompose_roundtrip() {
        let t = Tensor::from_components([2.0, 0.7, -0.3, 1.5, 0.1, 0.9]);
        assert_tensor_eq(&t.eigensystem().recompose(), &t, 1e-10);
    }

    #[test]
    fn recompose_roundtrip_repeated_eigenvalues() {
        let t = Tensor::from_diagonal(2.0, 2.0, 2.0);
        assert_tensor_eq(&t.eigensystem().recompose(), &t, 1e-12);
    }

    #[test]
    fn recompose_roundtrip_zero() {
        let t = Tensor::zero();
        assert_tensor_eq(&t.eigensystem().recompose(), &t, 1e-15);
    }

    #[test]
    fn recompose_roundtrip_near_zero() {
        let t = Tensor::from_components([1e-14, 1e-15, 0.0, 1e-14, 0.0, 1e-14]);
        let back = t.eigensystem().recompose();
        for (x, y) in back.components().iter().zip(t.components()) {
            assert!((x - y).abs() < 1e-13);
        }
    }

    #[test]
    fn map_eigenvalues_doubles() {
        let t = Tensor::from_diagonal(1.0, 2.0, 3.0);
        let doubled = t.eigensystem().map_eigenvalues(|l| 2.0 * l).recompose();
        assert_tensor_eq(&doubled, &Tensor::from_diagonal(2.0, 4.0, 6.0), 1e-12);
    }

    #[test]
    fn principal_direction_axis_aligned() {
        let t = Tensor::from_diagonal(1.0, 1.0, 4.0);
        let dir = t.eigensystem().principal_direction();
        assert_relative_eq!(dir.z.abs(), 1.0, epsilon = 1e-12);
    }
}
