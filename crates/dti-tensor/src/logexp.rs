//! Matrix log/exp maps and SPD validity checks.

use crate::error::{Result, TensorError};
use crate::tensor::Tensor;

/// Eigenvalues below this tolerance are treated as non-positive.
///
/// [`Tensor::log`] rejects them instead of clamping: a near-zero or
/// negative eigenvalue means the tensor left the SPD manifold and the
/// fault should be attributed, not smoothed over.
pub const EIGENVALUE_TOLERANCE: f64 = 1e-12;

impl Tensor {
    /// Computes the matrix logarithm.
    ///
    /// Decomposes the tensor, takes `ln` of each eigenvalue, and
    /// recomposes. The result is a symmetric matrix in the log-Euclidean
    /// vector space; it is generally *not* SPD and exists to be combined
    /// linearly (interpolation, averaging) before mapping back with
    /// [`Tensor::exp`].
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::NonPositiveDefinite`] if any eigenvalue is
    /// at or below [`EIGENVALUE_TOLERANCE`].
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// let t = Tensor::from_diagonal(1.0, std::f64::consts::E, 1.0);
    /// let log = t.log().unwrap();
    /// assert!((log.yy() - 1.0).abs() < 1e-12);
    ///
    /// assert!(Tensor::from_diagonal(1.0, -1.0, 1.0).log().is_err());
    /// ```
    pub fn log(&self) -> Result<Self> {
        let eigen = self.eigensystem();
        // Ascending order: checking the smallest eigenvalue covers all.
        if eigen.eigenvalues[0] <= EIGENVALUE_TOLERANCE {
            return Err(TensorError::non_positive_definite(eigen.eigenvalues[0]));
        }
        Ok(eigen.map_eigenvalues(f64::ln).recompose())
    }

    /// Computes the matrix exponential.
    ///
    /// Decomposes, takes `exp` of each eigenvalue, and recomposes. Since
    /// `exp` of a real is always positive, the result is always SPD: this
    /// is the operation that projects log-domain results back onto the
    /// valid-tensor manifold.
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// let s = Tensor::from_diagonal(0.0, -10.0, 3.0);
    /// assert!(s.exp().is_valid());
    /// ```
    #[must_use]
    pub fn exp(&self) -> Self {
        self.eigensystem().map_eigenvalues(f64::exp).recompose()
    }

    /// Returns true if the tensor is positive semi-definite within
    /// numerical tolerance (all eigenvalues ≥ −[`EIGENVALUE_TOLERANCE`]).
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// assert!(Tensor::identity().is_valid());
    /// assert!(Tensor::zero().is_valid());
    /// assert!(!Tensor::from_diagonal(1.0, -0.5, 1.0).is_valid());
    /// ```
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.eigensystem().eigenvalues[0] >= -EIGENVALUE_TOLERANCE
    }

    /// Returns the smallest eigenvalue if the tensor is not positive
    /// semi-definite, for error reporting.
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// assert!(Tensor::identity().validity_violation().is_none());
    /// assert!(Tensor::from_diagonal(1.0, -2.0, 3.0)
    ///     .validity_violation()
    ///     .is_some());
    /// ```
    #[must_use]
    pub fn validity_violation(&self) -> Option<f64> {
        let smallest = self.eigensystem().eigenvalues[0];
        (smallest < -EIGENVALUE_TOLERANCE).then_some(smallest)
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
    fn log_exp_roundtrip_diagonal() {
        let t = Tensor::from_diagonal(2.0, 1.0, 0.5);
        assert_tensor_eq(&t.log().unwrap().exp(), &t, 1e-10);
    }

    #[test]
    fn log_exp_roundtrip_full() {
        let t = Tensor::from_components([2.0, 0.3, 0.1, 1.5, -0.2, 1.0]);
        assert!(t.is_valid());
        assert_tensor_eq(&t.log().unwrap().exp(), &t, 1e-10);
    }

    #[test]
    fn exp_log_roundtrip_symmetric() {
        // Any symmetric matrix, SPD or not, survives exp-then-log.
        let s = Tensor::from_components([0.5, -1.0, 0.2, -0.3, 0.7, 0.0]);
        assert_tensor_eq(&s.exp().log().unwrap(), &s, 1e-9);
    }

    #[test]
    fn exp_is_always_spd() {
        let s = Tensor::from_components([0.0, 2.0, -3.0, -5.0, 1.0, 4.0]);
        let e = s.exp();
        assert!(e.is_valid());
        assert!(e.eigensystem().eigenvalues[0] > 0.0);
    }

    #[test]
    fn log_rejects_negative_eigenvalue() {
        let t = Tensor::from_diagonal(1.0, -1.0, 1.0);
        let err = t.log().unwrap_err();
        assert!(matches!(
            err,
            TensorError::NonPositiveDefinite { eigenvalue } if eigenvalue < 0.0
        ));
    }

    #[test]
    fn log_rejects_zero_tensor() {
        assert!(Tensor::zero().log().is_err());
    }

    #[test]
    fn log_rejects_near_zero_eigenvalue() {
        // Below tolerance is treated as invalid, not clamped.
        let t = Tensor::from_diagonal(1.0, 1e-13, 1.0);
        assert!(t.log().is_err());
    }

    #[test]
    fn log_of_identity_is_zero() {
        let log = Tensor::identity().log().unwrap();
        for c in log.components() {
            assert!(c.abs() < 1e-12);
        }
    }

    #[test]
    fn is_valid_psd_boundary() {
        // PSD (an exactly zero eigenvalue) is valid; log still rejects it.
        let t = Tensor::from_diagonal(1.0, 0.0, 1.0);
        assert!(t.is_valid());
        assert!(t.log().is_err());
    }

    #[test]
    fn validity_violation_reports_smallest() {
        let t = Tensor::from_diagonal(1.0, -2.0, 3.0);
        let v = t.validity_violation().unwrap();
        assert_relative_eq!(v, -2.0, epsilon = 1e-12);
        assert!(Tensor::identity().validity_violation().is_none());
    }
}
