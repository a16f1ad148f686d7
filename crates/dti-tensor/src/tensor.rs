//! Symmetric 3×3 tensor value type.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// A symmetric 3×3 matrix stored as its 6 upper-triangle components.
///
/// Component order is row-major over the upper triangle:
/// `[xx, xy, xz, yy, yz, zz]`.
///
/// A *valid* diffusion tensor is positive semi-definite (all eigenvalues
/// ≥ 0); see [`Tensor::is_valid`](crate::Tensor::is_valid). Non-SPD values
/// of this type arise legitimately as matrix logarithms and as intermediate
/// results of log-domain arithmetic.
///
/// # Example
///
/// ```
/// use dti_tensor::Tensor;
///
/// let t = Tensor::from_diagonal(2.0, 1.0, 1.0);
/// assert!((t.trace() - 4.0).abs() < 1e-12);
/// assert!((t.determinant() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tensor {
    components: [f64; 6],
}

impl Tensor {
    /// Creates a tensor from its 6 upper-triangle components
    /// `[xx, xy, xz, yy, yz, zz]`.
    #[must_use]
    pub const fn from_components(components: [f64; 6]) -> Self {
        Self { components }
    }

    /// Creates the zero tensor.
    ///
    /// This is the designated background value for out-of-domain samples.
    #[must_use]
    pub const fn zero() -> Self {
        Self::from_components([0.0; 6])
    }

    /// Creates the identity tensor.
    #[must_use]
    pub const fn identity() -> Self {
        Self::from_diagonal(1.0, 1.0, 1.0)
    }

    /// Creates a diagonal tensor `diag(xx, yy, zz)`.
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// let t = Tensor::from_diagonal(1.0, 2.0, 3.0);
    /// assert_eq!(t.components(), [1.0, 0.0, 0.0, 2.0, 0.0, 3.0]);
    /// ```
    #[must_use]
    pub const fn from_diagonal(xx: f64, yy: f64, zz: f64) -> Self {
        Self::from_components([xx, 0.0, 0.0, yy, 0.0, zz])
    }

    /// Creates a tensor from a full 3×3 matrix.
    ///
    /// Off-diagonal entries are averaged, so a slightly asymmetric matrix
    /// (from accumulated floating-point error) is symmetrized rather than
    /// silently truncated to one triangle.
    #[must_use]
    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        Self::from_components([
            m[(0, 0)],
            0.5 * (m[(0, 1)] + m[(1, 0)]),
            0.5 * (m[(0, 2)] + m[(2, 0)]),
            m[(1, 1)],
            0.5 * (m[(1, 2)] + m[(2, 1)]),
            m[(2, 2)],
        ])
    }

    /// Returns the full symmetric 3×3 matrix.
    ///
    /// # Example
    ///
    /// ```
    /// use dti_tensor::Tensor;
    ///
    /// let t = Tensor::from_components([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let m = t.to_matrix();
    /// assert_eq!(m[(0, 1)], m[(1, 0)]);
    /// assert_eq!(m[(1, 2)], 5.0);
    /// ```
    #[must_use]
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let [xx, xy, xz, yy, yz, zz] = self.components;
        Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
    }

    /// Returns the 6 upper-triangle components `[xx, xy, xz, yy, yz, zz]`.
    #[must_use]
    pub const fn components(&self) -> [f64; 6] {
        self.components
    }

    /// Returns the `xx` component.
    #[must_use]
    pub const fn xx(&self) -> f64 {
        self.components[0]
    }

    /// Returns the `xy` component.
    #[must_use]
    pub const fn xy(&self) -> f64 {
        self.components[1]
    }

    /// Returns the `xz` component.
    #[must_use]
    pub const fn xz(&self) -> f64 {
        self.components[2]
    }

    /// Returns the `yy` component.
    #[must_use]
    pub const fn yy(&self) -> f64 {
        self.components[3]
    }

    /// Returns the `yz` component.
    #[must_use]
    pub const fn yz(&self) -> f64 {
        self.components[4]
    }

    /// Returns the `zz` component.
    #[must_use]
    pub const fn zz(&self) -> f64 {
        self.components[5]
    }

    /// Returns the trace (sum of diagonal components).
    #[must_use]
    pub fn trace(&self) -> f64 {
        self.xx() + self.yy() + self.zz()
    }

    /// Returns the determinant, computed in closed form without
    /// decomposition.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let [xx, xy, xz, yy, yz, zz] = self.components;
        xx * (yy * zz - yz * yz) - xy * (xy * zz - yz * xz) + xz * (xy * yz - yy * xz)
    }

    /// Returns this tensor scaled by a factor.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut components = self.components;
        for c in &mut components {
            *c *= factor;
        }
        Self { components }
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.components.iter().all(|c| c.is_finite())
    }
}

impl std::ops::Add for Tensor {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut components = self.components;
        for (c, r) in components.iter_mut().zip(rhs.components) {
            *c += r;
        }
        Self { components }
    }
}

impl std::ops::AddAssign for Tensor {
    fn add_assign(&mut self, rhs: Self) {
        for (c, r) in self.components.iter_mut().zip(rhs.components) {
            *c += r;
        }
    }
}

impl std::ops::Mul<f64> for Tensor {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}
