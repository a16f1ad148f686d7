//! Rotation-invariant scalar measures derived from a tensor.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// A scalar invariant of a diffusion tensor.
///
/// Each variant is a closed-form function of the tensor's eigenvalues (or
/// of its trace/determinant where that avoids a decomposition). The set is
/// a closed enumeration so exhaustiveness is checked at compile time;
/// adding a variant means adding one match arm in
/// [`ScalarInvariant::evaluate`].
///
/// All variants are total: degenerate tensors (all eigenvalues equal,
/// including the zero tensor) evaluate to a defined value, never NaN.
///
/// # Example
///
/// ```
/// use dti_tensor::{ScalarInvariant, Tensor};
///
/// let isotropic = Tensor::identity();
/// let fa = ScalarInvariant::FractionalAnisotropy.evaluate(&isotropic);
/// assert_eq!(fa, 0.0);
///
/// let stick = Tensor::from_diagonal(1.0, 0.0, 0.0);
/// let fa = ScalarInvariant::FractionalAnisotropy.evaluate(&stick);
/// assert!((fa - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScalarInvariant {
    /// Mean diffusivity: trace / 3.
    #[default]
    MeanDiffusivity,

    /// Fractional anisotropy, in `[0, 1]`; 0 for isotropic tensors.
    FractionalAnisotropy,

    /// Relative anisotropy: eigenvalue standard deviation over mean.
    RelativeAnisotropy,

    /// Determinant of the tensor.
    Determinant,

    /// Westin linear shape coefficient `cl = (λ₁ − λ₂) / trace`
    /// (eigenvalues descending).
    LinearCoefficient,

    /// Westin planar shape coefficient `cp = 2(λ₂ − λ₃) / trace`
    /// (eigenvalues descending).
    PlanarCoefficient,

    /// Westin spherical shape coefficient `cs = 3λ₃ / trace`
    /// (eigenvalues descending).
    SphericalCoefficient,
}

/// Denominators below this are treated as degenerate and evaluate to 0.
const DEGENERACY_TOLERANCE: f64 = 1e-300;

impl ScalarInvariant {
    /// Every variant, for iteration in tests and exhaustive consumers.
    pub const ALL: [Self; 7] = [
        Self::MeanDiffusivity,
        Self::FractionalAnisotropy,
        Self::RelativeAnisotropy,
        Self::Determinant,
        Self::LinearCoefficient,
        Self::PlanarCoefficient,
        Self::SphericalCoefficient,
    ];

    /// Returns true if this variant needs a full eigendecomposition.
    ///
    /// Trace- and determinant-based variants are computed in closed form
    /// from the components.
    #[must_use]
    pub const fn needs_decomposition(&self) -> bool {
        !matches!(self, Self::MeanDiffusivity | Self::Determinant)
    }

    /// Evaluates this invariant on a tensor.
    #[must_use]
    pub fn evaluate(&self, tensor: &Tensor) -> f64 {
        match self {
            Self::MeanDiffusivity => tensor.trace() / 3.0,
            Self::Determinant => tensor.determinant(),
            Self::FractionalAnisotropy => fractional_anisotropy(tensor),
            Self::RelativeAnisotropy => relative_anisotropy(tensor),
            Self::LinearCoefficient => westin(tensor, |l1, l2, _, tr| (l1 - l2) / tr),
            Self::PlanarCoefficient => westin(tensor, |_, l2, l3, tr| 2.0 * (l2 - l3) / tr),
            Self::SphericalCoefficient => westin(tensor, |_, _, l3, tr| 3.0 * l3 / tr),
        }
    }
}

fn fractional_anisotropy(tensor: &Tensor) -> f64 {
    let l = tensor.eigensystem().eigenvalues;
    let norm_sq: f64 = l.iter().map(|x| x * x).sum();
    if norm_sq < DEGENERACY_TOLERANCE {
        return 0.0;
    }
    let mean = (l[0] + l[1] + l[2]) / 3.0;
    let dev_sq: f64 = l.iter().map(|x| (x - mean) * (x - mean)).sum();
    (1.5 * dev_sq / norm_sq).sqrt()
}

fn relative_anisotropy(tensor: &Tensor) -> f64 {
    let l = tensor.eigensystem().eigenvalues;
    let mean = (l[0] + l[1] + l[2]) / 3.0;
    if mean.abs() < DEGENERACY_TOLERANCE {
        return 0.0;
    }
    let dev_sq: f64 = l.iter().map(|x| (x - mean) * (x - mean)).sum();
    (dev_sq / 3.0).sqrt() / mean
}

/// Evaluates a Westin shape coefficient with eigenvalues descending.
fn westin(tensor: &Tensor, f: impl Fn(f64, f64, f64, f64) -> f64) -> f64 {
    let l = tensor.eigensystem().eigenvalues;
    let trace = l[0] + l[1] + l[2];
    if trace.abs() < DEGENERACY_TOLERANCE {
        return 0.0;
    }
    // Ascending storage order; Westin's convention is descending.
    f(l[2], l[1], l[0], trace)
}
