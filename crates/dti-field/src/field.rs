//! Dense tensor field storage.

use dti_tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::geometry::FieldGeometry;

/// A dense rectilinear grid of diffusion tensors.
///
/// Storage is a flat `Vec<Tensor>` in x-fastest order; the
/// [`FieldGeometry`] places the grid in physical space.
///
/// # Example
///
/// ```
/// use dti_field::{FieldGeometry, TensorField};
/// use dti_tensor::Tensor;
///
/// let geometry = FieldGeometry::new([2, 2, 2]).unwrap();
/// let mut field = TensorField::new(geometry);
///
/// field.set([1, 0, 1], Tensor::identity());
/// assert_eq!(field.get([1, 0, 1]), Some(&Tensor::identity()));
/// assert_eq!(field.get([0, 0, 0]), Some(&Tensor::zero()));
/// assert_eq!(field.get([2, 0, 0]), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorField {
    geometry: FieldGeometry,
    tensors: Vec<Tensor>,
}

impl TensorField {
    /// Creates a field filled with the zero tensor.
    #[must_use]
    pub fn new(geometry: FieldGeometry) -> Self {
        Self::uniform(geometry, Tensor::zero())
    }

    /// Creates a field filled with one tensor value.
    #[must_use]
    pub fn uniform(geometry: FieldGeometry, tensor: Tensor) -> Self {
        let tensors = vec![tensor; geometry.num_points()];
        Self { geometry, tensors }
    }

    /// Creates a field from existing tensor data in x-fastest order.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DataLength`] if the data length does not
    /// match the geometry's point count.
    pub fn from_tensors(geometry: FieldGeometry, tensors: Vec<Tensor>) -> Result<Self> {
        if tensors.len() != geometry.num_points() {
            return Err(FieldError::data_length(
                geometry.num_points(),
                tensors.len(),
            ));
        }
        Ok(Self { geometry, tensors })
    }

    /// Returns the field geometry.
    #[must_use]
    pub const fn geometry(&self) -> &FieldGeometry {
        &self.geometry
    }

    /// Returns the number of grid points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.tensors.len()
    }

    /// Returns the tensor at a grid index, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, index: [usize; 3]) -> Option<&Tensor> {
        self.geometry
            .contains_index(index)
            .then(|| &self.tensors[self.geometry.linear_index(index)])
    }

    /// Sets the tensor at a grid index, returning the previous value.
    ///
    /// Returns `None` without writing if the index is outside the grid.
    pub fn set(&mut self, index: [usize; 3], tensor: Tensor) -> Option<Tensor> {
        if !self.geometry.contains_index(index) {
            return None;
        }
        let linear = self.geometry.linear_index(index);
        Some(std::mem::replace(&mut self.tensors[linear], tensor))
    }

    /// Returns the flat tensor storage in x-fastest order.
    #[must_use]
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Tensor lookup for callers that already validated the index.
    pub(crate) fn at(&self, index: [usize; 3]) -> &Tensor {
        &self.tensors[self.geometry.linear_index(index)]
    }

    /// Iterates over `(grid index, tensor)` pairs in storage order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = ([usize; 3], &Tensor)> {
        self.tensors
            .iter()
            .enumerate()
            .map(|(linear, t)| (self.geometry.index_from_linear(linear), t))
    }

    /// Maps the whole field through the matrix logarithm.
    ///
    /// This is the pre-processing half of the amortized log-Euclidean
    /// pipeline: log the field once, run any number of linear operations
    /// (interpolation, resampling) in raw mode, then
    /// [`exp_transformed`](Self::exp_transformed) once. The result is
    /// numerically equivalent to per-point log-mode interpolation.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::NonPositiveDefiniteAt`] naming the first grid
    /// index whose tensor is not positive-definite.
    pub fn log_transformed(&self) -> Result<Self> {
        let mut tensors = Vec::with_capacity(self.tensors.len());
        for (index, tensor) in self.iter_indexed() {
            let logged = tensor
                .log()
                .map_err(|source| FieldError::non_positive_definite_at(index, source))?;
            tensors.push(logged);
        }
        Ok(Self {
            geometry: self.geometry.clone(),
            tensors,
        })
    }

    /// Maps the whole field through the matrix exponential.
    ///
    /// Total: every symmetric input yields a valid SPD tensor.
    #[must_use]
    pub fn exp_transformed(&self) -> Self {
        Self {
            geometry: self.geometry.clone(),
            tensors: self.tensors.iter().map(Tensor::exp).collect(),
        }
    }
}
