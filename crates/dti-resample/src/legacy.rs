//! Reader for the legacy textual affine transform format.

use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, Vector3};

use crate::affine::AffineTensorTransform;
use crate::error::{ResampleError, Result};

/// Number of header tokens before the numeric payload.
const PREAMBLE_TOKENS: usize = 12;

/// Reads an affine transform from the legacy whitespace-tokenized format.
///
/// The format carries a 12-token preamble, then the 3×3 linear part in
/// row-major order, then the 3-vector translation. The parsed values build
/// the *forward* map `x' = M·x + t`; resampling applies its inverse to map
/// output points back into input space.
///
/// # Errors
///
/// Returns [`ResampleError::TransformFile`] if the file cannot be read,
/// holds fewer than 12 numeric values after the preamble, or contains a
/// token that does not parse as a number, and
/// [`ResampleError::DegenerateTransform`] if the parsed matrix is
/// singular.
pub fn read_legacy_transform(path: impl AsRef<Path>) -> Result<AffineTensorTransform> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).map_err(|e| ResampleError::transform_file(path, e.to_string()))?;
    parse_legacy_transform(&text, path)
}

fn parse_legacy_transform(text: &str, path: &Path) -> Result<AffineTensorTransform> {
    let mut values = [0.0_f64; 12];
    let mut tokens = text.split_whitespace().skip(PREAMBLE_TOKENS);
    for (slot, value) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            ResampleError::transform_file(
                path,
                format!("expected 12 numeric values after the preamble, got {slot}"),
            )
        })?;
        *value = token.parse().map_err(|_| {
            ResampleError::transform_file(path, format!("not a number: {token:?}"))
        })?;
    }

    let matrix = Matrix3::new(
        values[0], values[1], values[2], values[3], values[4], values[5], values[6], values[7],
        values[8],
    );
    let translation = Vector3::new(values[9], values[10], values[11]);
    AffineTensorTransform::new(matrix, translation)
}
