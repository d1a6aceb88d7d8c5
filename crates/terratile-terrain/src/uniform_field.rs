//! Latitude-like directional field used to bias heat.

use crate::error::{TerrainError, TerrainResult};
use crate::field::ScalarField;

/// Generate a `size × size` field that varies only along `x`.
///
/// Row `x` holds `|x + vertex_offset| / max_distance` in every cell. Values
/// are not clamped; heat derivation clamps downstream.
///
/// # Errors
///
/// [`TerrainError::Config`] if `max_distance` is zero or not finite.
pub fn generate_uniform(
    size: usize,
    vertex_offset: f64,
    max_distance: f64,
) -> TerrainResult<ScalarField> {
    if !(max_distance.is_finite() && max_distance != 0.0) {
        return Err(TerrainError::Config(format!(
            "uniform field max distance must be non-zero and finite, got {max_distance}"
        )));
    }

    let mut field = ScalarField::filled(size, size, 0.0);
    for x in 0..size {
        let value = (x as f64 + vertex_offset).abs() / max_distance;
        // Rows are written back to front to match the mesh's row orientation.
        // This is a convention; the values along z are identical either way.
        for z in 0..size {
            field.set(x, size - z - 1, value);
        }
    }
    Ok(field)
}
