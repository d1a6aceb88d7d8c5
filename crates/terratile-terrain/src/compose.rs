//! Heat and moisture derivation from the height field.

use crate::error::TerrainResult;
use crate::field::ScalarField;

/// Contribution of elevation to heat.
pub const HEAT_HEIGHT_WEIGHT: f64 = 0.5;
/// Upper clamp for heat. Kept below 1.0 so the top band is only reached by
/// the most extreme values.
pub const HEAT_CEILING: f64 = 0.99;
/// Drying effect of elevation on moisture.
pub const MOISTURE_HEIGHT_WEIGHT: f64 = 0.1;

/// `heat = clamp(noise_heat * uniform_heat + 0.5 * height, 0, 0.99)`.
///
/// # Errors
///
/// [`crate::TerrainError::ShapeMismatch`] if the three fields differ in shape.
pub fn derive_heat(
    height: &ScalarField,
    noise_heat: &ScalarField,
    uniform_heat: &ScalarField,
) -> TerrainResult<ScalarField> {
    height.ensure_same_shape(noise_heat)?;
    height.ensure_same_shape(uniform_heat)?;

    Ok(ScalarField::from_fn(height.width(), height.height(), |x, z| {
        let heat = noise_heat.get(x, z) * uniform_heat.get(x, z)
            + HEAT_HEIGHT_WEIGHT * height.get(x, z);
        heat.clamp(0.0, HEAT_CEILING)
    }))
}

/// `moisture = noise_moisture - 0.1 * height`, unclamped.
///
/// # Errors
///
/// [`crate::TerrainError::ShapeMismatch`] if the two fields differ in shape.
pub fn derive_moisture(
    height: &ScalarField,
    noise_moisture: &ScalarField,
) -> TerrainResult<ScalarField> {
    height.ensure_same_shape(noise_moisture)?;

    Ok(ScalarField::from_fn(height.width(), height.height(), |x, z| {
        noise_moisture.get(x, z) - MOISTURE_HEIGHT_WEIGHT * height.get(x, z)
    }))
}
