//! Threshold-based terrain classification.
//!
//! A [`TerrainTable`] is an ordered list of bands with increasing upper
//! thresholds. Each value is assigned to the first band whose threshold is
//! strictly greater than it, and colored by that band's gradient according to
//! where the value sits between the band's lower and upper edge.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::field::{Grid, ScalarField};
use crate::gradient::{ColorGradient, Rgba};

/// A classification band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainType {
    /// Caller-defined identifier, used by biome lookup.
    pub index: i32,
    /// Exclusive upper edge of the band, in `[0, 1]`.
    pub threshold: f64,
    /// Colors across the band, from its lower edge (0) to its upper edge (1).
    pub gradient: ColorGradient,
}

impl TerrainType {
    /// Construct a band.
    pub fn new(index: i32, threshold: f64, gradient: ColorGradient) -> Self {
        Self {
            index,
            threshold,
            gradient,
        }
    }
}

/// What to do with a value at or above the last threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmatchedPolicy {
    /// Assign the last band and its end color.
    #[default]
    ClampToLast,
    /// Fail with [`TerrainError::UnclassifiedCell`].
    Fail,
}

/// A validated, ordered list of [`TerrainType`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainTable {
    types: Vec<TerrainType>,
    policy: UnmatchedPolicy,
}

impl TerrainTable {
    /// Validate and wrap a band list.
    ///
    /// # Errors
    ///
    /// - [`TerrainError::Config`] for an empty list, a threshold outside
    ///   `[0, 1]`, or an invalid gradient.
    /// - [`TerrainError::DegenerateBand`] if two adjacent thresholds are equal
    ///   or the first threshold is 0 (the first band starts at 0).
    /// - [`TerrainError::NonMonotonicThresholds`] if a threshold decreases.
    pub fn new(types: Vec<TerrainType>, policy: UnmatchedPolicy) -> TerrainResult<Self> {
        if types.is_empty() {
            return Err(TerrainError::Config("terrain table is empty".into()));
        }

        let mut previous = 0.0;
        for (band, ty) in types.iter().enumerate() {
            if !(0.0..=1.0).contains(&ty.threshold) {
                return Err(TerrainError::Config(format!(
                    "threshold {} of band {band} outside [0, 1]",
                    ty.threshold
                )));
            }
            if ty.threshold == previous {
                return Err(TerrainError::DegenerateBand {
                    band,
                    threshold: ty.threshold,
                });
            }
            if ty.threshold < previous {
                return Err(TerrainError::NonMonotonicThresholds {
                    band,
                    threshold: ty.threshold,
                    previous,
                });
            }
            ty.gradient.validate()?;
            previous = ty.threshold;
        }

        Ok(Self { types, policy })
    }

    /// The bands in scan order.
    pub fn types(&self) -> &[TerrainType] {
        &self.types
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The unmatched-value policy.
    pub fn policy(&self) -> UnmatchedPolicy {
        self.policy
    }

    /// Band at `band`.
    ///
    /// # Panics
    ///
    /// Panics if `band >= len()`.
    pub fn get(&self, band: usize) -> &TerrainType {
        &self.types[band]
    }

    /// First band whose threshold is strictly greater than `value`.
    ///
    /// A value equal to a threshold belongs to the next band. Returns `None`
    /// for NaN or a value at or above the last threshold.
    pub fn band_index(&self, value: f64) -> Option<usize> {
        self.types.iter().position(|ty| ty.threshold > value)
    }

    /// Lower and upper edge of `band`.
    pub fn band_range(&self, band: usize) -> (f64, f64) {
        let min = if band == 0 {
            0.0
        } else {
            self.types[band - 1].threshold
        };
        (min, self.types[band].threshold)
    }

    /// Gradient parameter for `value` within `band`: 0 at the lower edge,
    /// approaching 1 towards the upper edge.
    pub fn interpolation_parameter(&self, band: usize, value: f64) -> f64 {
        let (min, max) = self.band_range(band);
        1.0 - (max - value) / (max - min)
    }

    /// Resolve the band for the cell at `(x, z)` under the table's policy.
    ///
    /// # Errors
    ///
    /// [`TerrainError::UnclassifiedCell`] for NaN, or for an unmatched value
    /// under [`UnmatchedPolicy::Fail`].
    pub fn classify_value(&self, value: f64, x: usize, z: usize) -> TerrainResult<usize> {
        match self.band_index(value) {
            Some(band) => Ok(band),
            None if value.is_nan() || self.policy == UnmatchedPolicy::Fail => {
                Err(TerrainError::UnclassifiedCell { x, z, value })
            }
            None => Ok(self.types.len() - 1),
        }
    }

    /// Band color for `value` assigned to `band`.
    pub fn color(&self, band: usize, value: f64) -> Rgba {
        let t = self.interpolation_parameter(band, value);
        self.types[band].gradient.evaluate(t)
    }
}

/// A grid of interpolated band colors.
pub type ColorRaster = Grid<Rgba>;

/// The matched band for every cell of a classified field.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainTypeMap {
    bands: Grid<usize>,
}

impl TerrainTypeMap {
    /// Band position (into the classifying table) at `(x, z)`.
    pub fn band(&self, x: usize, z: usize) -> usize {
        *self.bands.get(x, z)
    }

    /// Resolve the cell's [`TerrainType`] against the table that produced the map.
    pub fn terrain_type<'t>(&self, table: &'t TerrainTable, x: usize, z: usize) -> &'t TerrainType {
        table.get(self.band(x, z))
    }

    /// The underlying band grid.
    pub fn bands(&self) -> &Grid<usize> {
        &self.bands
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.bands.dimensions()
    }
}

/// Classify every cell of `field`, producing its color raster and band map.
///
/// # Errors
///
/// See [`TerrainTable::classify_value`].
pub fn classify(
    field: &ScalarField,
    table: &TerrainTable,
) -> TerrainResult<(ColorRaster, TerrainTypeMap)> {
    let bands = band_grid(field, table)?;
    let raster = Grid::from_fn(field.width(), field.height(), |x, z| {
        table.color(*bands.get(x, z), *field.get(x, z))
    });
    Ok((raster, TerrainTypeMap { bands }))
}

/// Classify every cell of `field` without building a color raster.
///
/// # Errors
///
/// See [`TerrainTable::classify_value`].
pub fn classify_types(field: &ScalarField, table: &TerrainTable) -> TerrainResult<TerrainTypeMap> {
    Ok(TerrainTypeMap {
        bands: band_grid(field, table)?,
    })
}

fn band_grid(field: &ScalarField, table: &TerrainTable) -> TerrainResult<Grid<usize>> {
    let last = table.len() - 1;
    let mut clamped = 0usize;
    let bands = Grid::try_from_fn(field.width(), field.height(), |x, z| -> TerrainResult<usize> {
        let value = *field.get(x, z);
        let band = table.classify_value(value, x, z)?;
        if band == last && value >= table.get(last).threshold {
            clamped += 1;
        }
        Ok(band)
    })?;
    if clamped > 0 {
        tracing::warn!(
            clamped,
            threshold = table.get(last).threshold,
            "values above the last terrain threshold were clamped to the last band"
        );
    }
    Ok(bands)
}
