//! Tile grid layout: sampling offsets and world placement.
//!
//! Neighboring tiles must sample contiguous windows of the shared noise domain
//! so that the last sample row of one tile coincides with the first row of the
//! next. A tile of `sample_size` vertices spans `sample_size - 1` sampling
//! steps of `1 / scale`, which is exactly the per-tile offset stride.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Integer position of a tile in the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    /// Construct a tile coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Sampling offset of tile `(tile_x, tile_z)`: `(tile_x, tile_z) * (sample_size - 1) / scale`.
pub fn offset_for(tile_x: i32, tile_z: i32, sample_size: usize, scale: f64) -> DVec2 {
    let rate = (sample_size as f64 - 1.0) / scale;
    DVec2::new(tile_x as f64 * rate, tile_z as f64 * rate)
}

/// Parameters of the directional heat bias for one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatBias {
    /// Tile position along world `z`, expressed in vertex units.
    pub vertex_offset: f64,
    /// Distance at which the bias reaches 1.
    pub max_distance: f64,
}

/// Geometry shared by every tile of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileLayout {
    /// Tiles along world `x`.
    pub num_x: u32,
    /// Tiles along world `z`.
    pub num_z: u32,
    /// Vertices per tile edge.
    pub sample_size: usize,
    /// Noise sampling scale; larger values stretch features.
    pub scale: f64,
    /// Physical edge length of one tile mesh. Must match the mesh built from
    /// `sample_size` vertices or seams reappear.
    pub tile_world_size: f64,
}

impl TileLayout {
    /// Validate and build a layout.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] for an empty grid, fewer than two samples per
    /// edge, or a non-positive scale or tile size.
    pub fn new(
        num_x: u32,
        num_z: u32,
        sample_size: usize,
        scale: f64,
        tile_world_size: f64,
    ) -> TerrainResult<Self> {
        if num_x == 0 || num_z == 0 {
            return Err(TerrainError::Config(format!(
                "tile grid must be non-empty, got {num_x}x{num_z}"
            )));
        }
        if sample_size < 2 {
            return Err(TerrainError::Config(format!(
                "sample size must be at least 2, got {sample_size}"
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TerrainError::Config(format!(
                "scale must be positive and finite, got {scale}"
            )));
        }
        if !(tile_world_size.is_finite() && tile_world_size > 0.0) {
            return Err(TerrainError::Config(format!(
                "tile world size must be positive and finite, got {tile_world_size}"
            )));
        }
        Ok(Self {
            num_x,
            num_z,
            sample_size,
            scale,
            tile_world_size,
        })
    }

    /// Every tile coordinate of the grid, `x`-major.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.num_x as i32)
            .flat_map(move |x| (0..self.num_z as i32).map(move |z| TileCoord::new(x, z)))
    }

    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        self.num_x as usize * self.num_z as usize
    }

    /// Sampling offset of `tile`.
    pub fn offset_for(&self, tile: TileCoord) -> DVec2 {
        offset_for(tile.x, tile.z, self.sample_size, self.scale)
    }

    /// World-space position of `tile`, with the whole grid centered on the origin.
    pub fn tile_position(&self, tile: TileCoord) -> DVec3 {
        let half_x = self.num_x as f64 / 2.0;
        let half_z = self.num_z as f64 / 2.0;
        DVec3::new(
            (tile.x as f64 - half_x) * self.tile_world_size,
            0.0,
            (tile.z as f64 - half_z) * self.tile_world_size,
        )
    }

    /// Heat bias parameters for `tile`.
    ///
    /// Both terms truncate like the integer arithmetic they came from:
    /// vertices per world unit is a whole number, and `sample_size / 2`
    /// rounds down for odd sample sizes. With one vertex per world unit the
    /// bias then follows world `z` continuously across tile rows.
    pub fn heat_bias(&self, tile: TileCoord) -> HeatBias {
        let position = self.tile_position(tile);
        let vertices_per_unit = (self.sample_size as f64 / self.tile_world_size).trunc();
        HeatBias {
            vertex_offset: position.z * vertices_per_unit,
            max_distance: (self.sample_size / 2 * self.num_x as usize) as f64 + 1.0,
        }
    }

    /// Distance between adjacent vertices of a tile mesh.
    pub fn vertex_spacing(&self) -> f64 {
        self.tile_world_size / (self.sample_size as f64 - 1.0)
    }

    /// Position of grid cell `(x, z)` relative to its tile's origin.
    ///
    /// Fields are stored as rows along world `z`: the first grid index steps
    /// along world `z` and the second along world `x`. This is the axis the
    /// wave sampler adds each offset component to, so grid index `(x, z)`
    /// lands at local `(z, x) * spacing`.
    pub fn vertex_position(&self, x: usize, z: usize, height: f64) -> DVec3 {
        let spacing = self.vertex_spacing();
        DVec3::new(z as f64 * spacing, height, x as f64 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn layout() -> TileLayout {
        TileLayout::new(4, 2, 11, 5.0, 10.0).unwrap()
    }

    #[test]
    fn test_offset_rate() {
        let offset = offset_for(3, 2, 11, 5.0);
        assert!((offset.x - 6.0).abs() < EPSILON);
        assert!((offset.y - 4.0).abs() < EPSILON);
        assert_eq!(offset_for(0, 0, 11, 5.0), DVec2::ZERO);
    }

    #[test]
    fn test_tiles_centered_on_origin() {
        let layout = layout();
        let first = layout.tile_position(TileCoord::new(0, 0));
        assert!((first.x + 20.0).abs() < EPSILON);
        assert!((first.z + 10.0).abs() < EPSILON);
        let last = layout.tile_position(TileCoord::new(3, 1));
        assert!((last.x - 10.0).abs() < EPSILON);
        assert!(last.z.abs() < EPSILON);
    }

    #[test]
    fn test_odd_grid_uses_real_half() {
        let layout = TileLayout::new(3, 3, 5, 1.0, 2.0).unwrap();
        let pos = layout.tile_position(TileCoord::new(0, 2));
        assert!((pos.x + 3.0).abs() < EPSILON);
        assert!((pos.z - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_tiles_iterates_whole_grid() {
        let layout = layout();
        let tiles: Vec<_> = layout.tiles().collect();
        assert_eq!(tiles.len(), layout.tile_count());
        assert_eq!(tiles[0], TileCoord::new(0, 0));
        assert_eq!(tiles[1], TileCoord::new(0, 1));
        assert_eq!(*tiles.last().unwrap(), TileCoord::new(3, 1));
    }

    #[test]
    fn test_heat_bias() {
        let layout = layout();
        let bias = layout.heat_bias(TileCoord::new(0, 0));
        // z = -10, 11 / 10 truncates to 1 vertex per unit.
        assert!((bias.vertex_offset + 10.0).abs() < EPSILON);
        // 11 / 2 = 5 (integer), * 4 tiles + 1.
        assert!((bias.max_distance - 21.0).abs() < EPSILON);
    }

    #[test]
    fn test_heat_bias_truncates_vertex_density() {
        let layout = TileLayout::new(2, 2, 9, 1.0, 4.0).unwrap();
        // 9 / 4 = 2 vertices per unit, not 2.25.
        let bias = layout.heat_bias(TileCoord::new(1, 0));
        assert!((bias.vertex_offset + 8.0).abs() < EPSILON);

        let sparse = TileLayout::new(2, 2, 9, 1.0, 16.0).unwrap();
        assert_eq!(sparse.heat_bias(TileCoord::new(0, 0)).vertex_offset, 0.0);
    }

    #[test]
    fn test_vertex_spacing_spans_tile() {
        let layout = layout();
        let far = layout.vertex_position(10, 10, 2.5);
        assert!((far.x - layout.tile_world_size).abs() < EPSILON);
        assert!((far.z - layout.tile_world_size).abs() < EPSILON);
        assert_eq!(far.y, 2.5);
    }

    #[test]
    fn test_vertex_axes() {
        let layout = layout();
        // The second grid index runs along world x.
        let along_x = layout.vertex_position(0, 10, 0.0);
        assert!((along_x.x - layout.tile_world_size).abs() < EPSILON);
        assert!(along_x.z.abs() < EPSILON);
        // The first grid index runs along world z.
        let along_z = layout.vertex_position(10, 0, 0.0);
        assert!(along_z.x.abs() < EPSILON);
        assert!((along_z.z - layout.tile_world_size).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_layouts_rejected() {
        assert!(TileLayout::new(0, 1, 10, 1.0, 1.0).is_err());
        assert!(TileLayout::new(1, 1, 1, 1.0, 1.0).is_err());
        assert!(TileLayout::new(1, 1, 10, 0.0, 1.0).is_err());
        assert!(TileLayout::new(1, 1, 10, 1.0, -5.0).is_err());
    }
}
