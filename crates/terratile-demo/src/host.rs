//! In-memory stand-ins for the renderer, the biome catalogue and the
//! vegetation spawner that a game host would plug into tile presentation.

use terratile_terrain::{
    BiomeDef, BiomeTable, BiomeTableError, CellConsumer, ColorRaster, RenderSink, Rgba,
    TerrainCell, TileCoord,
};

/// Records what a renderer would upload for one tile.
#[derive(Debug, Default)]
pub struct PreviewSink {
    pub heights: Vec<f64>,
    pub collision_vertices: usize,
    pub texture: Option<ColorRaster>,
}

impl PreviewSink {
    /// Lowest and highest vertex height, if any were uploaded.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.heights.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }
}

impl RenderSink for PreviewSink {
    fn set_heights(&mut self, heights: &[f64]) {
        self.heights = heights.to_vec();
    }

    fn set_texture(&mut self, texture: &ColorRaster) {
        self.texture = Some(texture.clone());
    }

    fn set_collision_surface(&mut self, heights: &[f64]) {
        self.collision_vertices = heights.len();
    }
}

/// Counts cells that would receive vegetation: anything above the water
/// line that is not in the driest moisture band.
#[derive(Debug)]
pub struct VegetationCounter {
    water_level: f64,
    pub placed: usize,
    pub tiles: usize,
}

impl VegetationCounter {
    pub fn new(water_level: f64) -> Self {
        Self {
            water_level,
            placed: 0,
            tiles: 0,
        }
    }
}

impl CellConsumer for VegetationCounter {
    fn consume(&mut self, tile: TileCoord, cells: &[TerrainCell]) {
        let placed = cells
            .iter()
            .filter(|c| c.position.y > self.water_level && c.moisture_band > 0)
            .count();
        tracing::trace!(%tile, placed, "vegetation placed");
        self.placed += placed;
        self.tiles += 1;
    }
}

/// Whittaker-style biome table over four heat bands and three moisture
/// bands (matching the default terrain tables).
pub fn default_biomes() -> Result<BiomeTable, BiomeTableError> {
    let mut table = BiomeTable::new();
    let defs = [
        ("grassland", Rgba::from_rgb8(140, 190, 90)),
        ("tundra", Rgba::from_rgb8(180, 190, 200)),
        ("taiga", Rgba::from_rgb8(40, 90, 70)),
        ("temperate_forest", Rgba::from_rgb8(50, 130, 60)),
        ("desert", Rgba::from_rgb8(230, 210, 140)),
        ("savanna", Rgba::from_rgb8(190, 170, 80)),
        ("rainforest", Rgba::from_rgb8(20, 110, 40)),
    ];
    for (name, color) in defs {
        table.register(BiomeDef {
            name: name.to_string(),
            color,
        })?;
    }

    // (heat, moisture) -> biome
    let assignments = [
        ((0, 0), "tundra"),
        ((0, 1), "tundra"),
        ((0, 2), "taiga"),
        ((1, 0), "grassland"),
        ((1, 1), "temperate_forest"),
        ((1, 2), "taiga"),
        ((2, 0), "desert"),
        ((2, 1), "grassland"),
        ((2, 2), "temperate_forest"),
        ((3, 0), "desert"),
        ((3, 1), "savanna"),
        ((3, 2), "rainforest"),
    ];
    for ((heat, moisture), name) in assignments {
        table.assign(heat, moisture, name)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terratile_terrain::{BiomeResolver, ColorGradient, TerrainType};

    fn band(index: i32) -> TerrainType {
        TerrainType::new(index, 1.0, ColorGradient::solid(Rgba::WHITE))
    }

    #[test]
    fn test_default_biomes_cover_all_pairs() {
        let table = default_biomes().unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(
            table.resolve(&band(3), &band(2)),
            table.lookup_by_name("rainforest").unwrap()
        );
        assert_eq!(
            table.resolve(&band(0), &band(0)),
            table.lookup_by_name("tundra").unwrap()
        );
    }

    #[test]
    fn test_unassigned_pair_falls_back() {
        let table = default_biomes().unwrap();
        assert_eq!(
            table.resolve(&band(9), &band(9)),
            table.lookup_by_name("grassland").unwrap()
        );
    }

    #[test]
    fn test_height_range() {
        let mut sink = PreviewSink::default();
        assert_eq!(sink.height_range(), None);
        sink.set_heights(&[0.5, -1.0, 2.0]);
        assert_eq!(sink.height_range(), Some((-1.0, 2.0)));
    }
}
