//! Single-tile generation pipeline.
//!
//! [`generate_tile`] is the pure part: it samples the height, heat and
//! moisture fields for one tile and classifies them. [`present_tile`] hands
//! the results to the host's collaborators (render sink, biome resolver,
//! spawner), which are passed in explicitly.

use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeId, BiomeResolver, biome_raster, resolve_biomes};
use crate::classify::{ColorRaster, TerrainTable, TerrainType, TerrainTypeMap, classify};
use crate::compose::{derive_heat, derive_moisture};
use crate::curve::HeightCurve;
use crate::error::{TerrainError, TerrainResult};
use crate::field::{Grid, ScalarField};
use crate::layout::{TileCoord, TileLayout};
use crate::uniform_field::generate_uniform;
use crate::wave_field::{Wave, WaveField};

/// Which raster is handed to rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualizationType {
    #[default]
    Height,
    Heat,
    Moisture,
    Biome,
}

impl std::str::FromStr for VisualizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height" => Ok(Self::Height),
            "heat" => Ok(Self::Heat),
            "moisture" => Ok(Self::Moisture),
            "biome" => Ok(Self::Biome),
            other => Err(format!(
                "unknown visualization '{other}', expected height, heat, moisture or biome"
            )),
        }
    }
}

/// Wave sets for the three noise layers.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveSets {
    pub height: Vec<Wave>,
    pub heat: Vec<Wave>,
    pub moisture: Vec<Wave>,
}

/// Classification tables for the three fields.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainTables {
    pub height: TerrainTable,
    pub heat: TerrainTable,
    pub moisture: TerrainTable,
}

/// Per-tile output parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileParams {
    /// Multiplier applied to the curved height.
    pub max_height: f64,
    /// Texture raster subdivisions per sampling step.
    pub texture_resolution: usize,
    /// Raster selected for rendering.
    pub visualization: VisualizationType,
}

impl Default for TileParams {
    fn default() -> Self {
        Self {
            max_height: 1.0,
            texture_resolution: 1,
            visualization: VisualizationType::Height,
        }
    }
}

/// Validated settings shared by every tile of a map.
#[derive(Clone)]
pub struct TileSettings {
    pub layout: TileLayout,
    pub params: TileParams,
    pub tables: TerrainTables,
    height_field: WaveField,
    heat_field: WaveField,
    moisture_field: WaveField,
    height_curve: Arc<dyn HeightCurve>,
}

impl std::fmt::Debug for TileSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileSettings")
            .field("layout", &self.layout)
            .field("params", &self.params)
            .field("height_waves", &self.height_field.waves())
            .field("heat_waves", &self.heat_field.waves())
            .field("moisture_waves", &self.moisture_field.waves())
            .finish_non_exhaustive()
    }
}

impl TileSettings {
    /// Validate every wave set and parameter up front, so that generation
    /// itself can only fail on data-dependent conditions.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Config`] for an invalid wave set, a zero texture
    /// resolution, or a non-finite maximum height.
    pub fn new(
        layout: TileLayout,
        params: TileParams,
        waves: WaveSets,
        tables: TerrainTables,
        height_curve: Arc<dyn HeightCurve>,
    ) -> TerrainResult<Self> {
        if params.texture_resolution == 0 {
            return Err(TerrainError::Config(
                "texture resolution must be at least 1".into(),
            ));
        }
        if !params.max_height.is_finite() {
            return Err(TerrainError::Config(format!(
                "max height must be finite, got {}",
                params.max_height
            )));
        }
        Ok(Self {
            layout,
            params,
            tables,
            height_field: WaveField::new(waves.height)?,
            heat_field: WaveField::new(waves.heat)?,
            moisture_field: WaveField::new(waves.moisture)?,
            height_curve,
        })
    }

    /// The height remapping curve.
    pub fn height_curve(&self) -> &dyn HeightCurve {
        self.height_curve.as_ref()
    }
}

/// Per-vertex data handed to biome and placement consumers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainCell {
    /// World-space vertex position, including the remapped height.
    pub position: DVec3,
    /// Band of the cell in the heat table.
    pub heat_band: usize,
    /// Band of the cell in the moisture table.
    pub moisture_band: usize,
    /// Filled in once a [`BiomeResolver`] has run.
    pub biome: Option<BiomeId>,
}

impl TerrainCell {
    /// The cell's heat terrain type.
    pub fn heat_type<'t>(&self, tables: &'t TerrainTables) -> &'t TerrainType {
        tables.heat.get(self.heat_band)
    }

    /// The cell's moisture terrain type.
    pub fn moisture_type<'t>(&self, tables: &'t TerrainTables) -> &'t TerrainType {
        tables.moisture.get(self.moisture_band)
    }
}

/// Everything one generation pass produces for a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileFields {
    pub coord: TileCoord,
    /// World position of the tile origin.
    pub position: DVec3,
    /// Raw height samples in `[0, 1]`.
    pub height: ScalarField,
    /// `curve(height) * max_height`, one entry per vertex in mesh order.
    pub heights: Vec<f64>,
    /// Height colors from the supersampled texture raster.
    pub height_raster: ColorRaster,
    pub heat: ScalarField,
    pub heat_raster: ColorRaster,
    pub heat_types: TerrainTypeMap,
    pub moisture: ScalarField,
    pub moisture_raster: ColorRaster,
    pub moisture_types: TerrainTypeMap,
    pub cells: Vec<TerrainCell>,
}

/// Sample and classify every field of `coord`.
///
/// # Errors
///
/// [`TerrainError::UnclassifiedCell`] when a table's policy rejects a value;
/// shape and configuration errors cannot occur with validated settings.
pub fn generate_tile(settings: &TileSettings, coord: TileCoord) -> TerrainResult<TileFields> {
    let layout = &settings.layout;
    let n = layout.sample_size;
    let scale = layout.scale;
    let offset = layout.offset_for(coord);
    let position = layout.tile_position(coord);

    let height = settings.height_field.generate(n, scale, offset, 1)?;
    let heights: Vec<f64> = height
        .as_slice()
        .iter()
        .map(|&h| settings.height_curve.evaluate(h) * settings.params.max_height)
        .collect();

    // The texture covers the n - 1 cells between vertices, subdivided.
    let texture_height = settings.height_field.generate(
        n - 1,
        scale,
        offset,
        settings.params.texture_resolution,
    )?;
    let (height_raster, _) = classify(&texture_height, &settings.tables.height)?;

    let bias = layout.heat_bias(coord);
    let uniform_heat = generate_uniform(n, bias.vertex_offset, bias.max_distance)?;
    let noise_heat = settings.heat_field.generate(n, scale, offset, 1)?;
    let heat = derive_heat(&height, &noise_heat, &uniform_heat)?;

    let noise_moisture = settings.moisture_field.generate(n, scale, offset, 1)?;
    let moisture = derive_moisture(&height, &noise_moisture)?;

    let (heat_raster, heat_types) = classify(&heat, &settings.tables.heat)?;
    let (moisture_raster, moisture_types) = classify(&moisture, &settings.tables.moisture)?;

    let cells = Grid::from_fn(n, n, |x, z| TerrainCell {
        position: position + layout.vertex_position(x, z, heights[x * n + z]),
        heat_band: heat_types.band(x, z),
        moisture_band: moisture_types.band(x, z),
        biome: None,
    })
    .into_vec();

    tracing::debug!(
        tile = %coord,
        offset_x = offset.x,
        offset_z = offset.y,
        texture_size = height_raster.width(),
        "generated tile fields"
    );

    Ok(TileFields {
        coord,
        position,
        height,
        heights,
        height_raster,
        heat,
        heat_raster,
        heat_types,
        moisture,
        moisture_raster,
        moisture_types,
        cells,
    })
}

/// Receives the presentation side of a generated tile. Implemented by the
/// host's mesh/renderer/physics layer.
///
/// Height slices hold `sample_size²` vertices in rows along world `z`:
/// entry `x * sample_size + z` is the vertex at local world
/// `(z, x) * spacing` (see [`TileLayout::vertex_position`]), i.e. the usual
/// `z`-outer, `x`-inner mesh vertex order.
pub trait RenderSink {
    /// Vertex heights, in mesh vertex order.
    fn set_heights(&mut self, heights: &[f64]);
    /// The raster selected by the tile's [`VisualizationType`].
    fn set_texture(&mut self, texture: &ColorRaster);
    /// Heights for the collision surface, in mesh vertex order.
    fn set_collision_surface(&mut self, heights: &[f64]);
}

/// Consumes classified cells, e.g. to place vegetation.
pub trait CellConsumer {
    /// Called once per presented tile.
    fn consume(&mut self, tile: TileCoord, cells: &[TerrainCell]);
}

/// Host collaborators for [`present_tile`].
pub struct Collaborators<'a> {
    pub render: &'a mut dyn RenderSink,
    pub biomes: &'a dyn BiomeResolver,
    pub spawner: &'a mut dyn CellConsumer,
}

impl TileFields {
    /// Resolve every cell's biome and store it in [`TileFields::cells`].
    ///
    /// # Errors
    ///
    /// [`TerrainError::ShapeMismatch`] if the heat and moisture maps differ in shape.
    pub fn resolve_biomes(
        &mut self,
        tables: &TerrainTables,
        resolver: &dyn BiomeResolver,
    ) -> TerrainResult<Grid<BiomeId>> {
        let biomes = resolve_biomes(
            &self.heat_types,
            &tables.heat,
            &self.moisture_types,
            &tables.moisture,
            resolver,
        )?;
        for (cell, &biome) in self.cells.iter_mut().zip(biomes.as_slice()) {
            cell.biome = Some(biome);
        }
        Ok(biomes)
    }

    /// The raster for `visualization`. [`VisualizationType::Biome`] needs the
    /// resolved biome grid and yields `None` without it.
    pub fn texture(
        &self,
        visualization: VisualizationType,
        biomes: Option<(&Grid<BiomeId>, &dyn BiomeResolver)>,
    ) -> Option<ColorRaster> {
        match visualization {
            VisualizationType::Height => Some(self.height_raster.clone()),
            VisualizationType::Heat => Some(self.heat_raster.clone()),
            VisualizationType::Moisture => Some(self.moisture_raster.clone()),
            VisualizationType::Biome => {
                biomes.map(|(grid, resolver)| biome_raster(grid, resolver))
            }
        }
    }
}

/// Feed a generated tile to the host: heights and collision surface, the
/// selected texture, then the biome-resolved cells.
///
/// # Errors
///
/// See [`TileFields::resolve_biomes`].
pub fn present_tile(
    tile: &mut TileFields,
    settings: &TileSettings,
    collaborators: Collaborators<'_>,
) -> TerrainResult<()> {
    let Collaborators {
        render,
        biomes,
        spawner,
    } = collaborators;

    render.set_heights(&tile.heights);
    render.set_collision_surface(&tile.heights);

    let biome_grid = tile.resolve_biomes(&settings.tables, biomes)?;
    if let Some(texture) = tile.texture(settings.params.visualization, Some((&biome_grid, biomes)))
    {
        render.set_texture(&texture);
    }

    spawner.consume(tile.coord, &tile.cells);
    Ok(())
}

/// [`generate_tile`] followed by [`present_tile`].
///
/// # Errors
///
/// Any error of either step.
pub fn build_tile(
    settings: &TileSettings,
    coord: TileCoord,
    collaborators: Collaborators<'_>,
) -> TerrainResult<TileFields> {
    let mut tile = generate_tile(settings, coord)?;
    present_tile(&mut tile, settings, collaborators)?;
    Ok(tile)
}
