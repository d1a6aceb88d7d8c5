//! Procedural tiled terrain: layered-wave noise fields, heat and moisture
//! derivation, threshold classification, and seam-consistent tile layout.

mod batch;
mod biome;
mod classify;
mod compose;
mod curve;
mod debug_viz;
mod error;
mod field;
mod gradient;
mod layout;
mod tile;
mod uniform_field;
pub mod wave_field;

pub use batch::{AsyncTileGenerator, GeneratedTile, default_thread_count};
pub use biome::{
    BiomeDef, BiomeId, BiomeResolver, BiomeTable, BiomeTableError, biome_raster, resolve_biomes,
};
pub use classify::{
    ColorRaster, TerrainTable, TerrainType, TerrainTypeMap, UnmatchedPolicy, classify,
    classify_types,
};
pub use compose::{
    HEAT_CEILING, HEAT_HEIGHT_WEIGHT, MOISTURE_HEIGHT_WEIGHT, derive_heat, derive_moisture,
};
pub use curve::{CurveKeys, HeightCurve};
pub use debug_viz::DebugImage;
pub use error::{TerrainError, TerrainResult};
pub use field::{Grid, ScalarField};
pub use gradient::{ColorGradient, GradientKey, Rgba};
pub use layout::{HeatBias, TileCoord, TileLayout, offset_for};
pub use tile::{
    CellConsumer, Collaborators, RenderSink, TerrainCell, TerrainTables, TileFields, TileParams,
    TileSettings, VisualizationType, WaveSets, build_tile, generate_tile, present_tile,
};
pub use uniform_field::generate_uniform;
pub use wave_field::{CoherentNoise, Wave, WaveField};
