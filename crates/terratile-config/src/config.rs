//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use terratile_terrain::{
    ColorGradient, CurveKeys, Rgba, TerrainTable, TerrainTables, TerrainType, TileLayout,
    TileParams, TileSettings, UnmatchedPolicy, VisualizationType, Wave, WaveSets,
};

use crate::error::ConfigError;

/// Top-level configuration of a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tile grid settings.
    pub map: MapConfig,
    /// Per-tile sampling and output settings.
    pub tile: TileConfig,
    /// Noise layers.
    pub waves: WaveConfig,
    /// Classification tables and height remapping.
    pub terrain: TerrainConfig,
    /// Worker pool settings.
    pub generation: GenerationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Tile grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Tiles along world x.
    pub num_x: u32,
    /// Tiles along world z.
    pub num_z: u32,
    /// Edge length of one tile mesh in world units.
    pub tile_world_size: f64,
}

/// Per-tile configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    /// Vertices per tile edge.
    pub sample_size: usize,
    /// Noise sampling scale.
    pub scale: f64,
    /// Height of a fully raised vertex.
    pub max_height: f64,
    /// Texture subdivisions per vertex step.
    pub texture_resolution: usize,
    /// Raster shown on the tiles.
    pub visualization: VisualizationType,
}

/// Wave sets of the three noise layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaveConfig {
    pub height: Vec<Wave>,
    pub heat: Vec<Wave>,
    pub moisture: Vec<Wave>,
}

/// Classification tables and the height curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub height: Vec<TerrainType>,
    pub heat: Vec<TerrainType>,
    pub moisture: Vec<TerrainType>,
    /// Handling of values above the last threshold.
    pub unmatched: UnmatchedPolicy,
    /// Remapping applied to raw heights before scaling.
    pub height_curve: CurveKeys,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker threads (0 = derive from CPU count).
    pub threads: usize,
    /// Capacity of the submission queue.
    pub max_queued: usize,
    /// Capacity of the result channel.
    pub result_capacity: usize,
    /// Seconds to wait for a whole map before giving up.
    pub timeout_seconds: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for PNG previews of the generated tiles.
    pub output_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            num_x: 2,
            num_z: 2,
            tile_world_size: 10.0,
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            sample_size: 11,
            scale: 2.5,
            max_height: 2.0,
            texture_resolution: 4,
            visualization: VisualizationType::Height,
        }
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            height: vec![
                Wave::new(56.0, 0.5, 1.0),
                Wave::new(199.36, 1.0, 0.5),
                Wave::new(12.7, 2.0, 0.25),
            ],
            heat: vec![Wave::new(318.6, 0.4, 1.0), Wave::new(329.7, 1.2, 0.5)],
            moisture: vec![Wave::new(621.0, 0.3, 1.0), Wave::new(44.1, 1.5, 0.3)],
        }
    }
}

fn band(index: i32, threshold: f64, start: (u8, u8, u8), end: (u8, u8, u8)) -> TerrainType {
    TerrainType::new(
        index,
        threshold,
        ColorGradient::linear(
            Rgba::from_rgb8(start.0, start.1, start.2),
            Rgba::from_rgb8(end.0, end.1, end.2),
        ),
    )
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height: vec![
                band(0, 0.35, (10, 40, 120), (40, 100, 200)),
                band(1, 0.42, (210, 195, 130), (230, 215, 150)),
                band(2, 0.65, (60, 150, 50), (30, 110, 30)),
                band(3, 0.82, (110, 95, 80), (140, 125, 110)),
                band(4, 1.0, (220, 220, 230), (255, 255, 255)),
            ],
            heat: vec![
                band(0, 0.2, (40, 80, 200), (80, 140, 230)),
                band(1, 0.45, (110, 200, 220), (150, 220, 150)),
                band(2, 0.7, (230, 220, 90), (240, 160, 60)),
                band(3, 1.0, (230, 110, 40), (200, 30, 20)),
            ],
            moisture: vec![
                band(0, 0.33, (200, 170, 90), (210, 200, 120)),
                band(1, 0.66, (120, 190, 110), (60, 160, 120)),
                band(2, 1.0, (40, 110, 200), (20, 50, 160)),
            ],
            unmatched: UnmatchedPolicy::ClampToLast,
            height_curve: CurveKeys::new(vec![(0.0, 0.0), (0.4, 0.05), (1.0, 1.0)])
                .unwrap_or_default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_queued: 64,
            result_capacity: 128,
            timeout_seconds: 60,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_dir: None,
        }
    }
}

// --- Validation ---

impl Config {
    /// Validate the configuration and build the shared generation settings.
    pub fn tile_settings(&self) -> Result<TileSettings, ConfigError> {
        let layout = TileLayout::new(
            self.map.num_x,
            self.map.num_z,
            self.tile.sample_size,
            self.tile.scale,
            self.map.tile_world_size,
        )?;
        let params = TileParams {
            max_height: self.tile.max_height,
            texture_resolution: self.tile.texture_resolution,
            visualization: self.tile.visualization,
        };
        let waves = WaveSets {
            height: self.waves.height.clone(),
            heat: self.waves.heat.clone(),
            moisture: self.waves.moisture.clone(),
        };
        let policy = self.terrain.unmatched;
        let tables = TerrainTables {
            height: TerrainTable::new(self.terrain.height.clone(), policy)?,
            heat: TerrainTable::new(self.terrain.heat.clone(), policy)?,
            moisture: TerrainTable::new(self.terrain.moisture.clone(), policy)?,
        };
        self.terrain.height_curve.validate()?;
        let curve = Arc::new(self.terrain.height_curve.clone());

        Ok(TileSettings::new(layout, params, waves, tables, curve)?)
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
