//! Configuration system for the terrain generator.
//!
//! Map, tile, wave, and classification settings persist to disk as RON files.
//! Supports CLI overrides via clap and forward/backward compatible
//! serialization. [`Config::tile_settings`] validates everything
//! and produces the settings shared by all tile workers.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, GenerationConfig, MapConfig, TerrainConfig, TileConfig, WaveConfig,
};
pub use error::ConfigError;
