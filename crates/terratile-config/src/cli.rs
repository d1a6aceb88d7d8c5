//! Command-line argument parsing for the terrain generator.

use std::path::PathBuf;

use clap::Parser;
use terratile_terrain::VisualizationType;

use crate::Config;

/// Terrain generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terratile", about = "Procedural tiled terrain generator")]
pub struct CliArgs {
    /// Tiles along world x.
    #[arg(long)]
    pub num_x: Option<u32>,

    /// Tiles along world z.
    #[arg(long)]
    pub num_z: Option<u32>,

    /// Vertices per tile edge.
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Noise sampling scale.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Texture subdivisions per vertex step.
    #[arg(long)]
    pub texture_resolution: Option<usize>,

    /// Raster shown on the tiles (height, heat, moisture, biome).
    #[arg(long)]
    pub visualization: Option<VisualizationType>,

    /// Worker threads (0 = one per spare core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for PNG previews of the generated tiles.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(n) = args.num_x {
            self.map.num_x = n;
        }
        if let Some(n) = args.num_z {
            self.map.num_z = n;
        }
        if let Some(size) = args.sample_size {
            self.tile.sample_size = size;
        }
        if let Some(scale) = args.scale {
            self.tile.scale = scale;
        }
        if let Some(res) = args.texture_resolution {
            self.tile.texture_resolution = res;
        }
        if let Some(vis) = args.visualization {
            self.tile.visualization = vis;
        }
        if let Some(threads) = args.threads {
            self.generation.threads = threads;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.output {
            self.debug.output_dir = Some(dir.clone());
        }
    }
}
