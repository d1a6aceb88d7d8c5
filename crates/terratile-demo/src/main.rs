//! Demo binary that generates a tiled terrain map on a worker pool.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p terratile-demo` to generate the default 2x2 map.
//! Run with `cargo run -p terratile-demo -- --visualization biome --output previews`
//! to also write PNG previews of every tile (texture and raw height).

mod export;
mod host;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use terratile_config::{CliArgs, Config};
use terratile_terrain::{
    AsyncTileGenerator, Collaborators, TileSettings, default_thread_count, present_tile,
};
use tracing::{error, info, warn};

use crate::host::{PreviewSink, VegetationCounter, default_biomes};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = match args
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|d| d.join("terratile")))
    {
        Some(dir) => dir,
        None => {
            eprintln!("Failed to resolve config directory, pass --config");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terratile_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Arc::new(config.tile_settings()?);
    let layout = settings.layout;
    info!(
        tiles = layout.tile_count(),
        sample_size = layout.sample_size,
        scale = layout.scale,
        visualization = ?settings.params.visualization,
        "generating map"
    );

    let threads = match config.generation.threads {
        0 => default_thread_count(),
        n => n,
    };
    let generator = AsyncTileGenerator::new(
        Arc::clone(&settings),
        threads,
        config.generation.max_queued,
        config.generation.result_capacity,
    )?;

    let mut submitted = 0;
    for coord in layout.tiles() {
        match generator.submit(coord) {
            Ok(()) => submitted += 1,
            Err(coord) => warn!(tile = %coord, "generation queue full, tile skipped"),
        }
    }

    let timeout = Duration::from_secs(config.generation.timeout_seconds);
    let mut results = generator.collect(submitted, timeout);
    if results.len() < submitted {
        generator.cancel_all();
    }
    results.sort_by_key(|tile| tile.coord);

    let biomes = default_biomes()?;
    let mut spawner = VegetationCounter::new(water_level(&settings));
    if let Some(dir) = &config.debug.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut failed = 0;
    for generated in results {
        let coord = generated.coord;
        let mut tile = match generated.result {
            Ok(tile) => tile,
            Err(e) => {
                error!(tile = %coord, "tile generation failed: {e}");
                failed += 1;
                continue;
            }
        };

        let mut sink = PreviewSink::default();
        present_tile(
            &mut tile,
            &settings,
            Collaborators {
                render: &mut sink,
                biomes: &biomes,
                spawner: &mut spawner,
            },
        )?;

        let (lo, hi) = sink.height_range().unwrap_or_default();
        info!(
            tile = %coord,
            x = tile.position.x,
            z = tile.position.z,
            min_height = lo,
            max_height = hi,
            time_us = generated.generation_time_us,
            "tile ready"
        );

        if let Some(dir) = &config.debug.output_dir {
            let path = export::preview_path(dir, coord, "height");
            export::export_field(&tile.height, &path)?;
            if let Some(texture) = &sink.texture {
                let path = export::preview_path(dir, coord, "texture");
                export::export_raster(texture, &path)?;
            }
            info!(tile = %coord, dir = %dir.display(), "wrote previews");
        }
    }

    info!(
        tiles = spawner.tiles,
        vegetation = spawner.placed,
        failed,
        "map complete"
    );

    if failed > 0 || spawner.tiles < layout.tile_count() {
        return Err(format!(
            "{} of {} tiles were not generated",
            layout.tile_count() - spawner.tiles,
            layout.tile_count()
        )
        .into());
    }
    Ok(())
}

/// Rendered height of the top of the lowest height band.
fn water_level(settings: &TileSettings) -> f64 {
    let threshold = settings.tables.height.get(0).threshold;
    settings.height_curve().evaluate(threshold) * settings.params.max_height
}
