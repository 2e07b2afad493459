use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use log::{LevelFilter, info, warn};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use strata_chunk::BlockPos;
use strata_geom::Vec3;
use strata_world::{Camera, World, WorldConfig, load_world_config_from_path};
use strata_worldgen::{GenSettings, WorldGenConfig, load_params_from_path};

mod watch;

use watch::WorldgenWatcher;

/// Headless driver: builds a world, runs the tick loop and optionally saves the result.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Run a block world simulation without a window")]
struct Args {
    /// Simulation settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Terrain generator settings (TOML)
    #[arg(long)]
    worldgen: Option<PathBuf>,
    #[arg(long, default_value_t = 1337, allow_hyphen_values = true)]
    seed: i32,
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,
    /// Seconds per tick
    #[arg(long, default_value_t = 0.05)]
    dt: f32,
    /// Start from a save instead of fresh terrain
    #[arg(long)]
    load: Option<PathBuf>,
    /// Write the world here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,
    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
    /// Reload the worldgen file when it changes
    #[arg(long, default_value_t = false)]
    watch_worldgen: bool,
    /// Generation radius in blocks, overrides the config file
    #[arg(long)]
    radius: Option<i32>,
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_level, args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(p) => load_world_config_from_path(p)?,
        None => WorldConfig::default(),
    };
    if let Some(r) = args.radius {
        config.generation.radius = r.max(0);
    }
    let gen_config = match &args.worldgen {
        Some(p) => load_params_from_path(p)?,
        None => WorldGenConfig::default(),
    };
    let radius = config.generation.radius;
    let mut world = World::new(config, GenSettings::new(args.seed, gen_config))?;

    let start = Instant::now();
    match &args.load {
        Some(p) => world.load(p)?,
        None => {
            world.generate_around_blocking(BlockPos::new(0, 0, 0), radius.min(32));
        }
    }
    info!(
        "world ready in {:.2?}: {} chunks",
        start.elapsed(),
        world.store().len()
    );

    let watcher = match (&args.worldgen, args.watch_worldgen) {
        (Some(p), true) => Some(WorldgenWatcher::spawn(p.clone())),
        (None, true) => {
            warn!("--watch-worldgen needs --worldgen; not watching");
            None
        }
        _ => None,
    };

    let camera = Camera::new(Vec3::new(0.5, 8.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
    let dt = if args.dt.is_finite() && args.dt > 0.0 {
        args.dt
    } else {
        warn!("ignoring tick length {}; using 0.05", args.dt);
        0.05
    };
    let run = Instant::now();
    for tick in 0..args.ticks {
        if let Some(cfg) = watcher.as_ref().and_then(WorldgenWatcher::poll) {
            world.update_generation_config(cfg);
        }
        world.generate_chunks(&camera);
        world.step(dt);
        if tick % 100 == 99 {
            let stats = world.pool_stats();
            info!(
                "tick {}: {} chunks, {} entities, {} queued, {} busy workers",
                world.ticks(),
                world.store().len(),
                world.entities().len(),
                world.eval().total_len(),
                stats.busy
            );
        }
    }
    info!(
        "ran {} ticks in {:.2?} (time of day {:.3})",
        args.ticks,
        run.elapsed(),
        world.time_of_day()
    );

    if let Some(p) = &args.save {
        world.save(p)?;
    }
    Ok(())
}
