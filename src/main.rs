//! Preloadkit command line.
//!
//! - `preloadkit preload --manifest FILE [--config FILE] [--parallel]` runs
//!   a preload to completion and prints progress.
//! - `preloadkit sample --weights a=1,b=3 [--count N] [--unique] [--seed S]`
//!   draws from a weighted population.
//!
//! # Running
//!
//! ```sh
//! cargo run -- preload --manifest demos/manifest.json --config demos/preload.ini
//! ```

use bevy_ecs::prelude::*;
use clap::{Parser, Subcommand};
use preloadkit::error::PreloadError;
use preloadkit::events::preload::{PreloadDone, PreloadProgress};
use preloadkit::resources::devlogger::DevLogger;
use preloadkit::resources::imagestore::ImageStore;
use preloadkit::resources::manifest::ResourceManifest;
use preloadkit::resources::preloadconfig::PreloadConfig;
use preloadkit::systems::devlog::observe_preload_with_devlog;
use preloadkit::systems::preload::{
    add_resource_manifest, preload_schedule, run_until_done, setup_preloader, shutdown_preloader,
    start_preload,
};
use preloadkit::util::weightedpopulation::WeightedPopulation;
use std::path::PathBuf;

/// Resource preloader with progress reporting
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Preload every resource of a JSON manifest.
    Preload {
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,
        /// INI configuration; defaults are used if it cannot be read.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Fetch all images at once instead of one after another.
        #[arg(long)]
        parallel: bool,
    },
    /// Sample a weighted population.
    Sample {
        /// Comma-separated `name=weight` pairs.
        #[arg(long, value_name = "LIST")]
        weights: String,
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Never draw the same element twice.
        #[arg(long)]
        unique: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_weights(list: &str) -> Result<Vec<(String, f64)>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, weight) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected name=weight, got '{}'", pair))?;
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|e| format!("bad weight in '{}': {}", pair, e))?;
            Ok((name.trim().to_string(), weight))
        })
        .collect()
}

fn run_sample(
    weights: &str,
    count: usize,
    unique: bool,
    seed: Option<u64>,
) -> Result<Vec<String>, String> {
    let rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut population = WeightedPopulation::with_rng(rng);
    for (name, weight) in parse_weights(weights)? {
        population.add_element(name, weight);
    }
    let drawn = if unique {
        population.sample_without_replacement(count)
    } else {
        population.sample_with_replacement(count)
    };
    drawn.map_err(|e| e.to_string())
}

fn drive_preload(
    world: &mut World,
    manifest: &ResourceManifest,
    config: &PreloadConfig,
) -> Result<(), PreloadError> {
    add_resource_manifest(world, manifest)?;
    start_preload(world)?;
    let mut schedule = preload_schedule();
    run_until_done(world, &mut schedule, config.tick, config.load_timeout)
}

fn run_preload(
    manifest_path: PathBuf,
    config_path: Option<PathBuf>,
    parallel: bool,
) -> Result<(), PreloadError> {
    let mut config = match config_path {
        Some(path) => PreloadConfig::with_path(path),
        None => PreloadConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    if parallel {
        config.parallel_images = true;
    }

    let manifest = ResourceManifest::load(&manifest_path)?;

    let mut world = World::new();
    world.insert_resource(DevLogger::new(config.devlog.clone()));
    setup_preloader(&mut world, &config);
    observe_preload_with_devlog(&mut world);
    world.add_observer(|trigger: On<PreloadProgress>| {
        println!("Loading... {:.0}%", trigger.event().percent);
    });
    world.add_observer(|_trigger: On<PreloadDone>| {
        println!("Done.");
    });
    world.flush();

    let result = drive_preload(&mut world, &manifest, &config);
    shutdown_preloader(&mut world);

    if let Some(store) = world.get_resource::<ImageStore>() {
        log::info!(
            "{} image(s) cached, {} bytes",
            store.len(),
            store.total_bytes()
        );
    }
    result
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Preload {
            manifest,
            config,
            parallel,
        } => {
            if let Err(e) = run_preload(manifest, config, parallel) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Command::Sample {
            weights,
            count,
            unique,
            seed,
        } => match run_sample(&weights, count, unique, seed) {
            Ok(drawn) => println!("{}", drawn.join(" ")),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
