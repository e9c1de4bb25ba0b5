use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nicerun::{
    activity::Activity,
    config::IngestConfig,
    elevation::{CachedElevation, ElevationProvider},
    file_parsers::FileType,
    ingest,
};

/// Only answers from an existing cache file; there is no network lookup.
type OfflineElevation = CachedElevation<fn(f64, f64) -> Option<f64>>;

#[derive(Parser)]
#[command(name = "nicerun")]
#[command(about = "Decode FIT/GPX activity files and print them as JSON")]
struct Cli {
    /// Activity files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON file with ingest options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep every recorded sample
    #[arg(long)]
    no_simplify: bool,

    /// Simplification tolerance in kilometers
    #[arg(long)]
    tolerance: Option<f64>,

    /// Replace the recorded name with one built from distance and time of day
    #[arg(long)]
    generate_name: bool,

    /// Fastest-interval target in kilometers (repeatable)
    #[arg(long = "fastest", value_name = "KM")]
    fastest: Vec<f64>,

    /// Display name for the activity (single file only)
    #[arg(short, long)]
    name: Option<String>,

    /// JSON elevation cache used to correct recorded elevations
    #[arg(long, value_name = "FILE")]
    elevation_cache: Option<PathBuf>,

    /// Print a one-line summary instead of JSON
    #[arg(short, long)]
    summary: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<IngestConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            IngestConfig::from_json(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => IngestConfig::default(),
    };

    if cli.no_simplify {
        config.simplify = false;
    }
    if let Some(tolerance) = cli.tolerance {
        anyhow::ensure!(tolerance >= 0.0, "tolerance must not be negative");
        config.simplify_tolerance = tolerance;
    }
    if cli.generate_name {
        config.generate_name = true;
    }
    config.fastest_distances.extend(&cli.fastest);
    if cli.elevation_cache.is_some() {
        config.fix_elevation = true;
    }
    Ok(config)
}

fn process_file(
    path: &Path,
    name: Option<&str>,
    config: &IngestConfig,
    elevation: Option<&OfflineElevation>,
) -> anyhow::Result<Activity> {
    let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut activity = ingest(
        FileType::from_path(path),
        Bytes::from(raw),
        name,
        config,
        elevation.map(|e| e as &dyn ElevationProvider),
    )
    .with_context(|| format!("processing {}", path.display()))?;

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        activity.source_id = stem.to_string();
    }
    Ok(activity)
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.name.is_some() && cli.files.len() > 1 {
        anyhow::bail!("--name can only be used with a single file");
    }

    let elevation: Option<OfflineElevation> = cli.elevation_cache.as_ref().map(|path| {
        let offline: fn(f64, f64) -> Option<f64> = |_, _| None;
        CachedElevation::new(offline, path)
    });

    tracing::info!("Processing {} files", cli.files.len());
    let results: Vec<(PathBuf, anyhow::Result<Activity>)> = cli
        .files
        .par_iter()
        .map(|path| {
            let result = process_file(path, cli.name.as_deref(), &config, elevation.as_ref());
            (path.clone(), result)
        })
        .collect();

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(activity) if cli.summary => println!("{activity}"),
            Ok(activity) => println!("{}", activity.to_json()?),
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {e:#}", path.display());
            }
        }
    }

    if let Some(cache) = &elevation {
        cache.persist();
    }

    anyhow::ensure!(failures == 0, "{failures} of {} files failed", cli.files.len());
    Ok(())
}
