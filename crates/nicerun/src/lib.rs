pub mod activity;
pub mod config;
pub mod elevation;
pub mod errors;
pub mod file_parsers;
pub mod geo_utils;
pub mod models;
pub mod scoring;
pub mod simplify;
pub mod splits;

use bytes::Bytes;

use crate::{
    activity::Activity,
    config::IngestConfig,
    elevation::ElevationProvider,
    errors::TrackError,
    file_parsers::{FileType, parse_activity_file},
};

/// Decode an uploaded file and run the processing pipeline on it.
///
/// Steps run in a fixed order: simplify, elevation correction, generated
/// name, display name, fastest intervals. A non-empty `display_name` always
/// wins over both the name stored in the file and a generated one.
pub fn ingest(
    file_type: FileType,
    bytes: Bytes,
    display_name: Option<&str>,
    config: &IngestConfig,
    elevation: Option<&dyn ElevationProvider>,
) -> Result<Activity, TrackError> {
    let size = bytes.len();
    let decoded = parse_activity_file(file_type, bytes)?;
    let mut activity = Activity::from_decoded(decoded);
    tracing::debug!("Decoded {size} bytes into {} samples", activity.len());

    if config.simplify {
        let removed = activity.simplify(config.simplify_tolerance);
        tracing::debug!(
            "Simplified track at {} km, removed {removed} samples",
            config.simplify_tolerance
        );
    }

    if config.fix_elevation {
        match elevation {
            Some(provider) => {
                activity.fix_elevation(provider);
            }
            None => tracing::warn!("Elevation fix requested but no elevation provider is set"),
        }
    }

    if config.generate_name {
        activity.name = activity.generated_name();
    }
    if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
        activity.name = name.to_string();
    }

    for target in config.fastest_targets() {
        activity.fastest(target);
    }

    tracing::info!(
        "Ingested '{}': {:.2} km in {} s, {} samples",
        activity.name,
        activity.total_distance(),
        activity.duration(),
        activity.len()
    );
    Ok(activity)
}
