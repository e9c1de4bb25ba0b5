//! Ingestion options.

use serde::{Deserialize, Serialize};

use crate::simplify::DEFAULT_TOLERANCE_KM;

/// Switches for the post-decode pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Run polyline simplification after decoding.
    pub simplify: bool,

    /// Simplification tolerance in kilometers.
    pub simplify_tolerance: f64,

    /// Replace recorded elevations with values from an elevation provider.
    pub fix_elevation: bool,

    /// Name the activity from its distance and time of day.
    pub generate_name: bool,

    /// Target distances (km) whose fastest interval is computed up front
    /// and included in the exported record.
    pub fastest_distances: Vec<f64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            simplify: true,
            simplify_tolerance: DEFAULT_TOLERANCE_KM,
            fix_elevation: false,
            generate_name: false,
            fastest_distances: Vec::new(),
        }
    }
}

impl IngestConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Fastest-interval targets with duplicates and non-finite values removed.
    pub fn fastest_targets(&self) -> Vec<f64> {
        let mut targets: Vec<f64> = self
            .fastest_distances
            .iter()
            .copied()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .collect();
        targets.sort_by(f64::total_cmp);
        targets.dedup();
        targets
    }
}
