//! Elevation gain/loss and pluggable elevation sources.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Total climb and descent in meters of an elevation profile.
///
/// Samples are first bucketed to whole decameters, then interior samples get a
/// 0.3/0.4/0.3 weighted smoothing against their neighbors. Missing samples
/// break the chain: they are skipped and their neighbors are not smoothed.
pub fn uphill_downhill(elevations: &[Option<f64>]) -> (f64, f64) {
    let buckets: Vec<Option<f64>> = elevations
        .iter()
        .map(|e| e.map(|m| (m / 10.0).floor()))
        .collect();

    let size = buckets.len();
    let smoothed: Vec<Option<f64>> = (0..size)
        .map(|i| {
            let current = buckets[i]?;
            if i > 0 && i + 1 < size {
                if let (Some(prev), Some(next)) = (buckets[i - 1], buckets[i + 1]) {
                    return Some(prev * 0.3 + current * 0.4 + next * 0.3);
                }
            }
            Some(current)
        })
        .collect();

    let mut uphill = 0.0;
    let mut downhill = 0.0;
    for pair in smoothed.windows(2) {
        if let (Some(prev), Some(cur)) = (pair[0], pair[1]) {
            let d = cur - prev;
            if d > 0.0 {
                uphill += d;
            } else {
                downhill -= d;
            }
        }
    }

    (uphill, downhill)
}

/// A source of terrain elevation, e.g. a DEM tile set or a web service.
///
/// `None` means the source has no value for that location; callers keep
/// whatever elevation they already had.
pub trait ElevationProvider {
    fn elevation_at(&self, lat: f64, lon: f64) -> Option<f64>;
}

impl<F> ElevationProvider for F
where
    F: Fn(f64, f64) -> Option<f64>,
{
    fn elevation_at(&self, lat: f64, lon: f64) -> Option<f64> {
        self(lat, lon)
    }
}

/// Wraps a provider and remembers its answers in a JSON file.
///
/// Lookups are keyed on coordinates rounded to five decimal places (~1m).
/// Only successful lookups are cached. A cache file that cannot be read or
/// written is logged and otherwise ignored.
pub struct CachedElevation<P> {
    inner: P,
    path: PathBuf,
    cache: Mutex<HashMap<String, f64>>,
}

impl<P: ElevationProvider> CachedElevation<P> {
    pub fn new(inner: P, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load_cache(&path);
        tracing::debug!("Loaded {} cached elevations from {}", cache.len(), path.display());
        Self {
            inner,
            path,
            cache: Mutex::new(cache),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the cache back to disk.
    pub fn persist(&self) {
        let Ok(cache) = self.cache.lock() else {
            return;
        };
        let result = serde_json::to_vec(&*cache)
            .map_err(|e| e.to_string())
            .and_then(|bytes| fs::write(&self.path, bytes).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!("Failed to write elevation cache {}: {e}", self.path.display());
        }
    }
}

impl<P: ElevationProvider> ElevationProvider for CachedElevation<P> {
    fn elevation_at(&self, lat: f64, lon: f64) -> Option<f64> {
        let key = format!("{lat:.5},{lon:.5}");

        if let Some(hit) = self.cache.lock().ok().and_then(|c| c.get(&key).copied()) {
            return Some(hit);
        }

        let value = self.inner.elevation_at(lat, lon)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
        Some(value)
    }
}

fn load_cache(path: &Path) -> HashMap<String, f64> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable elevation cache {}: {e}", path.display());
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn profile(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(uphill_downhill(&[]), (0.0, 0.0));
        assert_eq!(uphill_downhill(&profile(&[123.0])), (0.0, 0.0));
    }

    #[test]
    fn test_monotonic_climb() {
        // Buckets 10, 11, 12, 13; smoothing keeps a linear ramp linear.
        let (up, down) = uphill_downhill(&profile(&[100.0, 110.0, 120.0, 130.0]));
        assert!((up - 3.0).abs() < 1e-9);
        assert_eq!(down, 0.0);
    }

    #[test]
    fn test_small_noise_is_bucketed_away() {
        let (up, down) = uphill_downhill(&profile(&[100.0, 102.0, 101.0, 104.0, 100.5]));
        assert_eq!((up, down), (0.0, 0.0));
    }

    #[test]
    fn test_peak_is_smoothed() {
        // Buckets 10, 20, 10 -> smoothed 10, 14, 10
        let (up, down) = uphill_downhill(&profile(&[100.0, 200.0, 100.0]));
        assert!((up - 4.0).abs() < 1e-9);
        assert!((down - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_elevations_floor() {
        // -5m floors into the -1 bucket, 5m into 0
        let (up, down) = uphill_downhill(&profile(&[-5.0, 5.0]));
        assert_eq!((up, down), (1.0, 0.0));
    }

    #[test]
    fn test_missing_samples_are_skipped() {
        let (up, down) = uphill_downhill(&[Some(100.0), None, Some(200.0), Some(300.0)]);
        // 10, -, 20, 30: only the 20 -> 30 pair counts
        assert_eq!((up, down), (10.0, 0.0));
    }

    #[test]
    fn test_never_negative() {
        let wobbly: Vec<Option<f64>> = (0..100)
            .map(|i| Some(((i as f64) * 0.7).sin() * 80.0 + 200.0))
            .collect();
        let (up, down) = uphill_downhill(&wobbly);
        assert!(up >= 0.0);
        assert!(down >= 0.0);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |lat: f64, _lon: f64| if lat > 0.0 { Some(42.0) } else { None };
        assert_eq!(provider.elevation_at(1.0, 0.0), Some(42.0));
        assert_eq!(provider.elevation_at(-1.0, 0.0), None);
    }

    #[test]
    fn test_cached_elevation_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elevation.json");

        let calls = Cell::new(0);
        let counting = |_lat: f64, _lon: f64| {
            calls.set(calls.get() + 1);
            Some(250.0)
        };

        let cached = CachedElevation::new(counting, &path);
        assert!(cached.is_empty());
        assert_eq!(cached.elevation_at(1.0, 2.0), Some(250.0));
        assert_eq!(cached.elevation_at(1.0, 2.0), Some(250.0));
        assert_eq!(calls.get(), 1);
        cached.persist();

        let offline = |_lat: f64, _lon: f64| -> Option<f64> { None };
        let reloaded = CachedElevation::new(offline, &path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.elevation_at(1.0, 2.0), Some(250.0));
        assert_eq!(reloaded.elevation_at(3.0, 4.0), None);
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elevation.json");
        fs::write(&path, b"not json").unwrap();

        let cached = CachedElevation::new(|_: f64, _: f64| -> Option<f64> { Some(1.0) }, &path);
        assert!(cached.is_empty());
        assert_eq!(cached.elevation_at(0.0, 0.0), Some(1.0));
    }
}
