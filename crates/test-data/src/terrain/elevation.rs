//! Perlin noise-based elevation generation.

use nicerun::elevation::ElevationProvider;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::BoundingBox;

/// Generates realistic elevation data using Perlin noise.
///
/// Multiple octaves of noise give both large-scale hills and small-scale
/// variation. When a coverage box is set, points outside it have no
/// elevation, which mimics a DEM tile set with gaps.
#[derive(Debug, Clone)]
pub struct ElevationGenerator {
    perlin: Perlin,
    /// Base elevation in meters (e.g., valley floor).
    base_elevation: f64,
    /// Scale factor for terrain height variation.
    height_scale: f64,
    /// Spatial frequency in cycles per degree.
    frequency: f64,
    octaves: u32,
    coverage: Option<BoundingBox>,
}

impl ElevationGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 300.0,
            height_scale: 150.0,
            frequency: 40.0,
            octaves: 4,
            coverage: None,
        }
    }

    /// Hilly forest terrain, ~400m above sea level.
    pub fn dandenongs(seed: u32) -> Self {
        Self {
            base_elevation: 400.0,
            height_scale: 200.0,
            frequency: 60.0,
            octaves: 5,
            ..Self::new(seed)
        }
    }

    /// Gently rolling terrain.
    pub fn flat(seed: u32) -> Self {
        Self {
            base_elevation: 30.0,
            height_scale: 15.0,
            frequency: 20.0,
            octaves: 2,
            ..Self::new(seed)
        }
    }

    pub fn with_base_elevation(mut self, elevation: f64) -> Self {
        self.base_elevation = elevation;
        self
    }

    pub fn with_height_scale(mut self, scale: f64) -> Self {
        self.height_scale = scale;
        self
    }

    /// Only answer inside `bounds`.
    pub fn with_coverage(mut self, bounds: BoundingBox) -> Self {
        self.coverage = Some(bounds);
        self
    }

    /// Terrain height at a coordinate, ignoring coverage.
    ///
    /// Uses fractal Brownian motion (fBm) for natural terrain appearance.
    pub fn terrain_height(&self, lat: f64, lon: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.perlin.get([lat * frequency, lon * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        // Range: -1 to 1
        let normalized = total / max_amplitude;
        self.base_elevation + normalized * self.height_scale
    }

    /// Heights along a path, one per coordinate.
    pub fn elevation_profile(&self, coords: &[(f64, f64)]) -> Vec<f64> {
        coords
            .iter()
            .map(|(lat, lon)| self.terrain_height(*lat, *lon))
            .collect()
    }
}

impl ElevationProvider for ElevationGenerator {
    fn elevation_at(&self, lat: f64, lon: f64) -> Option<f64> {
        match self.coverage {
            Some(bounds) if !bounds.contains(lat, lon) => None,
            _ => Some(self.terrain_height(lat, lon)),
        }
    }
}

/// Adds GPS elevation noise to a reading.
///
/// Real GPS devices have elevation accuracy of ±3-20m depending on conditions.
pub fn add_elevation_jitter(elevation: f64, rng: &mut impl Rng, std_dev: f64) -> f64 {
    match Normal::new(0.0, std_dev) {
        Ok(normal) => elevation + normal.sample(rng),
        Err(_) => elevation,
    }
}
