//! Geographic areas for track generation.

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random point within the bounding box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined geographic regions for test data generation.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Dandenong Ranges east of Melbourne: forest trails, steady climbs.
    pub const DANDENONGS: BoundingBox = BoundingBox::new(-37.95, 145.25, -37.80, 145.40);

    /// Melbourne inner suburbs: mostly flat road running.
    pub const MELBOURNE: BoundingBox = BoundingBox::new(-37.85, 144.90, -37.75, 145.05);

    /// Boulder, CO area - popular fitness trails with varied terrain.
    pub const BOULDER: BoundingBox = BoundingBox::new(39.9, -105.5, 40.1, -105.2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_random_point_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let (lat, lon) = Region::DANDENONGS.random_point(&mut rng);
            assert!(Region::DANDENONGS.contains(lat, lon));
        }
    }

    #[test]
    fn test_center() {
        let (lat, lon) = BoundingBox::new(0.0, 0.0, 2.0, 4.0).center();
        assert_eq!((lat, lon), (1.0, 2.0));
    }
}
