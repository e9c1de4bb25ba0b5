//! Procedural track generation.

use nicerun::geo_utils::haversine;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use time::{Duration, OffsetDateTime, macros::datetime};

use crate::TrackPointData;
use crate::config::{BoundingBox, Region};
use crate::profiles::{self, AthleteProfile};
use crate::terrain::{ElevationGenerator, add_elevation_jitter};

/// Configuration for procedural track generation.
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Target distance in meters.
    pub distance_meters: f64,
    /// Starting point (lat, lon). If None, random within bounds.
    pub start_point: Option<(f64, f64)>,
    pub start_time: OffsetDateTime,
    /// Geographic bounds for the track.
    pub bounds: BoundingBox,
    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,
    /// GPS elevation jitter standard deviation in meters.
    pub elevation_jitter_m: f64,
    /// Approximate distance between track points in meters.
    pub point_spacing_m: f64,
    /// Probability of inserting a pause (0.0 - 1.0).
    pub pause_probability: f64,
    /// Duration range for pauses (min, max) in seconds.
    pub pause_duration_range: (f64, f64),
    /// Record heart rate from the athlete profile.
    pub heart_rate: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            distance_meters: 5000.0,
            start_point: None,
            start_time: datetime!(2020-06-07 22:54:50 UTC),
            bounds: Region::DANDENONGS,
            gps_jitter_m: 3.0,
            elevation_jitter_m: 5.0,
            point_spacing_m: 10.0,
            pause_probability: 0.02,
            pause_duration_range: (30.0, 180.0),
            heart_rate: true,
        }
    }
}

/// Generates synthetic GPS tracks with realistic characteristics.
pub struct ProceduralGenerator {
    config: TrackConfig,
    elevation: ElevationGenerator,
}

impl ProceduralGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            config: TrackConfig::default(),
            elevation: ElevationGenerator::dandenongs(seed),
        }
    }

    /// Creates a generator for a specific region.
    pub fn for_region(bounds: BoundingBox, seed: u32) -> Self {
        Self {
            config: TrackConfig {
                bounds,
                ..Default::default()
            },
            elevation: ElevationGenerator::new(seed),
        }
    }

    /// Sets the target distance.
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.config.distance_meters = meters;
        self
    }

    /// Sets the starting point.
    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    pub fn with_start_time(mut self, start_time: OffsetDateTime) -> Self {
        self.config.start_time = start_time;
        self
    }

    /// Sets GPS jitter amount.
    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    /// Sets the elevation generator.
    pub fn with_elevation(mut self, elevation: ElevationGenerator) -> Self {
        self.elevation = elevation;
        self
    }

    /// Sets point spacing.
    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        self.config.point_spacing_m = meters;
        self
    }

    /// Sets pause parameters.
    pub fn with_pauses(mut self, probability: f64, min_sec: f64, max_sec: f64) -> Self {
        self.config.pause_probability = probability;
        self.config.pause_duration_range = (min_sec, max_sec);
        self
    }

    pub fn without_heart_rate(mut self) -> Self {
        self.config.heart_rate = false;
        self
    }

    /// Generates a track using the specified athletic profile.
    ///
    /// The profile determines speeds and heart rate based on terrain grade.
    pub fn generate(&self, profile: &dyn AthleteProfile, rng: &mut impl Rng) -> Vec<TrackPointData> {
        let start = self
            .config
            .start_point
            .unwrap_or_else(|| self.config.bounds.random_point(rng));

        let path = self.generate_path(start, rng);
        let points = self.apply_timing(path, profile, rng);
        tracing::debug!("Generated {} track points", points.len());
        points
    }

    /// Generates a simple path (coordinates only, no timing).
    pub fn generate_path(&self, start: (f64, f64), rng: &mut impl Rng) -> Vec<(f64, f64)> {
        let mut path = vec![start];
        let mut current = start;
        let mut total_distance = 0.0;

        // Random walk with some momentum
        let mut heading = rng.gen_range(0.0..std::f64::consts::TAU);

        while total_distance < self.config.distance_meters {
            heading += rng.gen_range(-0.3..0.3);
            let step = self.config.point_spacing_m * rng.gen_range(0.8..1.2);

            // 1 degree of latitude is ~111km
            let lat_delta = (step * heading.cos()) / 111_000.0;
            let lon_delta = (step * heading.sin()) / (111_000.0 * current.0.to_radians().cos());

            let (next_lat, next_lon, bounced_heading) =
                self.apply_bounds(current.0 + lat_delta, current.1 + lon_delta, heading);
            heading = bounced_heading;

            current = (next_lat, next_lon);
            path.push(current);
            total_distance += step;
        }

        path
    }

    /// Applies bounds checking with heading reversal.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut new_heading = heading;

        let lat = if lat < b.min_lat {
            new_heading = std::f64::consts::PI - heading;
            b.min_lat + (b.min_lat - lat).min(0.001)
        } else if lat > b.max_lat {
            new_heading = std::f64::consts::PI - heading;
            b.max_lat - (lat - b.max_lat).min(0.001)
        } else {
            lat
        };

        let lon = if lon < b.min_lon {
            new_heading = -heading;
            b.min_lon + (b.min_lon - lon).min(0.001)
        } else if lon > b.max_lon {
            new_heading = -heading;
            b.max_lon - (lon - b.max_lon).min(0.001)
        } else {
            lon
        };

        (lat, lon, new_heading)
    }

    /// Applies timing, elevation and heart rate to a path.
    fn apply_timing(
        &self,
        path: Vec<(f64, f64)>,
        profile: &dyn AthleteProfile,
        rng: &mut impl Rng,
    ) -> Vec<TrackPointData> {
        let jitter = Normal::new(0.0, self.config.gps_jitter_m / 111_000.0).ok();

        let mut result = Vec::with_capacity(path.len());
        let mut timestamp = self.config.start_time;
        let mut heart_rate = profile.resting_hr() + 20.0;

        for (i, &(lat, lon)) in path.iter().enumerate() {
            let curr_elev = self.elevation.terrain_height(lat, lon);

            if i > 0 {
                let (prev_lat, prev_lon) = path[i - 1];
                let distance = haversine((prev_lat, prev_lon), (lat, lon)) * 1000.0;
                let prev_elev = self.elevation.terrain_height(prev_lat, prev_lon);
                let grade = if distance > 0.0 {
                    (curr_elev - prev_elev) / distance
                } else {
                    0.0
                };

                let variance = profiles::sample_variance(profile, rng);
                let speed = profiles::speed_at_grade(profile, grade, variance);

                let pause_seconds = if rng.r#gen::<f64>() < self.config.pause_probability {
                    let (min, max) = self.config.pause_duration_range;
                    rng.gen_range(min..=max)
                } else {
                    0.0
                };
                timestamp += Duration::seconds_f64(distance / speed + pause_seconds);

                // Heart rate drifts toward the steady state for this effort
                // and recovers during pauses.
                let target = if pause_seconds > 0.0 {
                    profile.resting_hr()
                } else {
                    profile.heart_rate_at(speed, grade)
                };
                heart_rate += (target - heart_rate) * 0.2;
            }

            result.push(TrackPointData {
                lat: lat + sample_or_zero(jitter, rng),
                lon: lon + sample_or_zero(jitter, rng),
                elevation: Some(add_elevation_jitter(
                    curr_elev,
                    rng,
                    self.config.elevation_jitter_m,
                )),
                timestamp,
                heart_rate: self.config.heart_rate.then(|| heart_rate.round() as i32),
            });
        }

        result
    }
}

fn sample_or_zero(dist: Option<Normal<f64>>, rng: &mut impl Rng) -> f64 {
    dist.map_or(0.0, |n| n.sample(rng))
}
