use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Activity tag used when a file does not declare one.
pub const DEFAULT_ACTIVITY_TYPE: &str = "running";

/// One decoded sample, before it is folded into an [`Activity`](crate::activity::Activity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPointData {
    pub lat: f64,
    pub lon: f64,
    /// Meters
    pub elevation: Option<f64>,
    pub timestamp: OffsetDateTime,
    /// Beats per minute
    pub heart_rate: Option<i32>,
}

/// Output of either decoder.
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    pub name: String,
    pub activity_type: String,
    /// Time of the first point, UTC.
    pub start: OffsetDateTime,
    pub laps: Vec<OffsetDateTime>,
    pub points: Vec<TrackPointData>,
    /// False when the source carried no heart-rate channel at all.
    pub has_heart_rate: bool,
}

impl DecodedTrack {
    pub fn new(start: OffsetDateTime, points: Vec<TrackPointData>) -> Self {
        let has_heart_rate = points.iter().any(|p| p.heart_rate.is_some());
        Self {
            name: String::new(),
            activity_type: DEFAULT_ACTIVITY_TYPE.to_string(),
            start,
            laps: Vec::new(),
            points,
            has_heart_rate,
        }
    }
}

/// A sample of a built activity, as seen by the simplifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    /// Seconds since the first sample
    pub clock: i64,
    /// Cumulative kilometers
    pub distance: f64,
    pub heart_rate: Option<i32>,
}

/// Anything with a `(lat, lon)` position in degrees.
pub trait Positioned {
    fn position(&self) -> (f64, f64);
}

impl Positioned for TrackSample {
    fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

impl Positioned for TrackPointData {
    fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

impl Positioned for (f64, f64) {
    fn position(&self) -> (f64, f64) {
        *self
    }
}
