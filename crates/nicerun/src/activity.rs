//! The activity model: parallel per-sample series plus cached analytics.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::elevation::{self, ElevationProvider};
use crate::errors::DataWarning;
use crate::geo_utils::cumulative_distance;
use crate::models::{DecodedTrack, TrackSample};
use crate::scoring;
use crate::simplify::simplify_polyline;
use crate::splits::{self, DEFAULT_SPLIT_KM};

/// `start_local` is always `start` shifted by this many hours, whatever the
/// recording's real time zone.
// TODO: derive the offset from the track position or the device's time zone
// setting once uploads carry one.
pub const LOCAL_TIME_OFFSET_HOURS: i64 = 10;

/// One recorded session.
///
/// All per-sample series have the same length. `clock` and `distance` start
/// at zero and never decrease. The series can only be changed through
/// [`simplify`](Self::simplify) and [`fix_elevation`](Self::fix_elevation),
/// which recompute `distance`, the climb totals and drop memoized
/// fastest-interval results.
#[derive(Debug, Clone)]
pub struct Activity {
    pub name: String,
    pub source_id: String,
    /// Id on another service
    pub external_id: Option<String>,
    pub provider: Option<String>,
    pub activity_type: String,

    start: OffsetDateTime,
    start_local: PrimitiveDateTime,
    laps: Vec<OffsetDateTime>,

    latitude: Vec<f64>,
    longitude: Vec<f64>,
    elevation: Vec<Option<f64>>,
    clock: Vec<i64>,
    distance: Vec<f64>,
    heart_rate: Vec<Option<i32>>,

    uphill: f64,
    downhill: f64,
    /// Target distance bits -> fastest elapsed seconds
    fastest: HashMap<u64, Option<i64>>,
    warnings: Vec<DataWarning>,
}

impl From<DecodedTrack> for Activity {
    fn from(track: DecodedTrack) -> Self {
        Activity::from_decoded(track)
    }
}

impl Activity {
    pub fn from_decoded(track: DecodedTrack) -> Self {
        let start = track
            .points
            .first()
            .map_or(track.start, |p| p.timestamp)
            .to_offset(UtcOffset::UTC);

        let n = track.points.len();
        let mut latitude = Vec::with_capacity(n);
        let mut longitude = Vec::with_capacity(n);
        let mut elevation = Vec::with_capacity(n);
        let mut clock = Vec::with_capacity(n);
        let mut heart_rate = Vec::with_capacity(n);

        let mut last_clock = 0;
        let mut backwards = 0usize;
        for point in &track.points {
            let mut t = (point.timestamp - start).whole_seconds();
            if t < last_clock {
                backwards += 1;
                t = last_clock;
            }
            last_clock = t;

            latitude.push(point.lat);
            longitude.push(point.lon);
            elevation.push(point.elevation);
            clock.push(t);
            heart_rate.push(point.heart_rate);
        }
        if backwards > 0 {
            tracing::warn!("Clamped {backwards} samples whose timestamps went backwards");
        }

        let mut warnings = Vec::new();
        if !track.has_heart_rate {
            tracing::warn!("Track '{}' has no heart rate data", track.name);
            warnings.push(DataWarning::MissingHeartRate);
        }

        let mut activity = Self {
            name: track.name,
            source_id: String::new(),
            external_id: None,
            provider: None,
            activity_type: track.activity_type,
            start,
            start_local: local_time(start),
            laps: track.laps,
            distance: Vec::new(),
            latitude,
            longitude,
            elevation,
            clock,
            heart_rate,
            uphill: 0.0,
            downhill: 0.0,
            fastest: HashMap::new(),
            warnings,
        };
        activity.refresh_derived();
        activity
    }

    /// Recompute everything that is a function of the sample series.
    fn refresh_derived(&mut self) {
        self.distance = cumulative_distance(&self.latitude, &self.longitude);
        (self.uphill, self.downhill) = elevation::uphill_downhill(&self.elevation);
        self.fastest.clear();
    }

    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    pub fn start_local(&self) -> PrimitiveDateTime {
        self.start_local
    }

    pub fn laps(&self) -> &[OffsetDateTime] {
        &self.laps
    }

    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    pub fn elevation(&self) -> &[Option<f64>] {
        &self.elevation
    }

    pub fn clock(&self) -> &[i64] {
        &self.clock
    }

    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    pub fn heart_rate(&self) -> &[Option<i32>] {
        &self.heart_rate
    }

    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    /// Elapsed seconds from the first to the last sample.
    pub fn duration(&self) -> i64 {
        self.clock.last().copied().unwrap_or(0)
    }

    /// Kilometers; always the last cumulative distance.
    pub fn total_distance(&self) -> f64 {
        self.distance.last().copied().unwrap_or(0.0)
    }

    /// Meters climbed after decameter bucketing and smoothing.
    pub fn uphill(&self) -> f64 {
        self.uphill
    }

    pub fn downhill(&self) -> f64 {
        self.downhill
    }

    pub fn has_heart_rate(&self) -> bool {
        self.heart_rate.iter().any(|hr| hr.is_some_and(|v| v > 0))
    }

    /// The sample series zipped into one value per sample.
    pub fn samples(&self) -> Vec<TrackSample> {
        (0..self.len())
            .map(|i| TrackSample {
                lat: self.latitude[i],
                lon: self.longitude[i],
                elevation: self.elevation[i],
                clock: self.clock[i],
                distance: self.distance[i],
                heart_rate: self.heart_rate[i],
            })
            .collect()
    }

    /// Drop samples that lie within `tolerance_km` of the simplified line.
    /// Returns how many samples were removed.
    pub fn simplify(&mut self, tolerance_km: f64) -> usize {
        let before = self.len();
        let kept = simplify_polyline(&self.samples(), tolerance_km);

        self.latitude = kept.iter().map(|s| s.lat).collect();
        self.longitude = kept.iter().map(|s| s.lon).collect();
        self.elevation = kept.iter().map(|s| s.elevation).collect();
        self.clock = kept.iter().map(|s| s.clock).collect();
        self.heart_rate = kept.iter().map(|s| s.heart_rate).collect();
        self.refresh_derived();

        before - self.len()
    }

    /// Overwrite elevations with values from `provider`. Samples the provider
    /// has no value for keep their recorded elevation. Returns the number of
    /// such samples.
    pub fn fix_elevation(&mut self, provider: &dyn ElevationProvider) -> usize {
        let mut unavailable = 0;
        for i in 0..self.len() {
            match provider.elevation_at(self.latitude[i], self.longitude[i]) {
                Some(meters) => self.elevation[i] = Some(meters),
                None => unavailable += 1,
            }
        }

        if unavailable > 0 {
            tracing::warn!("Elevation unavailable for {unavailable} of {} samples", self.len());
            self.warnings.push(DataWarning::ElevationUnavailable {
                samples: unavailable,
            });
        }
        self.refresh_derived();
        unavailable
    }

    /// Mean of the recorded heart rates, rounded down; 0 without data.
    pub fn average_hr(&self) -> i32 {
        let (sum, count) = self
            .heart_rate
            .iter()
            .flatten()
            .filter(|hr| **hr > 0)
            .fold((0i64, 0i64), |(s, c), hr| (s + i64::from(*hr), c + 1));
        if count == 0 {
            0
        } else {
            (sum / count) as i32
        }
    }

    pub fn max_hr(&self) -> i32 {
        self.heart_rate.iter().flatten().copied().max().unwrap_or(0).max(0)
    }

    /// Minutes per kilometer, or `None` for a track with no distance.
    pub fn pace(&self) -> Option<f64> {
        let distance = self.total_distance();
        (distance > 0.0).then(|| (self.duration() as f64 / 60.0) / distance)
    }

    /// Seconds per `split_km`, see [`splits::splits`].
    pub fn splits(&self, split_km: f64) -> Vec<f64> {
        splits::splits(&self.distance, &self.clock, split_km)
    }

    /// Fastest elapsed seconds over `target_km`, memoized per target.
    pub fn fastest(&mut self, target_km: f64) -> Option<i64> {
        let key = target_km.to_bits();
        if let Some(cached) = self.fastest.get(&key) {
            return *cached;
        }

        let result = splits::fastest_interval(&self.distance, &self.clock, target_km);
        self.fastest.insert(key, result);
        result
    }

    /// Fastest-interval results computed so far, by target distance.
    pub fn fastest_results(&self) -> BTreeMap<String, Option<i64>> {
        self.fastest
            .iter()
            .map(|(key, value)| (f64::from_bits(*key).to_string(), *value))
            .collect()
    }

    /// Training load; see [`scoring::effort`].
    pub fn effort(&self, max_hr: u32, pace_5k: Option<f64>) -> Option<u32> {
        scoring::effort(&self.heart_rate, &self.clock, &self.distance, max_hr, pace_5k)
    }

    pub fn generated_name(&self) -> String {
        let part_of_day = match self.start_local.hour() {
            h if h < 12 => "Morning",
            h if h < 14 => "Lunch",
            h if h < 18 => "Afternoon",
            _ => "Evening",
        };
        format!("🏃‍♂ {:.1} km {part_of_day} Run", self.total_distance())
    }

    /// e.g. `Jun. 8`
    pub fn short_date(&self) -> String {
        self.start_local
            .format(format_description!("[month repr:short]. [day padding:none]"))
            .unwrap_or_default()
    }

    pub fn uphill_str(&self) -> String {
        format!("{:.0}m", self.uphill)
    }

    pub fn downhill_str(&self) -> String {
        format!("{:.0}m", self.downhill)
    }

    /// Half-kilometer splits mapped onto a 72px-high chart.
    pub fn sparkline_values(&self) -> Vec<f64> {
        self.splits(0.5).into_iter().map(|s| 72.0 - s / 5.0).collect()
    }

    pub fn chart_values_hr(&self) -> Vec<String> {
        self.heart_rate
            .iter()
            .map(|hr| hr.unwrap_or(0).to_string())
            .collect()
    }

    pub fn chart_values_clock(&self) -> Vec<String> {
        self.clock.iter().map(|t| t.to_string()).collect()
    }

    pub fn to_record(&self) -> ActivityRecord {
        ActivityRecord {
            name: self.name.clone(),
            source_id: self.source_id.clone(),
            external_id: self.external_id.clone(),
            start: self.start.format(&Rfc3339).unwrap_or_default(),
            start_local: self
                .start_local
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second]"
                ))
                .unwrap_or_default(),
            total_distance: self.total_distance(),
            duration: self.duration(),
            activity_type: self.activity_type.clone(),
            provider: self.provider.clone(),
            laps: self
                .laps
                .iter()
                .map(|lap| lap.format(&Rfc3339).unwrap_or_default())
                .collect(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            elevation: self.elevation.clone(),
            clock: self.clock.clone(),
            distance: self.distance.clone(),
            heart_rate: self.heart_rate.clone(),
            uphill: self.uphill,
            downhill: self.downhill,
            splits: self.splits(DEFAULT_SPLIT_KM),
            fastest: self.fastest_results(),
            warnings: self.warnings.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_record())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}km in {} ({} - {})",
            self.name,
            self.total_distance(),
            self.duration(),
            self.provider.as_deref().unwrap_or("none"),
            self.source_id
        )
    }
}

fn local_time(start: OffsetDateTime) -> PrimitiveDateTime {
    let shifted = start.to_offset(UtcOffset::UTC) + Duration::hours(LOCAL_TIME_OFFSET_HOURS);
    PrimitiveDateTime::new(shifted.date(), shifted.time())
}

/// Serialized form of an [`Activity`].
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub name: String,
    pub source_id: String,
    pub external_id: Option<String>,
    pub start: String,
    pub start_local: String,
    /// Kilometers
    pub total_distance: f64,
    /// Seconds
    pub duration: i64,
    pub activity_type: String,
    pub provider: Option<String>,
    pub laps: Vec<String>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// Meters
    pub elevation: Vec<Option<f64>>,
    /// Seconds
    pub clock: Vec<i64>,
    /// Cumulative kilometers
    pub distance: Vec<f64>,
    /// Beats per minute
    pub heart_rate: Vec<Option<i32>>,
    pub uphill: f64,
    pub downhill: f64,
    /// Seconds per 100m
    pub splits: Vec<f64>,
    /// Target kilometers -> seconds
    pub fastest: BTreeMap<String, Option<i64>>,
    pub warnings: Vec<DataWarning>,
}
