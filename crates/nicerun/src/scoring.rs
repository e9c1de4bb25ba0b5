//! Training-effort score from heart-rate or pace zones.
//!
//! Time spent above the "hard" threshold counts eight times as much as time
//! below it, and time above the "max" threshold counts double again.

use crate::splits;

/// Samples under this heart rate are sensor noise.
const MIN_VALID_HR: i32 = 40;

/// Split length used for pace-zone scoring, in kilometers.
const PACE_SPLIT_KM: f64 = 0.5;

pub trait TrackMetric {
    type Input;
    type Score;
    fn next_point(&mut self, input: Self::Input);
    fn finish(&mut self) -> Self::Score;
}

/// Which zone model produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffortMode {
    HeartRate,
    Pace,
}

/// Heart-rate thresholds in bpm, truncated to whole beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateZones {
    pub hard: i32,
    pub max: i32,
}

impl HeartRateZones {
    pub fn from_max_hr(max_hr: u32) -> Self {
        Self {
            hard: (f64::from(max_hr) * 0.79) as i32,
            max: (f64::from(max_hr) * 0.92) as i32,
        }
    }
}

/// Pace thresholds in minutes per kilometer. Lower is faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceZones {
    pub hard: f64,
    pub max: f64,
}

impl PaceZones {
    pub fn from_5k_pace(pace_5k: f64) -> Self {
        Self {
            hard: pace_5k * 1.25,
            max: pace_5k * 0.92,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ZoneTime {
    above: f64,
    below: f64,
}

impl ZoneTime {
    fn score(self) -> u32 {
        ((self.above / 60.0) * 2.0 + (self.below / 60.0) * 0.25).round() as u32
    }
}

/// Accumulates `(heart_rate, seconds_until_next_sample)` pairs.
#[derive(Debug, Clone)]
struct HeartRateLoad {
    zones: HeartRateZones,
    time: ZoneTime,
}

impl TrackMetric for HeartRateLoad {
    type Input = (i32, f64);
    type Score = u32;

    fn next_point(&mut self, (hr, seconds): (i32, f64)) {
        if hr < MIN_VALID_HR {
            return;
        }
        if hr > self.zones.max {
            self.time.above += seconds * 2.0;
        } else if hr > self.zones.hard {
            self.time.above += seconds;
        } else {
            self.time.below += seconds;
        }
    }

    fn finish(&mut self) -> u32 {
        self.time.score()
    }
}

/// Accumulates half-kilometer split times in seconds.
#[derive(Debug, Clone)]
struct PaceLoad {
    zones: PaceZones,
    time: ZoneTime,
}

impl TrackMetric for PaceLoad {
    type Input = f64;
    type Score = u32;

    fn next_point(&mut self, split_seconds: f64) {
        let pace = split_seconds / PACE_SPLIT_KM / 60.0;
        if pace < self.zones.max {
            self.time.above += split_seconds * 2.0;
        } else if pace < self.zones.hard {
            self.time.above += split_seconds;
        } else {
            self.time.below += split_seconds;
        }
    }

    fn finish(&mut self) -> u32 {
        self.time.score()
    }
}

/// Pick the zone model: pace only when the track has no heart rate at all
/// and a reference 5K pace is given.
pub fn effort_mode(heart_rate: &[Option<i32>], pace_5k: Option<f64>) -> EffortMode {
    let has_hr = heart_rate.iter().any(|hr| hr.is_some_and(|v| v != 0));
    match pace_5k {
        Some(p) if !has_hr && p > 0.0 => EffortMode::Pace,
        _ => EffortMode::HeartRate,
    }
}

/// Unitless training load for one track.
///
/// `pace_5k` is in minutes per kilometer. Returns `None` when pace scoring is
/// selected but the track covers no distance.
pub fn effort(
    heart_rate: &[Option<i32>],
    clock: &[i64],
    distance: &[f64],
    max_hr: u32,
    pace_5k: Option<f64>,
) -> Option<u32> {
    match (effort_mode(heart_rate, pace_5k), pace_5k) {
        (EffortMode::Pace, Some(pace_5k)) => {
            if distance.last().is_none_or(|d| *d <= 0.0) {
                return None;
            }
            let mut load = PaceLoad {
                zones: PaceZones::from_5k_pace(pace_5k),
                time: ZoneTime::default(),
            };
            for split in splits::splits(distance, clock, PACE_SPLIT_KM) {
                load.next_point(split);
            }
            Some(load.finish())
        }
        _ => {
            let mut load = HeartRateLoad {
                zones: HeartRateZones::from_max_hr(max_hr),
                time: ZoneTime::default(),
            };
            if max_hr > 0 {
                for (hr, pair) in heart_rate.iter().zip(clock.windows(2)) {
                    load.next_point((hr.unwrap_or(0), (pair[1] - pair[0]) as f64));
                }
            }
            Some(load.finish())
        }
    }
}
