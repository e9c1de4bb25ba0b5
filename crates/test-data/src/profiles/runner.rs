//! Runner athletic profile.

use super::AthleteProfile;

/// Athletic profile for running activities.
///
/// Based on typical recreational to competitive runner performance:
/// - Base pace: ~5:00/km (3.33 m/s)
/// - Uphill: ~15% slower per 1% grade
/// - Downhill: ~8% faster per 1% grade (limited by safety)
#[derive(Debug, Clone)]
pub struct RunnerProfile {
    /// Base speed in m/s on flat terrain.
    base_speed: f64,
    variance: f64,
    resting_hr: f64,
    max_hr: f64,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            base_speed: 1000.0 / 300.0, // 5:00/km
            variance: 0.08,
            resting_hr: 55.0,
            max_hr: 190.0,
        }
    }
}

impl RunnerProfile {
    /// Creates a runner with the given flat pace in minutes per kilometer.
    pub fn with_pace(pace_min_per_km: f64) -> Self {
        Self {
            base_speed: 1000.0 / (pace_min_per_km * 60.0),
            ..Default::default()
        }
    }

    /// Same runner, different heart.
    pub fn with_heart_rate(mut self, resting_hr: f64, max_hr: f64) -> Self {
        self.resting_hr = resting_hr;
        self.max_hr = max_hr;
        self
    }

    /// Removes day-to-day variance, for exact pacing in tests.
    pub fn steady(mut self) -> Self {
        self.variance = 0.0;
        self
    }

    /// Creates an elite runner profile (~3:30/km base pace).
    pub fn elite() -> Self {
        Self::with_pace(3.5).with_heart_rate(45.0, 195.0)
    }

    /// Creates a recreational runner profile (~6:00/km base pace).
    pub fn recreational() -> Self {
        Self::with_pace(6.0)
    }
}

impl AthleteProfile for RunnerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn grade_factor(&self, grade: f64) -> f64 {
        if grade >= 0.0 {
            // Minimum 20% of base speed on steep climbs
            (1.0 - grade * 15.0).max(0.2)
        } else {
            // grade is negative, so this adds; capped at 150%
            (1.0 - grade * 8.0).min(1.5)
        }
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn resting_hr(&self) -> f64 {
        self.resting_hr
    }

    fn max_hr(&self) -> f64 {
        self.max_hr
    }
}
