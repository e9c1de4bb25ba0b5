//! Athletic performance profiles.
//!
//! Profiles define speeds, grade factors and a heart-rate response. Track
//! generators use them to produce realistic timestamps and heart rate.

mod runner;

pub use runner::RunnerProfile;

/// Trait for athletic performance profiles.
pub trait AthleteProfile: Send + Sync {
    /// Base speed on flat terrain in meters per second.
    fn base_speed_mps(&self) -> f64;

    /// Speed multiplier for a given grade (expressed as a fraction, e.g., 0.05 = 5% grade).
    ///
    /// Values below 1.0 are slower than base (uphill), above 1.0 faster (downhill).
    fn grade_factor(&self, grade: f64) -> f64;

    /// Day-to-day performance variance as a coefficient of variation (0.0 - 1.0).
    fn variance(&self) -> f64;

    fn resting_hr(&self) -> f64;

    fn max_hr(&self) -> f64;

    /// Steady-state heart rate while moving at `speed_mps` up `grade`.
    ///
    /// Base speed on the flat sits at 75% of heart-rate reserve; climbing
    /// adds effort at constant speed.
    fn heart_rate_at(&self, speed_mps: f64, grade: f64) -> f64 {
        let intensity = (speed_mps / self.base_speed_mps()) * (1.0 + grade.max(0.0) * 8.0);
        let reserve = self.max_hr() - self.resting_hr();
        (self.resting_hr() + reserve * 0.75 * intensity).clamp(self.resting_hr(), self.max_hr())
    }
}

/// Speed after applying grade and a sampled day-to-day factor.
pub fn speed_at_grade(profile: &dyn AthleteProfile, grade: f64, variance_factor: f64) -> f64 {
    let target = profile.base_speed_mps() * profile.grade_factor(grade);
    // Minimum 0.5 m/s to avoid division issues
    (target * variance_factor).max(0.5)
}

/// Samples a variance factor around 1.0.
pub fn sample_variance(profile: &dyn AthleteProfile, rng: &mut impl rand::Rng) -> f64 {
    use rand_distr::{Distribution, Normal};

    match Normal::new(1.0, profile.variance()) {
        Ok(normal) if profile.variance() > 0.0 => normal.sample(rng).clamp(0.7, 1.4),
        _ => 1.0,
    }
}
