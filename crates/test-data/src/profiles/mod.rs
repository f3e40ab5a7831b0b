//! Athletic performance profiles.
//!
//! Profiles define realistic running speeds. They are used by the run
//! generator to space sample timestamps.

mod runner;

pub use runner::RunnerProfile;

/// Trait for athletic performance profiles.
pub trait AthleteProfile: Send + Sync {
    /// Base speed in meters per second.
    fn base_speed_mps(&self) -> f64;

    /// Day-to-day performance variance as a coefficient of variation (0.0 - 1.0).
    ///
    /// A value of 0.1 means typical day-to-day variation of ±10%.
    fn variance(&self) -> f64;
}

/// Speed for one stretch of a run given a sampled variance factor.
pub fn speed_with_variance(profile: &dyn AthleteProfile, variance_factor: f64) -> f64 {
    (profile.base_speed_mps() * variance_factor).max(0.5) // Walking pace floor
}

/// Samples a variance factor from normal distribution.
/// Returns a multiplier around 1.0.
pub fn sample_variance(profile: &dyn AthleteProfile, rng: &mut impl rand::Rng) -> f64 {
    use rand_distr::{Distribution, Normal};

    let std_dev = profile.variance();
    match Normal::new(1.0, std_dev) {
        Ok(normal) if std_dev > 0.0 => normal.sample(rng).clamp(0.7, 1.4),
        _ => 1.0,
    }
}
