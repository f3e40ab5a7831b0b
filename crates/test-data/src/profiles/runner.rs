//! Runner athletic profile.

use rand::Rng;

use super::AthleteProfile;

/// Athletic profile for a runner.
///
/// Recreational runners sit around 6:00/km, competitive ones under 4:00/km.
#[derive(Debug, Clone)]
pub struct RunnerProfile {
    /// Base speed in m/s.
    base_speed: f64,
    /// Performance variance (coefficient of variation).
    variance: f64,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            base_speed: 3.5, // ~4:45/km
            variance: 0.08,
        }
    }
}

impl RunnerProfile {
    /// Creates a runner profile from a pace in minutes per kilometer.
    pub fn with_pace(pace_min_per_km: f64) -> Self {
        let base_speed = 1000.0 / (pace_min_per_km * 60.0);
        Self {
            base_speed,
            ..Default::default()
        }
    }

    /// Creates an elite runner profile (~3:30/km).
    pub fn elite() -> Self {
        Self::with_pace(3.5)
    }

    /// Creates a recreational runner profile (~6:00/km).
    pub fn recreational() -> Self {
        Self::with_pace(6.0)
    }

    /// A runner with a pace drawn uniformly between elite and beginner.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::with_pace(rng.gen_range(3.5..7.5))
    }

    pub fn pace_min_per_km(&self) -> f64 {
        1000.0 / (self.base_speed * 60.0)
    }
}

impl AthleteProfile for RunnerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn variance(&self) -> f64 {
        self.variance
    }
}
