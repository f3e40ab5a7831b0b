//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined geographic regions for test data generation.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Central Moscow, inside the Garden Ring.
    pub const MOSCOW_CENTER: BoundingBox = BoundingBox::new(55.735, 37.585, 55.775, 37.655);

    /// Gorky Park and Neskuchny Garden.
    pub const GORKY_PARK: BoundingBox = BoundingBox::new(55.712, 37.580, 55.732, 37.610);
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub athlete_count: usize,
    pub coach_count: usize,
    pub item_count: usize,
    /// Finished runs per athlete (inclusive range).
    pub runs_per_athlete: (usize, usize),
    /// Run length in meters (inclusive range).
    pub run_distance_m: (f64, f64),
    /// Probability that an athlete subscribes to a coach.
    pub subscription_rate: f64,
    /// Target region for items and runs.
    pub region: BoundingBox,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            athlete_count: 30,
            coach_count: 5,
            item_count: 60,
            runs_per_athlete: (1, 12),
            run_distance_m: (1500.0, 8000.0),
            subscription_rate: 0.7,
            region: Region::MOSCOW_CENTER,
        }
    }
}
