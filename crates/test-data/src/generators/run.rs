//! GPS run generation.
//!
//! Produces the samples a phone would submit during a run: a random walk with
//! momentum at the runner's pace, with GPS jitter, the occasional pause, and
//! optionally a few samples delivered out of order.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use time::{Duration, OffsetDateTime};

use runs::{geo_math::Coordinate, models::PositionSample};

use crate::{
    config::{BoundingBox, Region},
    profiles::{self, AthleteProfile},
};

/// Meters per degree of latitude, close enough for step sizing.
const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target distance in meters.
    pub distance_m: f64,
    /// Starting point (lat, lon). If None, random within bounds.
    pub start_point: Option<(f64, f64)>,
    pub bounds: BoundingBox,
    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,
    /// Seconds between samples while moving.
    pub sample_interval_s: f64,
    /// Probability of a pause before a sample (0.0 - 1.0).
    pub pause_probability: f64,
    /// Duration range for pauses (min, max) in seconds.
    pub pause_duration_range: (f64, f64),
    /// Probability that a sample is delivered after its successor.
    pub out_of_order_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            distance_m: 5000.0,
            start_point: None,
            bounds: Region::MOSCOW_CENTER,
            gps_jitter_m: 3.0,
            sample_interval_s: 10.0,
            pause_probability: 0.02,
            pause_duration_range: (20.0, 120.0),
            out_of_order_rate: 0.0,
        }
    }
}

/// Samples in the order they are delivered to the service.
#[derive(Debug, Clone)]
pub struct GeneratedRun {
    pub samples: Vec<PositionSample>,
}

impl GeneratedRun {
    /// Samples sorted by the time they were recorded.
    pub fn chronological(&self) -> Vec<PositionSample> {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|s| s.recorded_at);
        samples
    }

    pub fn duration_seconds(&self) -> f64 {
        let ordered = self.chronological();
        match (ordered.first(), ordered.last()) {
            (Some(first), Some(last)) => (last.recorded_at - first.recorded_at).as_seconds_f64(),
            _ => 0.0,
        }
    }
}

pub struct RunGenerator {
    config: RunConfig,
}

impl RunGenerator {
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
        }
    }

    pub fn for_region(bounds: BoundingBox) -> Self {
        Self {
            config: RunConfig {
                bounds,
                ..Default::default()
            },
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.config.distance_m = meters;
        self
    }

    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    pub fn with_pauses(mut self, probability: f64, min_sec: f64, max_sec: f64) -> Self {
        self.config.pause_probability = probability;
        self.config.pause_duration_range = (min_sec, max_sec);
        self
    }

    pub fn with_out_of_order_rate(mut self, rate: f64) -> Self {
        self.config.out_of_order_rate = rate;
        self
    }

    pub fn generate(
        &self,
        profile: &dyn AthleteProfile,
        started_at: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> GeneratedRun {
        let start = self
            .config
            .start_point
            .unwrap_or_else(|| self.config.bounds.random_point(rng));

        let mut samples = self.walk(start, profile, started_at, rng);
        self.shuffle_delivery(&mut samples, rng);
        GeneratedRun { samples }
    }

    /// Random walk with momentum, one sample per interval.
    fn walk(
        &self,
        start: (f64, f64),
        profile: &dyn AthleteProfile,
        started_at: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Vec<PositionSample> {
        let jitter = Normal::new(0.0, self.config.gps_jitter_m / METERS_PER_DEGREE).ok();
        let variance = profiles::sample_variance(profile, rng);
        let speed = profiles::speed_with_variance(profile, variance);

        let mut samples = vec![self.sample(start, started_at, jitter.as_ref(), rng)];
        let mut current = start;
        let mut timestamp = started_at;
        let mut covered = 0.0;
        let mut heading = rng.gen_range(0.0..std::f64::consts::TAU);

        while covered < self.config.distance_m {
            heading += rng.gen_range(-0.3..0.3);
            let step = speed * self.config.sample_interval_s * rng.gen_range(0.9..1.1);

            let lat_delta = (step * heading.cos()) / METERS_PER_DEGREE;
            let lon_delta =
                (step * heading.sin()) / (METERS_PER_DEGREE * current.0.to_radians().cos());
            let (lat, lon, bounced) =
                self.apply_bounds(current.0 + lat_delta, current.1 + lon_delta, heading);
            heading = bounced;
            current = (lat, lon);
            covered += step;

            let pause = if rng.r#gen::<f64>() < self.config.pause_probability {
                rng.gen_range(self.config.pause_duration_range.0..self.config.pause_duration_range.1)
            } else {
                0.0
            };
            timestamp += Duration::seconds_f64(self.config.sample_interval_s + pause);

            samples.push(self.sample(current, timestamp, jitter.as_ref(), rng));
        }

        samples
    }

    fn sample(
        &self,
        (lat, lon): (f64, f64),
        recorded_at: OffsetDateTime,
        jitter: Option<&Normal<f64>>,
        rng: &mut impl Rng,
    ) -> PositionSample {
        let (lat, lon) = match jitter {
            Some(jitter) => (lat + jitter.sample(rng), lon + jitter.sample(rng)),
            None => (lat, lon),
        };
        PositionSample {
            coordinate: Coordinate {
                latitude: lat.clamp(-90.0, 90.0),
                longitude: lon.clamp(-180.0, 180.0),
            },
            recorded_at,
        }
    }

    /// Clamps to bounds, reversing the heading on the crossed axis.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut new_heading = heading;

        let lat = if lat < b.min_lat || lat > b.max_lat {
            new_heading = std::f64::consts::PI - new_heading;
            lat.clamp(b.min_lat, b.max_lat)
        } else {
            lat
        };

        let lon = if lon < b.min_lon || lon > b.max_lon {
            new_heading = -new_heading;
            lon.clamp(b.min_lon, b.max_lon)
        } else {
            lon
        };

        (lat, lon, new_heading)
    }

    /// Swaps neighbouring samples so some arrive after their successor.
    fn shuffle_delivery(&self, samples: &mut [PositionSample], rng: &mut impl Rng) {
        if self.config.out_of_order_rate <= 0.0 {
            return;
        }
        let mut i = 1;
        while i + 1 < samples.len() {
            if rng.r#gen::<f64>() < self.config.out_of_order_rate {
                samples.swap(i, i + 1);
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

impl Default for RunGenerator {
    fn default() -> Self {
        Self::new()
    }
}
