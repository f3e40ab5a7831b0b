//! Great-circle geometry used by ingestion, run aggregation and collectible matching.
//!
//! Units: distances along a run are kilometers, speeds are meters per second,
//! search radii are meters.

use geo::{Coord, LineString, Point, Rect, coord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// A validated WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::validation(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::validation(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        coord! { x: c.longitude, y: c.latitude }
    }
}

/// Haversine distance in meters.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    haversine_m(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Haversine distance in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    distance_m(a, b) / 1000.0
}

fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let a =
        (d_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_M * c
}

/// `distance / seconds`, or 0 when no time has elapsed.
pub fn speed(distance: f64, seconds: f64) -> f64 {
    if seconds != 0.0 {
        distance / seconds
    } else {
        0.0
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Length of an ordered path in kilometers.
pub fn path_length_km<I>(points: I) -> f64
where
    I: IntoIterator<Item = Coordinate>,
{
    let line: LineString<f64> = points.into_iter().map(Coord::from).collect();
    line.lines()
        .map(|segment| {
            haversine_m(segment.start.y, segment.start.x, segment.end.y, segment.end.x)
        })
        .sum::<f64>()
        / 1000.0
}

/// Lat/lon rectangle containing every point within `radius_m` of `center`.
///
/// Longitude widens to the full range when the circle touches a pole or
/// crosses the antimeridian.
pub fn bounding_box(center: Coordinate, radius_m: f64) -> Rect<f64> {
    let angular = radius_m / EARTH_RADIUS_M;
    let d_lat = angular.to_degrees();

    let min_lat = center.latitude - d_lat;
    let max_lat = center.latitude + d_lat;

    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 {
        (-180.0, 180.0)
    } else {
        let d_lon = (angular.sin() / center.latitude.to_radians().cos())
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        let (lo, hi) = (center.longitude - d_lon, center.longitude + d_lon);
        if lo < -180.0 || hi > 180.0 {
            (-180.0, 180.0)
        } else {
            (lo, hi)
        }
    };

    Rect::new(
        coord! { x: min_lon, y: min_lat.max(-90.0) },
        coord! { x: max_lon, y: max_lat.min(90.0) },
    )
}
