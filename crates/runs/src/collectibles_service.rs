//! Collectible items picked up by passing close to them during a run.

use uuid::Uuid;

use crate::{
    errors::AppError,
    geo_math::{self, Coordinate},
    models::CollectibleItem,
    store::RunTransaction,
};

/// Pick-up radius in meters, inclusive.
pub const COLLECT_RADIUS_METERS: f64 = 100.0;

/// Items whose exact great-circle distance from `center` is within `radius_m`.
pub fn items_in_range<'a>(
    center: Coordinate,
    items: &'a [CollectibleItem],
    radius_m: f64,
) -> Vec<&'a CollectibleItem> {
    items
        .iter()
        .filter(|item| geo_math::distance_m(center, item.coordinate()) <= radius_m)
        .collect()
}

/// Grants every item within range of `at` to the athlete. Returns only the
/// items the athlete did not hold before.
pub async fn match_and_grant<T: RunTransaction>(
    tx: &mut T,
    athlete_id: Uuid,
    at: Coordinate,
) -> Result<Vec<Uuid>, AppError> {
    let bounds = geo_math::bounding_box(at, COLLECT_RADIUS_METERS);
    let candidates = tx.collectibles_within(bounds).await?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let in_range: Vec<Uuid> = items_in_range(at, &candidates, COLLECT_RADIUS_METERS)
        .into_iter()
        .map(|item| item.id)
        .collect();
    if in_range.is_empty() {
        return Ok(Vec::new());
    }

    tx.grant_collectibles(athlete_id, &in_range).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, lat: f64, lon: f64) -> CollectibleItem {
        CollectibleItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            uid: format!("uid-{name}"),
            value: 10,
            latitude: lat,
            longitude: lon,
            picture: String::new(),
        }
    }

    #[test]
    fn test_item_at_same_point_is_in_range() {
        let here = Coordinate::new(55.7512, 37.6184).unwrap();
        let items = [item("coin", 55.7512, 37.6184)];
        assert_eq!(items_in_range(here, &items, COLLECT_RADIUS_METERS).len(), 1);
    }

    #[test]
    fn test_radius_boundary() {
        let here = Coordinate::new(0.0, 0.0).unwrap();
        // 0.0008 deg of latitude is ~89 m, 0.001 deg is ~111 m.
        let items = [item("near", 0.0008, 0.0), item("far", 0.001, 0.0)];

        let found = items_in_range(here, &items, COLLECT_RADIUS_METERS);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "near");
    }

    #[test]
    fn test_bounding_box_contains_every_item_in_range() {
        let here = Coordinate::new(55.7512, 37.6184).unwrap();
        let bounds = geo_math::bounding_box(here, COLLECT_RADIUS_METERS);
        let items = [
            item("north", 55.7520, 37.6184),
            item("east", 55.7512, 37.6198),
            item("diagonal", 55.7517, 37.6193),
        ];

        for found in items_in_range(here, &items, COLLECT_RADIUS_METERS) {
            let c = found.coordinate();
            assert!(
                (bounds.min().y..=bounds.max().y).contains(&c.latitude)
                    && (bounds.min().x..=bounds.max().x).contains(&c.longitude),
                "{} escaped the prefilter",
                found.name
            );
        }
    }
}
