//! Collectible item generation.

use rand::Rng;
use uuid::Uuid;

use runs::models::CollectibleItem;

use crate::config::BoundingBox;

const KINDS: [(&str, i32); 5] = [
    ("Bronze Coin", 1),
    ("Silver Coin", 5),
    ("Gold Coin", 10),
    ("Ruby", 25),
    ("Diamond", 50),
];

/// Scatters collectible items over a region.
pub struct CollectibleGenerator {
    bounds: BoundingBox,
}

impl CollectibleGenerator {
    pub fn new(bounds: BoundingBox) -> Self {
        Self { bounds }
    }

    pub fn generate(&self, rng: &mut impl Rng) -> CollectibleItem {
        let (lat, lon) = self.bounds.random_point(rng);
        let (name, value) = KINDS[rng.gen_range(0..KINDS.len())];
        let slug = name.to_lowercase().replace(' ', "_");

        CollectibleItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            uid: format!("item-{}", Uuid::new_v4().simple()),
            value,
            latitude: lat,
            longitude: lon,
            picture: format!("https://assets.example.com/items/{slug}.png"),
        }
    }

    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<CollectibleItem> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;

    #[test]
    fn test_items_inside_region() {
        let item_gen = CollectibleGenerator::new(Region::GORKY_PARK);
        let mut rng = rand::thread_rng();

        let items = item_gen.generate_batch(50, &mut rng);

        assert!(items.iter().all(|i| Region::GORKY_PARK.contains(i.latitude, i.longitude)));
        let uids: std::collections::HashSet<_> = items.iter().map(|i| i.uid.as_str()).collect();
        assert_eq!(uids.len(), 50);
    }
}
