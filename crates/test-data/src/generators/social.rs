//! Coach subscription generation.

use rand::{Rng, seq::SliceRandom};
use uuid::Uuid;

/// An athlete subscribed to a coach, optionally with a 1-5 rating.
#[derive(Debug, Clone)]
pub struct GeneratedSubscription {
    pub coach_id: Uuid,
    pub athlete_id: Uuid,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct SocialGenConfig {
    /// Probability that an athlete has a coach.
    pub subscription_rate: f64,
    /// Probability that a subscribed athlete rates their coach.
    pub rating_rate: f64,
}

impl Default for SocialGenConfig {
    fn default() -> Self {
        Self {
            subscription_rate: 0.7,
            rating_rate: 0.6,
        }
    }
}

pub struct SocialGenerator {
    config: SocialGenConfig,
}

impl SocialGenerator {
    pub fn new() -> Self {
        Self {
            config: SocialGenConfig::default(),
        }
    }

    pub fn with_config(config: SocialGenConfig) -> Self {
        Self { config }
    }

    /// Each athlete picks at most one coach. Ratings lean positive.
    pub fn generate_subscriptions(
        &self,
        coach_ids: &[Uuid],
        athlete_ids: &[Uuid],
        rng: &mut impl Rng,
    ) -> Vec<GeneratedSubscription> {
        let mut subscriptions = Vec::new();

        for &athlete_id in athlete_ids {
            if rng.r#gen::<f64>() >= self.config.subscription_rate {
                continue;
            }
            let Some(&coach_id) = coach_ids.choose(rng) else {
                break;
            };
            let rating = (rng.r#gen::<f64>() < self.config.rating_rate).then(|| {
                const WEIGHTED: [i32; 8] = [2, 3, 3, 4, 4, 4, 5, 5];
                WEIGHTED[rng.gen_range(0..WEIGHTED.len())]
            });
            subscriptions.push(GeneratedSubscription {
                coach_id,
                athlete_id,
                rating,
            });
        }

        subscriptions
    }
}

impl Default for SocialGenerator {
    fn default() -> Self {
        Self::new()
    }
}
