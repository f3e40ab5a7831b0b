//! Database seeding utilities.

use rand::Rng;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use runs::{
    database::Database,
    errors::AppError,
    models::Run,
    position_ingest::ingest_position,
    run_lifecycle::{start_run, stop_run},
    store::RunStore,
};

use crate::{
    config::SeedConfig,
    generators::{
        CollectibleGenerator, GeneratedRun, GeneratedSubscription, GeneratedUser, RunGenerator,
        SocialGenerator, UserGenerator,
        social::SocialGenConfig,
    },
    profiles::RunnerProfile,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("Run {0} has no samples")]
    NoSamples(Uuid),
}

#[derive(Debug, Default, Clone)]
pub struct SeedSummary {
    pub athletes: usize,
    pub coaches: usize,
    pub items: usize,
    pub subscriptions: usize,
    pub runs: usize,
    pub positions: usize,
}

/// Starts an already persisted run, submits every sample in delivery order and
/// stops it.
pub async fn play_run<S: RunStore>(
    store: &S,
    run_id: Uuid,
    generated: &GeneratedRun,
) -> Result<Run, SeedError> {
    if generated.samples.is_empty() {
        return Err(SeedError::NoSamples(run_id));
    }

    start_run(store, run_id).await?;
    for sample in &generated.samples {
        ingest_position(store, run_id, *sample).await?;
    }
    Ok(stop_run(store, run_id).await?)
}

/// Database seeder for inserting generated test data.
pub struct Seeder {
    db: Database,
}

impl Seeder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn seed_users(&self, users: &[GeneratedUser]) -> Result<(), SeedError> {
        info!("Seeding {} users...", users.len());

        for generated in users {
            self.db.create_user(&generated.user).await?;
            if generated.weight.is_some() || generated.goals.is_some() {
                self.db
                    .update_athlete_info(
                        generated.user.id,
                        generated.goals.as_deref(),
                        generated.weight,
                    )
                    .await?;
            }
        }

        Ok(())
    }

    pub async fn seed_subscriptions(
        &self,
        subscriptions: &[GeneratedSubscription],
    ) -> Result<(), SeedError> {
        info!("Seeding {} subscriptions...", subscriptions.len());

        for sub in subscriptions {
            self.db.subscribe(sub.coach_id, sub.athlete_id).await?;
            if let Some(rating) = sub.rating {
                self.db.rate_coach(sub.coach_id, sub.athlete_id, rating).await?;
            }
        }

        Ok(())
    }

    /// Creates a run for the athlete and plays the samples through the engine.
    pub async fn seed_run(
        &self,
        athlete_id: Uuid,
        comment: Option<String>,
        generated: &GeneratedRun,
    ) -> Result<Run, SeedError> {
        let run = Run::new(athlete_id, comment);
        self.db.create_run(&run).await?;
        let finished = play_run(&self.db, run.id, generated).await?;
        debug!(
            "Seeded run {}: {:.2} km in {:.0}s",
            finished.id, finished.distance, finished.duration_seconds
        );
        Ok(finished)
    }

    /// Generates and inserts a complete data set.
    pub async fn seed(
        &self,
        config: &SeedConfig,
        rng: &mut (impl Rng + Send),
    ) -> Result<SeedSummary, SeedError> {
        let users = UserGenerator::new();
        let athletes = users.athletes(config.athlete_count, rng);
        let coaches = users.coaches(config.coach_count, rng);
        self.seed_users(&athletes).await?;
        self.seed_users(&coaches).await?;

        let items = CollectibleGenerator::new(config.region).generate_batch(config.item_count, rng);
        let imported = self.db.upsert_collectibles(&items).await?;
        info!("Seeded {imported} collectible items");

        let athlete_ids: Vec<Uuid> = athletes.iter().map(|a| a.user.id).collect();
        let coach_ids: Vec<Uuid> = coaches.iter().map(|c| c.user.id).collect();
        let subscriptions = SocialGenerator::with_config(SocialGenConfig {
            subscription_rate: config.subscription_rate,
            ..Default::default()
        })
        .generate_subscriptions(&coach_ids, &athlete_ids, rng);
        self.seed_subscriptions(&subscriptions).await?;

        let mut summary = SeedSummary {
            athletes: athletes.len(),
            coaches: coaches.len(),
            items: items.len(),
            subscriptions: subscriptions.len(),
            ..Default::default()
        };

        let now = OffsetDateTime::now_utc();
        for (idx, athlete_id) in athlete_ids.iter().enumerate() {
            let profile = RunnerProfile::random(rng);
            let run_count = rng.gen_range(config.runs_per_athlete.0..=config.runs_per_athlete.1);

            for day in 0..run_count {
                let distance = rng.gen_range(config.run_distance_m.0..=config.run_distance_m.1);
                let started_at = now - Duration::days((run_count - day) as i64)
                    + Duration::minutes(rng.gen_range(0..600));
                let generated = RunGenerator::for_region(config.region)
                    .with_distance(distance)
                    .with_out_of_order_rate(0.02)
                    .generate(&profile, started_at, rng);

                self.seed_run(*athlete_id, None, &generated).await?;
                summary.runs += 1;
                summary.positions += generated.samples.len();
            }

            info!(
                "  Seeded runs for {}/{} athletes",
                idx + 1,
                athlete_ids.len()
            );
        }

        Ok(summary)
    }
}
