//! Default seed script - fills a database with athletes, coaches, items and runs
//!
//! Run with:
//! ```
//! cargo run -p test-data --bin seed
//! ```

use rand::{SeedableRng, rngs::StdRng};
use runs::{config::Config, database::Database};
use sqlx::postgres::PgPoolOptions;
use test_data::{config::SeedConfig, db::Seeder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../runs/migrations").run(&pool).await?;

    tracing::info!("Connected to database");

    let mut rng = StdRng::seed_from_u64(12345); // Reproducible data
    let summary = Seeder::new(Database::new(pool))
        .seed(&SeedConfig::default(), &mut rng)
        .await?;

    tracing::info!("Seed completed!");
    tracing::info!("  Athletes: {}", summary.athletes);
    tracing::info!("  Coaches: {}", summary.coaches);
    tracing::info!("  Items: {}", summary.items);
    tracing::info!("  Subscriptions: {}", summary.subscriptions);
    tracing::info!("  Runs: {}", summary.runs);
    tracing::info!("  Positions: {}", summary.positions);

    Ok(())
}
