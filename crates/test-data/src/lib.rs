//! Test data generation for the runs service.
//!
//! Generates athletes, coaches, collectible items, coach subscriptions and
//! GPS runs, and seeds them into a database. Runs are played through the
//! service's own start/ingest/stop operations.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let seeder = Seeder::new(Database::new(pool));
//! let summary = seeder.seed(&SeedConfig::default(), &mut rng).await?;
//! ```

pub mod config;
pub mod db;
pub mod generators;
pub mod profiles;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region, SeedConfig};
    pub use crate::db::{SeedError, SeedSummary, Seeder, play_run};
    pub use crate::generators::{
        CollectibleGenerator, GeneratedRun, RunGenerator, SocialGenerator, UserGenerator,
    };
    pub use crate::profiles::{AthleteProfile, RunnerProfile, sample_variance};
    pub use runs::database::Database;
}
