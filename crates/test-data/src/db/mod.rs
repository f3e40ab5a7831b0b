//! Database integration for seeding test data.
//!
//! The [`Seeder`] writes generated users, items and subscriptions directly and
//! plays generated runs through the run engine, so positions, run metrics,
//! challenges and collected items come out exactly as the service computes them.

mod seeder;

pub use seeder::{SeedError, SeedSummary, Seeder, play_run};
