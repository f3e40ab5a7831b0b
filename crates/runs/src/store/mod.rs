//! Persistence seam for the run engine.
//!
//! Every core operation runs inside one [`RunTransaction`]. The transaction
//! holds the run's lock from [`RunTransaction::lock_run`] until it is
//! committed or dropped; dropping without [`RunTransaction::commit`] rolls
//! back. [`crate::database::Database`] backs this with PostgreSQL row locks,
//! [`MemoryStore`] with a single exclusive lock over its state.

mod memory;

pub use memory::{MemoryState, MemoryStore, MemoryTransaction};

use async_trait::async_trait;
use geo::Rect;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{CollectibleItem, Position, Run, RunTotals},
};

#[async_trait]
pub trait RunStore: Send + Sync {
    type Tx: RunTransaction;

    async fn begin(&self) -> Result<Self::Tx, AppError>;
}

#[async_trait]
pub trait RunTransaction: Send {
    /// Reads the run and holds its lock for the rest of the transaction.
    async fn lock_run(&mut self, run_id: Uuid) -> Result<Option<Run>, AppError>;

    /// Serializes challenge evaluation per athlete. Fails with `NotFound` for unknown athletes.
    async fn lock_athlete(&mut self, athlete_id: Uuid) -> Result<(), AppError>;

    async fn update_run(&mut self, run: &Run) -> Result<(), AppError>;

    /// All positions of a run in chronological order; ties keep arrival order.
    async fn positions(&mut self, run_id: Uuid) -> Result<Vec<Position>, AppError>;

    /// The chronologically latest position recorded at or before `at`.
    async fn position_at_or_before(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<Position>, AppError>;

    /// Positions recorded strictly after `at`, in chronological order.
    async fn positions_after(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Vec<Position>, AppError>;

    async fn insert_position(&mut self, position: &Position) -> Result<(), AppError>;

    /// Rewrites the derived distance and speed of an existing position.
    async fn update_position_metrics(&mut self, position: &Position) -> Result<(), AppError>;

    async fn finished_totals(&mut self, athlete_id: Uuid) -> Result<RunTotals, AppError>;

    async fn latest_finished_run(&mut self, athlete_id: Uuid) -> Result<Option<Run>, AppError>;

    /// Returns true if the challenge row was created by this call.
    async fn get_or_create_challenge(
        &mut self,
        athlete_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError>;

    /// Items whose coordinates fall inside `bounds` (x = longitude, y = latitude).
    async fn collectibles_within(
        &mut self,
        bounds: Rect<f64>,
    ) -> Result<Vec<CollectibleItem>, AppError>;

    /// Adds items to the athlete's collection. Returns only the newly added ids.
    async fn grant_collectibles(
        &mut self,
        athlete_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
