use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use geo::Rect;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{RunStore, RunTransaction};
use crate::{
    errors::AppError,
    models::{Challenge, CollectibleItem, Position, Run, RunStatus, RunTotals, User},
};

/// In-process store used by tests and the seeding tools.
///
/// A transaction takes the state lock for its whole lifetime and works on a
/// staged copy, so operations are fully serialized and an uncommitted
/// transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: HashMap<Uuid, User>,
    pub runs: HashMap<Uuid, Run>,
    /// Arrival order.
    pub positions: Vec<Position>,
    pub challenges: Vec<Challenge>,
    pub items: Vec<CollectibleItem>,
    /// (athlete_id, item_id)
    pub collected: BTreeSet<(Uuid, Uuid)>,
}

impl MemoryState {
    /// Positions of a run sorted by timestamp, arrival order breaking ties.
    fn sorted_positions(&self, run_id: Uuid) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .filter(|p| p.run_id == run_id)
            .cloned()
            .collect();
        positions.sort_by_key(|p| p.recorded_at);
        positions
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn insert_run(&self, run: Run) {
        self.state.lock().await.runs.insert(run.id, run);
    }

    pub async fn insert_collectible(&self, item: CollectibleItem) {
        self.state.lock().await.items.push(item);
    }

    pub async fn run(&self, run_id: Uuid) -> Option<Run> {
        self.state.lock().await.runs.get(&run_id).cloned()
    }

    pub async fn positions(&self, run_id: Uuid) -> Vec<Position> {
        self.state.lock().await.sorted_positions(run_id)
    }

    pub async fn challenge_names(&self, athlete_id: Uuid) -> Vec<String> {
        self.state
            .lock()
            .await
            .challenges
            .iter()
            .filter(|c| c.athlete_id == athlete_id)
            .map(|c| c.name.clone())
            .collect()
    }

    pub async fn collected_items(&self, athlete_id: Uuid) -> Vec<Uuid> {
        self.state
            .lock()
            .await
            .collected
            .iter()
            .filter(|(athlete, _)| *athlete == athlete_id)
            .map(|(_, item)| *item)
            .collect()
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl RunStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }
}

#[async_trait]
impl RunTransaction for MemoryTransaction {
    async fn lock_run(&mut self, run_id: Uuid) -> Result<Option<Run>, AppError> {
        Ok(self.staged.runs.get(&run_id).cloned())
    }

    async fn lock_athlete(&mut self, athlete_id: Uuid) -> Result<(), AppError> {
        if self.staged.users.contains_key(&athlete_id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Athlete"))
        }
    }

    async fn update_run(&mut self, run: &Run) -> Result<(), AppError> {
        match self.staged.runs.get_mut(&run.id) {
            Some(existing) => {
                *existing = run.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Run")),
        }
    }

    async fn positions(&mut self, run_id: Uuid) -> Result<Vec<Position>, AppError> {
        Ok(self.staged.sorted_positions(run_id))
    }

    async fn position_at_or_before(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<Position>, AppError> {
        Ok(self
            .staged
            .sorted_positions(run_id)
            .into_iter()
            .rev()
            .find(|p| p.recorded_at <= at))
    }

    async fn positions_after(
        &mut self,
        run_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Vec<Position>, AppError> {
        Ok(self
            .staged
            .sorted_positions(run_id)
            .into_iter()
            .filter(|p| p.recorded_at > at)
            .collect())
    }

    async fn insert_position(&mut self, position: &Position) -> Result<(), AppError> {
        self.staged.positions.push(position.clone());
        Ok(())
    }

    async fn update_position_metrics(&mut self, position: &Position) -> Result<(), AppError> {
        let existing = self
            .staged
            .positions
            .iter_mut()
            .find(|p| p.id == position.id)
            .ok_or(AppError::NotFound("Position"))?;
        existing.distance = position.distance;
        existing.speed = position.speed;
        Ok(())
    }

    async fn finished_totals(&mut self, athlete_id: Uuid) -> Result<RunTotals, AppError> {
        Ok(self
            .staged
            .runs
            .values()
            .filter(|r| r.athlete_id == athlete_id && r.status == RunStatus::Finished)
            .fold(RunTotals::default(), |acc, r| RunTotals {
                count: acc.count + 1,
                distance: acc.distance + r.distance,
            }))
    }

    async fn latest_finished_run(&mut self, athlete_id: Uuid) -> Result<Option<Run>, AppError> {
        Ok(self
            .staged
            .runs
            .values()
            .filter(|r| r.athlete_id == athlete_id && r.status == RunStatus::Finished)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn get_or_create_challenge(
        &mut self,
        athlete_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError> {
        let exists = self
            .staged
            .challenges
            .iter()
            .any(|c| c.athlete_id == athlete_id && c.name == name);
        if exists {
            return Ok(false);
        }
        self.staged.challenges.push(Challenge {
            id: Uuid::new_v4(),
            athlete_id,
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(true)
    }

    async fn collectibles_within(
        &mut self,
        bounds: Rect<f64>,
    ) -> Result<Vec<CollectibleItem>, AppError> {
        let (min, max) = (bounds.min(), bounds.max());
        Ok(self
            .staged
            .items
            .iter()
            .filter(|item| {
                (min.y..=max.y).contains(&item.latitude) && (min.x..=max.x).contains(&item.longitude)
            })
            .cloned()
            .collect())
    }

    async fn grant_collectibles(
        &mut self,
        athlete_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        Ok(item_ids
            .iter()
            .copied()
            .filter(|item_id| self.staged.collected.insert((athlete_id, *item_id)))
            .collect())
    }

    async fn commit(mut self) -> Result<(), AppError> {
        *self.guard = self.staged;
        Ok(())
    }
}
