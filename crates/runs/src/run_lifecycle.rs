//! Run state machine: `created -> in_progress -> finished`.
//!
//! Transitions are one-directional. Finishing a run freezes its distance,
//! duration and average speed, then evaluates the athlete's challenges in the
//! same transaction.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    challenges_service,
    errors::AppError,
    geo_math,
    models::{Position, Run, RunStatus},
    store::{RunStore, RunTransaction},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Start,
    Stop,
}

/// The status reached by applying `event` to `current`.
pub fn transition(current: RunStatus, event: RunEvent) -> Result<RunStatus, AppError> {
    match (current, event) {
        (RunStatus::Created, RunEvent::Start) => Ok(RunStatus::InProgress),
        (_, RunEvent::Start) => Err(AppError::invalid_state("Run already started")),
        (RunStatus::InProgress, RunEvent::Stop) => Ok(RunStatus::Finished),
        (_, RunEvent::Stop) => Err(AppError::invalid_state(
            "Run already finished or not started",
        )),
    }
}

pub fn ensure_accepts_positions(run: &Run) -> Result<(), AppError> {
    if run.status == RunStatus::InProgress {
        Ok(())
    } else {
        Err(AppError::invalid_state("Run is not in progress"))
    }
}

/// Aggregates frozen onto a run when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    /// Kilometers along the chronologically ordered path.
    pub distance: f64,
    /// Seconds between the earliest and latest sample.
    pub duration_seconds: f64,
    /// Mean of the per-sample speeds, m/s.
    pub average_speed: f64,
}

impl RunSummary {
    /// `positions` must be in chronological order.
    pub fn from_positions(positions: &[Position]) -> Self {
        let duration_seconds = match (positions.first(), positions.last()) {
            (Some(first), Some(last)) if positions.len() >= 2 => {
                (last.recorded_at - first.recorded_at).as_seconds_f64()
            }
            _ => 0.0,
        };

        let average_speed = if positions.is_empty() {
            0.0
        } else {
            positions.iter().map(|p| p.speed).sum::<f64>() / positions.len() as f64
        };

        Self {
            distance: geo_math::path_length_km(positions.iter().map(Position::coordinate)),
            duration_seconds,
            average_speed,
        }
    }
}

pub async fn start_run<S: RunStore>(store: &S, run_id: Uuid) -> Result<Run, AppError> {
    let mut tx = store.begin().await?;
    let mut run = tx.lock_run(run_id).await?.ok_or(AppError::NotFound("Run"))?;

    let next = transition(run.status, RunEvent::Start).inspect_err(|_| {
        warn!("Cannot start run {run_id} in status {}", run.status);
    })?;
    run.status = next;
    tx.update_run(&run).await?;
    tx.commit().await?;

    info!("Run {run_id} started by athlete {}", run.athlete_id);
    Ok(run)
}

pub async fn stop_run<S: RunStore>(store: &S, run_id: Uuid) -> Result<Run, AppError> {
    let mut tx = store.begin().await?;
    let mut run = tx.lock_run(run_id).await?.ok_or(AppError::NotFound("Run"))?;

    let next = transition(run.status, RunEvent::Stop).inspect_err(|_| {
        warn!("Cannot stop run {run_id} in status {}", run.status);
    })?;
    run.status = next;

    let positions = tx.positions(run_id).await?;
    let summary = RunSummary::from_positions(&positions);
    run.distance = summary.distance;
    run.duration_seconds = summary.duration_seconds;
    run.average_speed = summary.average_speed;
    tx.update_run(&run).await?;

    let awarded = challenges_service::award_challenges(&mut tx, run.athlete_id, Some(&run)).await?;

    tx.commit().await?;

    info!(
        "Run {run_id} finished: {:.2} km in {:.0}s ({} positions)",
        run.distance,
        run.duration_seconds,
        positions.len()
    );
    for name in &awarded {
        info!("Awarded challenge '{name}' to athlete {}", run.athlete_id);
    }

    Ok(run)
}
