//! Position ingestion.
//!
//! A new GPS sample is measured against the chronologically previous sample of
//! its run, never against the most recently received one, so samples that
//! arrive out of order still produce correct deltas. Samples recorded after
//! the new one are re-derived against their new predecessor, which keeps the
//! cumulative distance non-decreasing along the run.

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    collectibles_service,
    errors::AppError,
    geo_math::{self, Coordinate},
    models::{Position, PositionSample},
    run_lifecycle,
    store::{RunStore, RunTransaction},
};

/// Distance and speed derived for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMetrics {
    /// Cumulative kilometers, rounded to two decimals.
    pub distance: f64,
    /// Meters per second over the preceding segment, rounded to two decimals.
    pub speed: f64,
}

impl SampleMetrics {
    pub const START: SampleMetrics = SampleMetrics {
        distance: 0.0,
        speed: 0.0,
    };

    /// Metrics for a sample at `coordinate`/`at` following `prior`.
    pub fn after(prior: Option<&Position>, coordinate: Coordinate, at: OffsetDateTime) -> Self {
        let Some(prior) = prior else {
            return Self::START;
        };
        let delta_m = geo_math::distance_m(prior.coordinate(), coordinate);
        let elapsed = (at - prior.recorded_at).as_seconds_f64();
        Self {
            distance: geo_math::round2(prior.distance + delta_m / 1000.0),
            speed: geo_math::round2(geo_math::speed(delta_m, elapsed)),
        }
    }
}

/// Re-derives `following` (chronological, all after `anchor`) against their
/// predecessors. Returns the indexes whose metrics changed.
pub fn relink(anchor: &Position, following: &mut [Position]) -> Vec<usize> {
    let mut changed = Vec::new();
    let mut previous = anchor.clone();

    for (idx, position) in following.iter_mut().enumerate() {
        let metrics =
            SampleMetrics::after(Some(&previous), position.coordinate(), position.recorded_at);
        if metrics.distance != position.distance || metrics.speed != position.speed {
            position.distance = metrics.distance;
            position.speed = metrics.speed;
            changed.push(idx);
        }
        previous = position.clone();
    }

    changed
}

/// Records a GPS sample for an in-progress run and grants nearby collectibles.
pub async fn ingest_position<S: RunStore>(
    store: &S,
    run_id: Uuid,
    sample: PositionSample,
) -> Result<Position, AppError> {
    let mut tx = store.begin().await?;

    let run = tx.lock_run(run_id).await?.ok_or(AppError::NotFound("Run"))?;
    if let Err(e) = run_lifecycle::ensure_accepts_positions(&run) {
        warn!("Rejected position for run {run_id} in status {}", run.status);
        return Err(e);
    }

    let prior = tx.position_at_or_before(run_id, sample.recorded_at).await?;
    let metrics = SampleMetrics::after(prior.as_ref(), sample.coordinate, sample.recorded_at);

    let position = Position {
        id: Uuid::new_v4(),
        run_id,
        latitude: sample.coordinate.latitude,
        longitude: sample.coordinate.longitude,
        recorded_at: sample.recorded_at,
        distance: metrics.distance,
        speed: metrics.speed,
        created_at: OffsetDateTime::now_utc(),
    };
    tx.insert_position(&position).await?;

    let mut following = tx.positions_after(run_id, sample.recorded_at).await?;
    if !following.is_empty() {
        let changed = relink(&position, &mut following);
        for idx in &changed {
            tx.update_position_metrics(&following[*idx]).await?;
        }
        info!(
            "Out-of-order sample for run {run_id}: re-derived {} later positions",
            changed.len()
        );
    }

    let granted =
        collectibles_service::match_and_grant(&mut tx, run.athlete_id, sample.coordinate).await?;

    tx.commit().await?;

    if !granted.is_empty() {
        info!(
            "Athlete {} collected {} items at run {run_id}",
            run.athlete_id,
            granted.len()
        );
    }

    Ok(position)
}
