//! Milestone challenges awarded when a run finishes.
//!
//! Every rule is checked on every evaluation and several may fire at once.
//! Awards are get-or-create per (athlete, name), so evaluating again never
//! duplicates a challenge.

use tracing::info;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Run, RunTotals},
    store::{RunStore, RunTransaction},
};

pub const TEN_RUNS_COUNT: i64 = 10;
pub const FIFTY_KILOMETERS: f64 = 50.0;
pub const FAST_RUN_MIN_TOTAL_KM: f64 = 2.0;
pub const FAST_RUN_MAX_SECONDS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    TenRuns,
    FiftyKilometers,
    TwoKmInTenMinutes,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [
        Milestone::TenRuns,
        Milestone::FiftyKilometers,
        Milestone::TwoKmInTenMinutes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Milestone::TenRuns => "Ten Runs",
            Milestone::FiftyKilometers => "Fifty Kilometers",
            Milestone::TwoKmInTenMinutes => "2km in 10 Minutes",
        }
    }

    /// `run` is the run being judged for per-run rules; `None` skips them.
    pub fn is_reached(&self, totals: &RunTotals, run: Option<&Run>) -> bool {
        match self {
            Milestone::TenRuns => totals.count == TEN_RUNS_COUNT,
            Milestone::FiftyKilometers => totals.distance >= FIFTY_KILOMETERS,
            Milestone::TwoKmInTenMinutes => run.is_some_and(|run| {
                totals.distance >= FAST_RUN_MIN_TOTAL_KM
                    && run.duration_seconds <= FAST_RUN_MAX_SECONDS
            }),
        }
    }
}

pub fn milestones_reached(totals: &RunTotals, run: Option<&Run>) -> Vec<Milestone> {
    Milestone::ALL
        .into_iter()
        .filter(|m| m.is_reached(totals, run))
        .collect()
}

/// Evaluates every milestone inside an open transaction and returns the
/// names that were newly awarded.
pub async fn award_challenges<T: RunTransaction>(
    tx: &mut T,
    athlete_id: Uuid,
    run: Option<&Run>,
) -> Result<Vec<String>, AppError> {
    tx.lock_athlete(athlete_id).await?;
    let totals = tx.finished_totals(athlete_id).await?;

    let mut awarded = Vec::new();
    for milestone in milestones_reached(&totals, run) {
        if tx.get_or_create_challenge(athlete_id, milestone.name()).await? {
            awarded.push(milestone.name().to_string());
        }
    }

    Ok(awarded)
}

/// Standalone evaluation, judged against the athlete's latest finished run.
pub async fn evaluate_challenges<S: RunStore>(
    store: &S,
    athlete_id: Uuid,
) -> Result<Vec<String>, AppError> {
    let mut tx = store.begin().await?;
    tx.lock_athlete(athlete_id).await?;
    let latest = tx.latest_finished_run(athlete_id).await?;
    let awarded = award_challenges(&mut tx, athlete_id, latest.as_ref()).await?;
    tx.commit().await?;

    info!(
        "Evaluated challenges for athlete {athlete_id}: {} new",
        awarded.len()
    );
    Ok(awarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatus;

    fn finished_run(duration_seconds: f64) -> Run {
        let mut run = Run::new(Uuid::new_v4(), None);
        run.status = RunStatus::Finished;
        run.duration_seconds = duration_seconds;
        run
    }

    fn totals(count: i64, distance: f64) -> RunTotals {
        RunTotals { count, distance }
    }

    #[test]
    fn test_tenth_run_under_fifty_km() {
        let run = finished_run(1800.0);
        let reached = milestones_reached(&totals(10, 42.0), Some(&run));
        assert_eq!(reached, vec![Milestone::TenRuns]);
    }

    #[test]
    fn test_ten_runs_is_exact() {
        let run = finished_run(1800.0);
        assert!(milestones_reached(&totals(9, 1.0), Some(&run)).is_empty());
        assert!(milestones_reached(&totals(11, 1.0), Some(&run)).is_empty());
    }

    #[test]
    fn test_fifty_kilometers_inclusive() {
        let run = finished_run(1800.0);
        assert_eq!(
            milestones_reached(&totals(3, 50.0), Some(&run)),
            vec![Milestone::FiftyKilometers]
        );
        assert!(milestones_reached(&totals(3, 49.99), Some(&run)).is_empty());
    }

    #[test]
    fn test_fast_run_uses_this_run_duration() {
        assert_eq!(
            milestones_reached(&totals(1, 2.0), Some(&finished_run(600.0))),
            vec![Milestone::TwoKmInTenMinutes]
        );
        assert!(milestones_reached(&totals(1, 2.0), Some(&finished_run(600.5))).is_empty());
        assert!(milestones_reached(&totals(1, 1.99), Some(&finished_run(300.0))).is_empty());
        assert!(milestones_reached(&totals(1, 5.0), None).is_empty());
    }

    #[test]
    fn test_rules_fire_together() {
        let reached = milestones_reached(&totals(10, 55.0), Some(&finished_run(500.0)));
        assert_eq!(reached, Milestone::ALL.to_vec());
    }
}
