//! Challenge handlers.

use axum::{
    Extension,
    extract::{Path, Query},
    response::Json,
};
use uuid::Uuid;

use crate::{
    challenges_service,
    database::Database,
    errors::AppError,
    models::{Challenge, ChallengeSummary, UserSummary},
    types::{EvaluateChallengesResponse, ListChallengesQuery},
};

#[utoipa::path(
    get,
    path = "/challenges",
    tag = "challenges",
    params(ListChallengesQuery),
    responses(
        (status = 200, description = "Awarded challenges", body = Vec<Challenge>)
    )
)]
pub async fn list_challenges(
    Extension(db): Extension<Database>,
    Query(query): Query<ListChallengesQuery>,
) -> Result<Json<Vec<Challenge>>, AppError> {
    let challenges = db.list_challenges(query.athlete_id).await?;
    Ok(Json(challenges))
}

/// Every challenge name with the athletes holding it.
#[utoipa::path(
    get,
    path = "/challenges_summary",
    tag = "challenges",
    responses(
        (status = 200, description = "Challenges grouped by name", body = Vec<ChallengeSummary>)
    )
)]
pub async fn challenges_summary(
    Extension(db): Extension<Database>,
) -> Result<Json<Vec<ChallengeSummary>>, AppError> {
    let holders = db.challenge_holders().await?;
    Ok(Json(group_by_name(holders)))
}

/// Groups (name, athlete) rows already ordered by name.
pub(crate) fn group_by_name(holders: Vec<(String, UserSummary)>) -> Vec<ChallengeSummary> {
    let mut summary: Vec<ChallengeSummary> = Vec::new();
    for (name, athlete) in holders {
        match summary.last_mut() {
            Some(group) if group.name == name => group.athletes.push(athlete),
            _ => summary.push(ChallengeSummary {
                name,
                athletes: vec![athlete],
            }),
        }
    }
    summary
}

/// Re-evaluate an athlete's challenges outside of a run stop.
#[utoipa::path(
    post,
    path = "/athletes/{id}/challenges/evaluate",
    tag = "challenges",
    params(("id" = Uuid, Path, description = "Athlete ID")),
    responses(
        (status = 200, description = "Newly awarded challenges", body = EvaluateChallengesResponse),
        (status = 404, description = "Athlete not found")
    )
)]
pub async fn evaluate_athlete_challenges(
    Extension(db): Extension<Database>,
    Path(athlete_id): Path<Uuid>,
) -> Result<Json<EvaluateChallengesResponse>, AppError> {
    let awarded = challenges_service::evaluate_challenges(&db, athlete_id).await?;
    Ok(Json(EvaluateChallengesResponse { awarded }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(username: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn test_group_keeps_first_athlete() {
        let rows = vec![
            ("Fifty Kilometers".to_string(), athlete("anna")),
            ("Ten Runs".to_string(), athlete("boris")),
            ("Ten Runs".to_string(), athlete("vera")),
        ];

        let summary = group_by_name(rows);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].athletes.len(), 1);
        assert_eq!(summary[0].athletes[0].username, "anna");
        let names: Vec<_> = summary[1].athletes.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names, ["boris", "vera"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_by_name(Vec::new()).is_empty());
    }
}
