//! Athlete profile and coach subscription handlers.

use axum::{
    Extension,
    extract::{Path, rejection::JsonRejection},
    response::Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::validated;
use crate::{
    database::Database,
    errors::AppError,
    models::{AthleteInfo, User},
    types::{RateCoachRequest, SubscribeRequest, SuccessResponse, UpdateAthleteInfoRequest},
};

async fn require_user(db: &Database, id: Uuid, what: &'static str) -> Result<User, AppError> {
    db.get_user(id).await?.ok_or(AppError::NotFound(what))
}

async fn require_coach(db: &Database, id: Uuid) -> Result<User, AppError> {
    let user = require_user(db, id, "Coach").await?;
    if !user.is_coach {
        return Err(AppError::NotFound("Coach"));
    }
    Ok(user)
}

async fn require_athlete(db: &Database, id: Uuid) -> Result<User, AppError> {
    let user = require_user(db, id, "Athlete").await?;
    if user.is_coach {
        return Err(AppError::NotFound("Athlete"));
    }
    Ok(user)
}

/// Athlete info, created empty on first access.
#[utoipa::path(
    get,
    path = "/athlete_info/{user_id}",
    tag = "athletes",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Athlete info", body = AthleteInfo),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_athlete_info(
    Extension(db): Extension<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AthleteInfo>, AppError> {
    require_user(&db, user_id, "User").await?;
    let info = db.get_or_create_athlete_info(user_id).await?;
    Ok(Json(info))
}

#[utoipa::path(
    put,
    path = "/athlete_info/{user_id}",
    tag = "athletes",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateAthleteInfoRequest,
    responses(
        (status = 200, description = "Athlete info updated", body = AthleteInfo),
        (status = 400, description = "Weight out of range"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_athlete_info(
    Extension(db): Extension<Database>,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<UpdateAthleteInfoRequest>, JsonRejection>,
) -> Result<Json<AthleteInfo>, AppError> {
    let req = validated(payload)?;
    require_user(&db, user_id, "User").await?;
    let info = db
        .update_athlete_info(user_id, req.goals.as_deref(), req.weight)
        .await?;
    Ok(Json(info))
}

#[utoipa::path(
    post,
    path = "/subscribe_to_coach/{coach_id}",
    tag = "athletes",
    params(("coach_id" = Uuid, Path, description = "Coach ID")),
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = SuccessResponse),
        (status = 404, description = "Coach or athlete not found"),
        (status = 409, description = "Already subscribed")
    )
)]
pub async fn subscribe_to_coach(
    Extension(db): Extension<Database>,
    Path(coach_id): Path<Uuid>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let req = validated(payload)?;
    require_coach(&db, coach_id).await?;
    require_athlete(&db, req.athlete).await?;

    if !db.subscribe(coach_id, req.athlete).await? {
        warn!("Athlete {} already subscribed to coach {coach_id}", req.athlete);
        return Err(AppError::Conflict("Already subscribed".to_string()));
    }

    info!("Athlete {} subscribed to coach {coach_id}", req.athlete);
    Ok(Json(SuccessResponse::new("Subscribed")))
}

#[utoipa::path(
    post,
    path = "/rate_coach/{coach_id}",
    tag = "athletes",
    params(("coach_id" = Uuid, Path, description = "Coach ID")),
    request_body = RateCoachRequest,
    responses(
        (status = 200, description = "Rated", body = SuccessResponse),
        (status = 400, description = "Rating out of range or not subscribed"),
        (status = 404, description = "Coach or athlete not found")
    )
)]
pub async fn rate_coach(
    Extension(db): Extension<Database>,
    Path(coach_id): Path<Uuid>,
    payload: Result<Json<RateCoachRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let req = validated(payload)?;
    require_coach(&db, coach_id).await?;
    require_athlete(&db, req.athlete).await?;

    db.rate_coach(coach_id, req.athlete, req.rating)
        .await?
        .ok_or_else(|| AppError::validation("Not subscribed"))?;

    info!("Athlete {} rated coach {coach_id}: {}", req.athlete, req.rating);
    Ok(Json(SuccessResponse::new("Rated")))
}
