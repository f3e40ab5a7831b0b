//! Run handlers: CRUD plus the start/stop lifecycle.

use axum::{
    Extension,
    extract::{Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use tracing::info;
use uuid::Uuid;

use super::validated;
use crate::{
    database::Database,
    errors::AppError,
    models::Run,
    run_lifecycle,
    types::{CreateRunRequest, ListRunsQuery, UpdateRunRequest},
};

/// Create a run for an athlete. New runs start in `created`.
#[utoipa::path(
    post,
    path = "/runs",
    tag = "runs",
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Run created", body = Run),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Athlete not found")
    )
)]
pub async fn create_run(
    Extension(db): Extension<Database>,
    payload: Result<Json<CreateRunRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Run>), AppError> {
    let req = validated(payload)?;

    let athlete = db
        .get_user(req.athlete_id)
        .await?
        .ok_or(AppError::NotFound("Athlete"))?;
    if athlete.is_coach {
        return Err(AppError::validation("Runs can only be created for athletes"));
    }

    let run = Run::new(athlete.id, req.comment);
    db.create_run(&run).await?;
    info!("Created run {} for athlete {}", run.id, athlete.id);

    Ok((StatusCode::CREATED, Json(run)))
}

#[utoipa::path(
    get,
    path = "/runs",
    tag = "runs",
    params(ListRunsQuery),
    responses(
        (status = 200, description = "Runs matching the filters", body = Vec<Run>)
    )
)]
pub async fn list_runs(
    Extension(db): Extension<Database>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<Vec<Run>>, AppError> {
    let runs = db.list_runs(query.status, query.athlete_id).await?;
    Ok(Json(runs))
}

#[utoipa::path(
    get,
    path = "/runs/{id}",
    tag = "runs",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run", body = Run),
        (status = 404, description = "Run not found")
    )
)]
pub async fn get_run(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, AppError> {
    let run = db.get_run(id).await?.ok_or(AppError::NotFound("Run"))?;
    Ok(Json(run))
}

/// Update a run's comment. Status and metrics only change through start/stop.
#[utoipa::path(
    patch,
    path = "/runs/{id}",
    tag = "runs",
    params(("id" = Uuid, Path, description = "Run ID")),
    request_body = UpdateRunRequest,
    responses(
        (status = 200, description = "Run updated", body = Run),
        (status = 404, description = "Run not found")
    )
)]
pub async fn update_run(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateRunRequest>, JsonRejection>,
) -> Result<Json<Run>, AppError> {
    let req = validated(payload)?;
    let run = db
        .update_run_comment(id, req.comment.as_deref())
        .await?
        .ok_or(AppError::NotFound("Run"))?;
    Ok(Json(run))
}

#[utoipa::path(
    delete,
    path = "/runs/{id}",
    tag = "runs",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 204, description = "Run deleted"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn delete_run(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !db.delete_run(id).await? {
        return Err(AppError::NotFound("Run"));
    }
    info!("Deleted run {id}");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/runs/{id}/start",
    tag = "runs",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run started", body = Run),
        (status = 400, description = "Run already started"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn start_run(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, AppError> {
    let run = run_lifecycle::start_run(&db, id).await?;
    Ok(Json(run))
}

/// Finish a run, freezing its metrics and evaluating challenges.
#[utoipa::path(
    post,
    path = "/runs/{id}/stop",
    tag = "runs",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run finished", body = Run),
        (status = 400, description = "Run already finished or not started"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn stop_run(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, AppError> {
    let run = run_lifecycle::stop_run(&db, id).await?;
    Ok(Json(run))
}
