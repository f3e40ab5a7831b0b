//! GPS position handlers.

use axum::{
    Extension,
    extract::{Query, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};

use super::validated;
use crate::{
    database::Database,
    errors::AppError,
    geo_math::Coordinate,
    models::{Position, PositionSample},
    position_ingest,
    types::{CreatePositionRequest, ListPositionsQuery},
};

/// Record a GPS sample for an in-progress run.
///
/// Distance and speed are derived against the chronologically previous sample,
/// and any collectible within range is granted to the run's athlete.
#[utoipa::path(
    post,
    path = "/positions",
    tag = "positions",
    request_body = CreatePositionRequest,
    responses(
        (status = 201, description = "Position recorded", body = Position),
        (status = 400, description = "Invalid coordinates or run not in progress"),
        (status = 404, description = "Run not found")
    )
)]
pub async fn create_position(
    Extension(db): Extension<Database>,
    payload: Result<Json<CreatePositionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Position>), AppError> {
    let req = validated(payload)?;
    let sample = PositionSample {
        coordinate: Coordinate::new(req.latitude, req.longitude)?,
        recorded_at: req.date_time,
    };

    let position = position_ingest::ingest_position(&db, req.run_id, sample).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

/// Positions of a run in chronological order.
#[utoipa::path(
    get,
    path = "/positions",
    tag = "positions",
    params(ListPositionsQuery),
    responses(
        (status = 200, description = "Positions of the run", body = Vec<Position>)
    )
)]
pub async fn list_positions(
    Extension(db): Extension<Database>,
    Query(query): Query<ListPositionsQuery>,
) -> Result<Json<Vec<Position>>, AppError> {
    let positions = db.list_positions(query.run_id).await?;
    Ok(Json(positions))
}
