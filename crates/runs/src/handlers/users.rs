//! User handlers.

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
    models::{User, UserDetail, UserWithStats},
    types::{CreateUserRequest, ListUsersQuery},
};

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_user(
    Extension(db): Extension<Database>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let req = validated(payload)?;
    let user = User::new(req.username, req.first_name, req.last_name, req.is_coach);

    match db.create_user(&user).await {
        Ok(()) => {}
        Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        Err(e) => return Err(e),
    }

    info!("Created user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Users with finished-run counts and coach ratings.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = Vec<UserWithStats>)
    )
)]
pub async fn list_users(
    Extension(db): Extension<Database>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserWithStats>>, AppError> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let users = db.list_users(query.role, search).await?;
    Ok(Json(users))
}

/// Athletes come with their coach and collected items, coaches with their
/// athletes.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserDetail),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(db): Extension<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, AppError> {
    let user = db
        .get_user_with_stats(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let detail = if user.is_coach {
        let athletes = db.athletes_of(id).await?;
        UserDetail::Coach { user, athletes }
    } else {
        let coach = db.coach_of(id).await?;
        let items = db.collected_items(id).await?;
        UserDetail::Athlete { user, coach, items }
    };

    Ok(Json(detail))
}
