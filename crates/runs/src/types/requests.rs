//! Request body types for API endpoints.

use serde::Deserialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRunRequest {
    pub athlete_id: Uuid,
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRunRequest {
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

/// A GPS sample submitted for an in-progress run. Coordinates are range
/// checked when converted to a `Coordinate`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePositionRequest {
    pub run_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    /// When the sample was taken, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_coach: bool,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAthleteInfoRequest {
    pub goals: Option<String>,
    #[validate(range(min = 1, max = 899, message = "Weight must be between 1 and 899"))]
    pub weight: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    pub athlete: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RateCoachRequest {
    pub athlete: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

/// One row of a collectible import. Coordinates are checked like positions.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CollectibleItemRow {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "UID is required"))]
    pub uid: String,
    #[validate(range(min = 0, message = "Value must not be negative"))]
    pub value: i32,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(url(message = "Picture must be a URL"))]
    pub picture: String,
}
