//! Query parameter types for API endpoints.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{RunStatus, UserRole};

/// Run listing filters.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListRunsQuery {
    pub status: Option<RunStatus>,
    pub athlete_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ListPositionsQuery {
    pub run_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListChallengesQuery {
    pub athlete_id: Option<Uuid>,
}

/// User listing filters.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListUsersQuery {
    /// `coach` or `athlete`
    #[serde(rename = "type")]
    pub role: Option<UserRole>,
    /// Case-insensitive match on first or last name
    pub search: Option<String>,
}
