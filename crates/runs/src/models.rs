use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::geo_math::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_coach: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
}

impl User {
    pub fn new(username: String, first_name: String, last_name: String, is_coach: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            first_name,
            last_name,
            is_coach,
            date_joined: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "run_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    InProgress,
    Finished,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Created => "created",
            RunStatus::InProgress => "in_progress",
            RunStatus::Finished => "finished",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Run {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub status: RunStatus,
    pub comment: Option<String>,
    /// Kilometers.
    pub distance: f64,
    pub duration_seconds: f64,
    /// Meters per second.
    pub average_speed: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Run {
    pub fn new(athlete_id: Uuid, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            athlete_id,
            status: RunStatus::Created,
            comment,
            distance: 0.0,
            duration_seconds: 0.0,
            average_speed: 0.0,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Position {
    pub id: Uuid,
    pub run_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    /// Cumulative kilometers since the first sample of the run.
    pub distance: f64,
    /// Meters per second since the previous sample.
    pub speed: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Position {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A raw GPS sample before distance and speed are derived.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Challenge {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Challenge name with every athlete holding it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChallengeSummary {
    pub name: String,
    pub athletes: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CollectibleItem {
    pub id: Uuid,
    pub name: String,
    pub uid: String,
    pub value: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub picture: String,
}

impl CollectibleItem {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Totals over an athlete's finished runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct RunTotals {
    pub count: i64,
    /// Kilometers.
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AthleteInfo {
    pub user_id: Uuid,
    pub goals: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subscription {
    pub coach_id: Uuid,
    pub athlete_id: Uuid,
    pub rate: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// User row annotated for list views.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserWithStats {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_coach: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
    pub runs_finished: i64,
    /// Mean subscription rating, coaches only.
    pub rating: Option<f64>,
}

/// Role-specific user detail, tagged by `type`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UserDetail {
    Athlete {
        user: UserWithStats,
        coach: Option<UserSummary>,
        items: Vec<CollectibleItem>,
    },
    Coach {
        user: UserWithStats,
        athletes: Vec<UserSummary>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Athlete,
    Coach,
}

impl UserRole {
    pub fn is_coach(self) -> bool {
        matches!(self, UserRole::Coach)
    }
}

/// Company contact details served to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyDetails {
    pub company_name: String,
    pub slogan: String,
    pub contacts: String,
}
