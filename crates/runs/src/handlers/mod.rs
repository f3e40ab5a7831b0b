//! HTTP request handlers for the runs API.
//!
//! Handlers are grouped by resource; this module re-exports them, including
//! the utoipa `__path` types the OpenAPI document is assembled from.

pub mod athletes;
pub mod challenges;
pub mod collectibles;
pub mod positions;
pub mod runs;
pub mod stats;
pub mod users;

use axum::{Json, extract::rejection::JsonRejection};
use validator::Validate;

use crate::errors::AppError;

pub use athletes::{
    __path_get_athlete_info, __path_rate_coach, __path_subscribe_to_coach,
    __path_update_athlete_info, get_athlete_info, rate_coach, subscribe_to_coach,
    update_athlete_info,
};
pub use challenges::{
    __path_challenges_summary, __path_evaluate_athlete_challenges, __path_list_challenges,
    challenges_summary, evaluate_athlete_challenges, list_challenges,
};
pub use collectibles::{
    __path_import_collectibles, __path_list_collectibles, import_collectibles, list_collectibles,
};
pub use positions::{__path_create_position, __path_list_positions, create_position, list_positions};
pub use runs::{
    __path_create_run, __path_delete_run, __path_get_run, __path_list_runs, __path_start_run,
    __path_stop_run, __path_update_run, create_run, delete_run, get_run, list_runs, start_run,
    stop_run, update_run,
};
pub use stats::{__path_company_details, __path_health_check, company_details, health_check};
pub use users::{__path_create_user, __path_get_user, __path_list_users, create_user, get_user, list_users};

/// Unwraps a JSON body and runs its `validator` rules.
pub(crate) fn validated<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}
