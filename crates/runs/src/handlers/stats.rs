//! Health check and company details handlers.

use axum::{Extension, http::StatusCode, response::Json};

use crate::models::CompanyDetails;

#[utoipa::path(
    get,
    path = "/health",
    tag = "stats",
    responses(
        (status = 200, description = "Health check passed")
    )
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Company name, slogan and contacts from the service configuration.
#[utoipa::path(
    get,
    path = "/company_details",
    tag = "stats",
    responses(
        (status = 200, description = "Company details", body = CompanyDetails)
    )
)]
pub async fn company_details(
    Extension(details): Extension<CompanyDetails>,
) -> Json<CompanyDetails> {
    Json(details)
}
