pub mod challenges_service;
pub mod collectibles_service;
pub mod config;
pub mod database;
pub mod errors;
pub mod geo_math;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod position_ingest;
pub mod request_id;
pub mod run_lifecycle;
pub mod store;
pub mod types;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    database::Database,
    handlers::{
        challenges_summary, company_details, create_position, create_run, create_user,
        delete_run, evaluate_athlete_challenges, get_athlete_info, get_run, get_user,
        health_check, import_collectibles, list_challenges, list_collectibles, list_positions,
        list_runs, list_users, rate_coach, start_run, stop_run, subscribe_to_coach,
        update_athlete_info, update_run,
    },
    openapi::ApiDoc,
    request_id::request_id_middleware,
};

pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let db = Database::new(pool);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/company_details", get(company_details))
        // Runs
        .route("/runs", get(list_runs).post(create_run))
        .route(
            "/runs/{id}",
            get(get_run).patch(update_run).delete(delete_run),
        )
        .route("/runs/{id}/start", post(start_run))
        .route("/runs/{id}/stop", post(stop_run))
        // Positions
        .route("/positions", get(list_positions).post(create_position))
        // Challenges
        .route("/challenges", get(list_challenges))
        .route("/challenges_summary", get(challenges_summary))
        .route(
            "/athletes/{id}/challenges/evaluate",
            post(evaluate_athlete_challenges),
        )
        // Collectibles
        .route("/collectible_items", get(list_collectibles))
        .route("/collectible_items/import", post(import_collectibles))
        // Users and athletes
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route(
            "/athlete_info/{user_id}",
            get(get_athlete_info).put(update_athlete_info),
        )
        .route("/subscribe_to_coach/{coach_id}", post(subscribe_to_coach))
        .route("/rate_coach/{coach_id}", post(rate_coach))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(db))
        .layer(Extension(config.company.clone()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub async fn run_server(pool: PgPool, config: &Config) -> anyhow::Result<()> {
    let app = create_router(pool, config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
