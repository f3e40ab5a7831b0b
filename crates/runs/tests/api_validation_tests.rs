//! HTTP input validation tests.
//!
//! Every request here is rejected (or answered) before a database connection
//! is needed, so the router runs against a lazily connected pool.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use runs::{config::Config, create_router};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let config = Config::default();
    let pool = PgPool::connect_lazy(&config.database_url).expect("lazy pool");
    create_router(pool, &config)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()[header::X_CONTENT_TYPE_OPTIONS],
        "nosniff"
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = test_app()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_company_details() {
    let response = test_app()
        .oneshot(Request::get("/company_details").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let defaults = Config::default().company;
    assert_eq!(body["company_name"], defaults.company_name);
    assert_eq!(body["slogan"], defaults.slogan);
    assert_eq!(body["contacts"], defaults.contacts);
}

#[tokio::test]
async fn test_position_with_invalid_latitude() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/positions",
            json!({
                "run_id": Uuid::new_v4(),
                "latitude": 91.0,
                "longitude": 37.6,
                "date_time": "2025-07-07T10:00:00Z"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_position_with_invalid_longitude() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/positions",
            json!({
                "run_id": Uuid::new_v4(),
                "latitude": 55.7,
                "longitude": -181.0,
                "date_time": "2025-07-07T10:00:00Z"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_position_with_bad_timestamp() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/positions",
            json!({
                "run_id": Uuid::new_v4(),
                "latitude": 55.7,
                "longitude": 37.6,
                "date_time": "yesterday"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json() {
    let response = test_app()
        .oneshot(
            Request::post("/runs")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rating_out_of_range() {
    for rating in [0, 6] {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                &format!("/rate_coach/{}", Uuid::new_v4()),
                json!({ "athlete": Uuid::new_v4(), "rating": rating }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "rating {rating}");
    }
}

#[tokio::test]
async fn test_weight_out_of_range() {
    let response = test_app()
        .oneshot(json_request(
            "PUT",
            &format!("/athlete_info/{}", Uuid::new_v4()),
            json!({ "weight": 900 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Weight"));
}

#[tokio::test]
async fn test_empty_username() {
    let response = test_app()
        .oneshot(json_request("POST", "/users", json!({ "username": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_run_id_path() {
    let response = test_app()
        .oneshot(Request::post("/runs/not-a-uuid/start").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
