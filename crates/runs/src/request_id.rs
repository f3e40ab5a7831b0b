//! Request correlation middleware.
//!
//! Each request runs inside an `info_span!` tagged with a request id, taken
//! from the client's `x-request-id` header when present. The id is echoed back
//! on the response and the completion log carries the handling latency.

use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Client ids longer than this are replaced with a generated one.
const MAX_CLIENT_ID_LEN: usize = 128;

fn request_id_for(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_CLIENT_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response<Body> {
    let request_id = request_id_for(&request);
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(request).await;

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_is_kept() {
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id_for(&request), "abc-123");
    }

    #[test]
    fn test_oversized_client_id_is_replaced() {
        let request = Request::builder()
            .header("x-request-id", "x".repeat(500))
            .body(Body::empty())
            .unwrap();
        let id = request_id_for(&request);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
