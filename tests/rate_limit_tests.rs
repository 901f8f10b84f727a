//! Tests for per-IP rate limiting on credential-guessing endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use tower::ServiceExt;

fn forgot_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/password/forgot")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            serde_json::json!({ "email": "alice@example.com" }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_forgot_is_rate_limited_per_ip() {
    let (app, _db) = create_test_app().await;

    for _ in 0..5 {
        let response = app.clone().oneshot(forgot_request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Sixth request from the same address trips the limiter.
    let response = app.clone().oneshot(forgot_request("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different address is unaffected.
    let response = app.clone().oneshot(forgot_request("10.0.0.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_without_client_ip_is_refused() {
    let (app, _db) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/password/forgot")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "email": "alice@example.com" }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
