#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tower::ServiceExt;
use tradepost::db::Database;
use tradepost::secrets::Secrets;
use tradepost::{ServerConfig, create_app};

pub const TEST_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const TEST_IP: &str = "127.0.0.1";

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let secrets = Secrets::validate(Some(TEST_SECRET.to_string())).expect("valid test secret");
    let config = ServerConfig {
        secrets,
        db: db.clone(),
    };
    (create_app(&config), db)
}

/// Build a JSON request. The forwarded-for header satisfies the per-IP
/// rate limiters.
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", TEST_IP)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request carrying a bearer access token.
pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("x-forwarded-for", TEST_IP)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account and return the response body.
pub async fn register(app: &axum::Router, email: &str, password: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in and return the response body with the token pair.
pub async fn login(app: &axum::Router, email: &str, password: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Refresh with a session token, returning the raw response.
pub async fn refresh_response(app: &axum::Router, session_token: &str) -> Response<Body> {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions/refresh",
            serde_json::json!({ "session_token": session_token }),
        ))
        .await
        .unwrap()
}
