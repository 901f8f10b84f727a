//! Tests for the password-reset token lifecycle.

mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;
use tradepost::clock::unix_now;

async fn request_reset(app: &axum::Router, email: &str) -> StatusCode {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/password/forgot",
            serde_json::json!({ "email": email }),
        ))
        .await
        .unwrap()
        .status()
}

async fn confirm_reset(
    app: &axum::Router,
    token: &str,
    new_password: &str,
) -> axum::http::Response<axum::body::Body> {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/password/reset",
            serde_json::json!({ "token": token, "new_password": new_password }),
        ))
        .await
        .unwrap()
}

async fn stored_reset_token(db: &tradepost::db::Database, email: &str) -> String {
    db.accounts()
        .get_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .reset_token
        .expect("reset token should be stored")
}

#[tokio::test]
async fn test_reset_flow_changes_password() {
    let (app, db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;
    assert_eq!(request_reset(&app, "alice@example.com").await, StatusCode::OK);

    let token = stored_reset_token(&db, "alice@example.com").await;
    let response = confirm_reset(&app, &token, "new-password-1").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password is dead, new one works.
    let old = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "alice@example.com", "password": "old-password-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    login(&app, "alice@example.com", "new-password-1").await;
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let (app, db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;
    request_reset(&app, "alice@example.com").await;
    let token = stored_reset_token(&db, "alice@example.com").await;

    assert_eq!(
        confirm_reset(&app, &token, "new-password-1").await.status(),
        StatusCode::OK
    );

    // Second consumption fails and leaves the password alone.
    assert_eq!(
        confirm_reset(&app, &token, "other-password-1").await.status(),
        StatusCode::UNAUTHORIZED
    );
    login(&app, "alice@example.com", "new-password-1").await;
}

#[tokio::test]
async fn test_second_request_supersedes_first_token() {
    let (app, db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;

    request_reset(&app, "alice@example.com").await;
    let first = stored_reset_token(&db, "alice@example.com").await;

    request_reset(&app, "alice@example.com").await;
    let second = stored_reset_token(&db, "alice@example.com").await;
    assert_ne!(first, second);

    // Only the second token is consumable now.
    assert_eq!(
        confirm_reset(&app, &first, "new-password-1").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        confirm_reset(&app, &second, "new-password-1").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_expired_reset_token_rejected() {
    let (app, db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;
    let account = db
        .accounts()
        .get_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    db.accounts()
        .set_reset_token(account.id, "expired-token", unix_now() - 60)
        .await
        .unwrap();

    let response = confirm_reset(&app, "expired-token", "new-password-1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Same body as an unknown token; the reason stays internal.
    let unknown = confirm_reset(&app, "never-issued", "new-password-1").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, body_json(unknown).await);
}

#[tokio::test]
async fn test_reset_confirmation_revokes_all_sessions() {
    let (app, db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;
    let first = login(&app, "alice@example.com", "old-password-1").await;
    let second = login(&app, "alice@example.com", "old-password-1").await;

    request_reset(&app, "alice@example.com").await;
    let token = stored_reset_token(&db, "alice@example.com").await;
    assert_eq!(
        confirm_reset(&app, &token, "new-password-1").await.status(),
        StatusCode::OK
    );

    // Whoever held a session from before the reset lost it.
    for grant in [&first, &second] {
        let response = refresh_response(&app, grant["session_token"].as_str().unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let account = db
        .accounts()
        .get_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        db.sessions()
            .count_active_for_user(account.id, unix_now())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_forgot_does_not_reveal_whether_email_exists() {
    let (app, _db) = create_test_app().await;

    register(&app, "alice@example.com", "old-password-1").await;

    let known = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/password/forgot",
            serde_json::json!({ "email": "alice@example.com" }),
        ))
        .await
        .unwrap();
    let unknown = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/password/forgot",
            serde_json::json!({ "email": "nobody@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(body_json(known).await, body_json(unknown).await);
}
