//! Password reset API endpoints.
//!
//! - POST `/forgot` - Issue a reset token for an email address
//! - POST `/reset` - Consume a reset token and set a new password

use axum::{Json, Router, extract::State, middleware, response::IntoResponse, routing::post};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::AuthService;
use crate::rate_limit::{RateLimitConfig, rate_limit_password_reset};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
pub struct PasswordState {
    pub auth: AuthService,
    pub rate_limits: Arc<RateLimitConfig>,
}

pub fn router(state: PasswordState) -> Router {
    let forgot_routes = Router::new()
        .route("/forgot", post(forgot))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limits.clone(),
            rate_limit_password_reset,
        ));

    let reset_routes = Router::new()
        .route("/reset", post(reset))
        .with_state(state);

    Router::new().merge(forgot_routes).merge(reset_routes)
}

#[derive(Deserialize)]
struct ForgotRequest {
    email: String,
}

/// Issue a reset token. The response is identical whether or not the
/// email belongs to an account, so the endpoint cannot be used to probe
/// which addresses are registered.
async fn forgot(
    State(state): State<PasswordState>,
    Json(payload): Json<ForgotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .request_password_reset(payload.email.trim())
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
struct ResetRequest {
    token: String,
    new_password: String,
}

async fn reset(
    State(state): State<PasswordState>,
    Json(payload): Json<ResetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    state
        .auth
        .confirm_password_reset(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
