//! Session API endpoints.
//!
//! - POST `/refresh` - Exchange a session token for a new access token
//! - POST `/logout` - Revoke one session
//! - POST `/logout-all` - Revoke every session of the caller
//! - GET  `/` - List active sessions for the caller

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, AuthService, INVALID_CREDENTIALS_MSG};
use crate::clock::unix_now;
use crate::db::Database;
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct SessionsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub auth: AuthService,
}

impl_has_auth_state!(SessionsState);

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/", get(list_sessions))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .with_state(state)
}

#[derive(Deserialize)]
struct SessionTokenRequest {
    session_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    access_token: String,
    access_expires_at: i64,
}

/// Mint a new access token against a live session. The session token is
/// not rotated; it stays valid until logout or its own expiry.
async fn refresh(
    State(state): State<SessionsState>,
    Json(payload): Json<SessionTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = state.auth.refresh(&payload.session_token).await?;

    Ok(Json(RefreshResponse {
        access_token: grant.access_token,
        access_expires_at: grant.access_expires_at,
    }))
}

/// Revoke one session. Reports success even if the token was already
/// gone.
async fn logout(
    State(state): State<SessionsState>,
    Json(payload): Json<SessionTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(&payload.session_token).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Revoke every session of the authenticated caller.
async fn logout_all(
    State(state): State<SessionsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout_all(principal.uuid()).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Session summary for the listing endpoint. Token values are
/// credentials and are never echoed back.
#[derive(Serialize)]
struct SessionInfo {
    created_at: i64,
    expires_at: i64,
}

#[derive(Serialize)]
struct ListSessionsResponse {
    sessions: Vec<SessionInfo>,
}

async fn list_sessions(
    State(state): State<SessionsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .db
        .accounts()
        .get_by_uuid(principal.uuid())
        .await
        .db_err("Failed to load account")?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS_MSG))?;

    let sessions = state
        .db
        .sessions()
        .list_active_for_user(account.id, unix_now())
        .await
        .db_err("Failed to list sessions")?;

    Ok(Json(ListSessionsResponse {
        sessions: sessions
            .into_iter()
            .map(|s| SessionInfo {
                created_at: s.created_at,
                expires_at: s.expires_at,
            })
            .collect(),
    }))
}
