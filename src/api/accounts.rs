//! Account API endpoints.
//!
//! - POST `/` - Register a new account
//! - POST `/login` - Verify credentials, open a session
//! - POST `/verify` - Consume an email verification token
//! - GET  `/me` - Profile of the authenticated caller

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, AuthService, INVALID_CREDENTIALS_MSG, RegisterError};
use crate::db::Database;
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Clone)]
pub struct AccountsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub auth: AuthService,
    pub rate_limits: Arc<RateLimitConfig>,
}

impl_has_auth_state!(AccountsState);

pub fn router(state: AccountsState) -> Router {
    let register_routes = Router::new()
        .route("/", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limits.clone(),
            rate_limit_register,
        ));

    let login_routes = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limits.clone(),
            rate_limit_login,
        ));

    let open_routes = Router::new()
        .route("/verify", post(verify_email))
        .route("/me", get(me))
        .with_state(state);

    Router::new()
        .merge(register_routes)
        .merge(login_routes)
        .merge(open_routes)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password cannot be longer than {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    uuid: String,
    email: String,
}

async fn register(
    State(state): State<AccountsState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    validate_email(email)?;
    validate_password(&payload.password)?;

    match state.auth.register(email, &payload.password).await {
        Ok(account) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                uuid: account.uuid,
                email: account.email,
            }),
        )),
        Err(RegisterError::EmailTaken) => Err(ApiError::conflict("Email is already registered")),
        Err(RegisterError::Infrastructure(e)) => {
            Err(ApiError::db_error("Failed to create account", e))
        }
    }
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
    access_expires_at: i64,
    session_token: String,
    session_expires_at: i64,
}

async fn login(
    State(state): State<AccountsState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = state
        .auth
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: grant.access_token,
        access_expires_at: grant.access_expires_at,
        session_token: grant.session_token,
        session_expires_at: grant.session_expires_at,
    }))
}

#[derive(Deserialize)]
struct VerifyEmailRequest {
    token: String,
}

async fn verify_email(
    State(state): State<AccountsState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .confirm_email_verification(&payload.token)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Serialize)]
struct ProfileResponse {
    uuid: String,
    email: String,
    verified: bool,
}

async fn me(
    State(state): State<AccountsState>,
    Auth(principal): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .db
        .accounts()
        .get_by_uuid(principal.uuid())
        .await
        .db_err("Failed to load account")?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS_MSG))?;

    Ok(Json(ProfileResponse {
        uuid: account.uuid,
        email: account.email,
        verified: account.verified,
    }))
}
