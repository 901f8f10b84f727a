mod accounts;
mod error;
mod password;
mod sessions;

use axum::Router;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, auth: AuthService) -> Router {
    let rate_limits = Arc::new(RateLimitConfig::new());

    let accounts_state = accounts::AccountsState {
        db: db.clone(),
        jwt: jwt.clone(),
        auth: auth.clone(),
        rate_limits: rate_limits.clone(),
    };

    let sessions_state = sessions::SessionsState {
        db,
        jwt,
        auth: auth.clone(),
    };

    let password_state = password::PasswordState { auth, rate_limits };

    Router::new()
        .nest("/accounts", accounts::router(accounts_state))
        .nest("/sessions", sessions::router(sessions_state))
        .nest("/password", password::router(password_state))
}
