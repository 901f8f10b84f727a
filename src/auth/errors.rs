//! Error taxonomy for authentication flows.

use crate::jwt::JwtError;

/// The one message callers see for any credential failure. Which check
/// failed is logged, never returned.
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid or expired credentials";

/// Errors surfaced by the authentication flows.
///
/// The variants are distinct for logging and tests; at the HTTP boundary
/// every credential failure collapses into the same generic response.
#[derive(Debug)]
pub enum AuthError {
    /// Unknown account, wrong password, or an invalid/expired token.
    InvalidCredentials,
    /// Single-use token was already consumed or superseded.
    TokenConsumed,
    /// Single-use token exists but its expiry has passed.
    TokenExpired,
    /// Token codec failure while minting.
    Codec(JwtError),
    /// Storage failure. Retryable; says nothing about credential validity.
    Infrastructure(sqlx::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "{}", INVALID_CREDENTIALS_MSG),
            AuthError::TokenConsumed => write!(f, "Token already consumed or superseded"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::Codec(e) => write!(f, "Token codec error: {}", e),
            AuthError::Infrastructure(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Codec(e) => Some(e),
            AuthError::Infrastructure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Infrastructure(e)
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::Codec(e)
    }
}
