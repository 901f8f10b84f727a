//! Axum extractor guarding protected endpoints.
//!
//! Verifies the bearer access token with the codec alone; no database
//! round-trip, so gate latency is independent of how many sessions
//! exist. Refreshing an expired token is an explicit endpoint, never a
//! side effect of the gate.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use super::errors::INVALID_CREDENTIALS_MSG;
use super::state::HasAuthState;
use super::types::CurrentPrincipal;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX).map(str::trim)
}

/// Extractor for endpoints that require an authenticated caller.
/// Rejects before any handler logic runs.
pub struct Auth(pub CurrentPrincipal);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection)?;
        let claims = state
            .jwt()
            .verify_access_token(token)
            .map_err(|_| AuthRejection)?;
        Ok(Auth(CurrentPrincipal { claims }))
    }
}

/// Uniform 401 for any gate failure. Missing, malformed, forged, and
/// expired credentials are indistinguishable to the caller.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: INVALID_CREDENTIALS_MSG,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts_with_auth(value: &'static str) -> Parts {
        let mut request = Request::new(());
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth("Basic dXNlcjpwdw==");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = Request::new(()).into_parts().0;
        assert_eq!(bearer_token(&parts), None);
    }
}
