//! Authenticated principal types.

use crate::jwt::AccessClaims;

/// Principal identity attached to a request by the auth gate.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    /// Claims from the verified access token
    pub claims: AccessClaims,
}

impl CurrentPrincipal {
    /// Account UUID of the caller.
    pub fn uuid(&self) -> &str {
        &self.claims.sub
    }
}
