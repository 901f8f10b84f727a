//! Token-based authentication.
//!
//! Short-lived access tokens (15 min, stateless JWTs) paired with
//! long-lived opaque session tokens tracked in the database for
//! multi-device revocation. The request gate verifies access tokens
//! with the codec alone; session state is consulted only by refresh,
//! logout, and the cleanup sweep.

mod errors;
mod extractors;
mod service;
mod state;
mod types;

pub use errors::{AuthError, INVALID_CREDENTIALS_MSG};
pub use extractors::{Auth, AuthRejection};
pub use service::{
    AuthService, LoginGrant, RESET_TOKEN_DURATION_SECS, RefreshGrant, RegisterError,
    RegisteredAccount, SESSION_DURATION_SECS, hash_password, verify_password,
};
pub use state::HasAuthState;
pub use types::CurrentPrincipal;
