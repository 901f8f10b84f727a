//! Startup validation of signing secrets.
//!
//! A process that signs trust tokens has no safe degraded mode, so the
//! secrets are validated once, before anything else initializes, and the
//! process refuses to start if any are absent. A present-but-short secret
//! only logs a warning.

use tracing::warn;

/// Recommended minimum secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Environment variable holding the access token signing secret.
pub const ACCESS_TOKEN_SECRET_VAR: &str = "ACCESS_TOKEN_SECRET";

/// Validated signing secrets, constructed once at startup and passed to
/// the token codec by value. Session, reset, and verification tokens are
/// random opaque values and need no signing secret of their own.
#[derive(Clone, Debug)]
pub struct Secrets {
    access: Vec<u8>,
}

impl Secrets {
    /// Validate raw secret material. Every required secret must be
    /// present and non-empty; the error lists exactly which ones are not.
    pub fn validate(access: Option<String>) -> Result<Self, SecretsError> {
        let mut missing = Vec::new();

        let access = require(ACCESS_TOKEN_SECRET_VAR, access, &mut missing);

        if !missing.is_empty() {
            return Err(SecretsError::Missing(missing));
        }

        Ok(Self { access })
    }

    /// Secret used to sign and verify access tokens.
    pub fn access(&self) -> &[u8] {
        &self.access
    }
}

fn require(name: &'static str, value: Option<String>, missing: &mut Vec<&'static str>) -> Vec<u8> {
    match value {
        Some(secret) if !secret.is_empty() => {
            if secret.len() < MIN_SECRET_LENGTH {
                warn!(
                    secret = name,
                    "signing secret is shorter than {} bytes; use a longer secret",
                    MIN_SECRET_LENGTH
                );
            }
            secret.into_bytes()
        }
        _ => {
            missing.push(name);
            Vec::new()
        }
    }
}

/// Errors from secret validation. Never caught: startup aborts on it.
#[derive(Debug)]
pub enum SecretsError {
    /// One or more required secrets are absent or empty.
    Missing(Vec<&'static str>),
}

impl std::fmt::Display for SecretsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretsError::Missing(names) => write!(
                f,
                "Missing required secrets: {}. Set the listed environment variables before starting",
                names.join(", ")
            ),
        }
    }
}

impl std::error::Error for SecretsError {}
