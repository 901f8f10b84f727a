//! Token minting and validation.
//!
//! Access tokens are short-lived signed JWTs verified without any
//! database round-trip. Session, reset, and verification tokens are
//! random opaque values; they carry no claims and are validated by
//! lookup in storage.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::clock::unix_now;

/// Access token duration: 15 minutes.
pub const ACCESS_TOKEN_DURATION_SECS: i64 = 15 * 60;

/// Byte length of opaque tokens before base64url encoding.
const OPAQUE_TOKEN_BYTES: usize = 32;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (account UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Result of minting an access token.
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// The JWT token string
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

/// Signing configuration for access tokens.
///
/// Construction fails on an empty secret, so a mint or verify call can
/// never run against an undefined key.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Mint an access token for an account.
    pub fn mint_access_token(&self, account_uuid: &str) -> Result<AccessTokenResult, JwtError> {
        let now = unix_now();
        let exp = now + ACCESS_TOKEN_DURATION_SECS;

        let claims = AccessClaims {
            sub: account_uuid.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(AccessTokenResult {
            token,
            expires_at: exp,
        })
    }

    /// Validate and decode an access token.
    ///
    /// Malformed tokens, bad signatures, and expired claims all produce
    /// the same opaque error.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
                .map_err(|_| JwtError::Invalid)?;

        // Valid only while now < exp: a claim at exactly its expiry is dead.
        if unix_now() >= token_data.claims.exp {
            return Err(JwtError::Invalid);
        }

        Ok(token_data.claims)
    }
}

/// Generate a random opaque token (base64url, no padding).
///
/// Used for session, password-reset, and email-verification tokens.
pub fn mint_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Errors that can occur during token operations.
#[derive(Debug)]
pub enum JwtError {
    /// Signing secret was empty at construction time
    EmptySecret,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token is malformed, forged, or expired; carries no detail about
    /// which check failed
    Invalid,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::EmptySecret => write!(f, "Signing secret is empty"),
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Invalid => write!(f, "Invalid or expired token"),
        }
    }
}

impl std::error::Error for JwtError {}
