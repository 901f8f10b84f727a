//! Authentication flows: login, refresh, logout, and the single-use
//! token lifecycle for password reset and email verification.
//!
//! Session tokens are opaque values tracked server-side and are not
//! rotated on refresh: the token issued at login stays valid until its
//! own expiry or an explicit logout. Rotating on every refresh (delete
//! old row, insert new row) would shrink the replay window but changes
//! the token lifetime contract for clients, so it is left as a
//! documented hardening option rather than done silently.

use std::sync::{Arc, LazyLock};

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordVerifier, Salt, SaltString};
use tracing::info;
use uuid::Uuid;

use super::errors::AuthError;
use crate::clock::unix_now;
use crate::db::Database;
use crate::jwt::{JwtConfig, mint_opaque_token};

/// Session lifetime: 30 days.
pub const SESSION_DURATION_SECS: i64 = 30 * 24 * 60 * 60;

/// Password-reset tokens are consumable for one hour.
pub const RESET_TOKEN_DURATION_SECS: i64 = 60 * 60;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent accounts take the same time
/// as requests for existing ones.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    PasswordHash::generate(Argon2::default(), b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    PasswordHash::generate(Argon2::default(), password.as_bytes(), Salt::from(&salt))
        .expect("failed to hash password")
        .to_string()
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists.
fn dummy_verify(password: &str) {
    if let Ok(hash) = PasswordHash::new(&DUMMY_HASH) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub access_token: String,
    pub access_expires_at: i64,
    pub session_token: String,
    pub session_expires_at: i64,
}

/// Token issued by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub access_token: String,
    pub access_expires_at: i64,
}

/// A freshly registered account. The verification token is handed to
/// the mail pipeline, never to the HTTP caller.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    pub uuid: String,
    pub email: String,
    pub verification_token: String,
}

/// Errors from account registration.
#[derive(Debug)]
pub enum RegisterError {
    EmailTaken,
    Infrastructure(sqlx::Error),
}

/// Orchestrates the token codec and the stores behind the auth endpoints.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(db: Database, jwt: Arc<JwtConfig>) -> Self {
        Self { db, jwt }
    }

    /// Create a new account with a fresh verification token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RegisteredAccount, RegisterError> {
        let uuid = Uuid::new_v4().to_string();
        let password_hash = hash_password(password);
        let verification_token = mint_opaque_token();

        match self
            .db
            .accounts()
            .create(&uuid, email, &password_hash, &verification_token)
            .await
        {
            Ok(_) => {
                info!(account = %uuid, "account registered");
                Ok(RegisteredAccount {
                    uuid,
                    email: email.to_string(),
                    verification_token,
                })
            }
            Err(e) => {
                let taken = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if taken {
                    Err(RegisterError::EmailTaken)
                } else {
                    Err(RegisterError::Infrastructure(e))
                }
            }
        }
    }

    /// Verify credentials, mint an access token, and open a session.
    /// Every failure reads the same to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let Some(account) = self.db.accounts().get_by_email(email).await? else {
            dummy_verify(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let access = self.jwt.mint_access_token(&account.uuid)?;
        let session = self
            .db
            .sessions()
            .create(account.id, unix_now(), SESSION_DURATION_SECS)
            .await?;

        info!(account = %account.uuid, "login");

        Ok(LoginGrant {
            access_token: access.token,
            access_expires_at: access.expires_at,
            session_token: session.token,
            session_expires_at: session.expires_at,
        })
    }

    /// Exchange a live session token for a new access token. The session
    /// token itself is left untouched.
    pub async fn refresh(&self, session_token: &str) -> Result<RefreshGrant, AuthError> {
        let Some(session) = self.db.sessions().find_by_token(session_token).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        // An expired row reads the same as a missing one; the sweep will
        // collect it.
        if session.expires_at <= unix_now() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(account) = self.db.accounts().get_by_id(session.user_id).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let access = self.jwt.mint_access_token(&account.uuid)?;

        Ok(RefreshGrant {
            access_token: access.token,
            access_expires_at: access.expires_at,
        })
    }

    /// Revoke one session. Succeeds whether or not the token still exists.
    pub async fn logout(&self, session_token: &str) -> Result<(), AuthError> {
        self.db.sessions().delete_by_token(session_token).await?;
        Ok(())
    }

    /// Revoke every session the account owns, in one statement.
    /// Succeeds even for an unknown account.
    pub async fn logout_all(&self, account_uuid: &str) -> Result<(), AuthError> {
        let Some(account) = self.db.accounts().get_by_uuid(account_uuid).await? else {
            return Ok(());
        };
        let revoked = self.db.sessions().delete_all_for_user(account.id).await?;
        info!(account = %account_uuid, revoked, "logout everywhere");
        Ok(())
    }

    /// Issue a password-reset token, superseding any outstanding one.
    /// Always succeeds so callers cannot probe which emails exist; the
    /// token reaches the account owner through the mail pipeline, never
    /// through the response.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let token = mint_opaque_token();

        let Some(account) = self.db.accounts().get_by_email(email).await? else {
            return Ok(());
        };

        let expires_at = unix_now() + RESET_TOKEN_DURATION_SECS;
        self.db
            .accounts()
            .set_reset_token(account.id, &token, expires_at)
            .await?;

        info!(account = %account.uuid, "password reset token issued");
        Ok(())
    }

    /// Consume a reset token: set the new password and revoke every
    /// session for the account. The token clears in the same statement
    /// that applies the new hash.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let now = unix_now();

        let Some(account) = self.db.accounts().get_by_reset_token(token).await? else {
            return Err(AuthError::TokenConsumed);
        };

        if account.reset_token_expires_at.is_none_or(|exp| exp <= now) {
            return Err(AuthError::TokenExpired);
        }

        let new_hash = hash_password(new_password);
        let consumed = self
            .db
            .accounts()
            .consume_reset_token(token, &new_hash, now)
            .await?;
        if !consumed {
            // Lost a race with a concurrent consume or reissue.
            return Err(AuthError::TokenConsumed);
        }

        // An attacker holding a session from before the reset loses it now.
        let revoked = self.db.sessions().delete_all_for_user(account.id).await?;
        info!(account = %account.uuid, revoked, "password reset confirmed");
        Ok(())
    }

    /// Consume an email-verification token.
    pub async fn confirm_email_verification(&self, token: &str) -> Result<(), AuthError> {
        let consumed = self.db.accounts().consume_verification_token(token).await?;
        if !consumed {
            return Err(AuthError::TokenConsumed);
        }
        Ok(())
    }
}
