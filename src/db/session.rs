//! Session storage: one row per authenticated device.
//!
//! The token column is the lookup key and is unique system-wide. An
//! account owns zero or many concurrent rows; deleting them is the only
//! way to revoke a login before its natural expiry.

use sqlx::sqlite::SqlitePool;

use crate::jwt::mint_opaque_token;

/// Attempts before a token collision is surfaced to the caller. With
/// 256-bit random tokens a single retry is already unreachable.
const CREATE_ATTEMPTS: u32 = 3;

/// An active session record.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub expires_at: i64,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    token: String,
    user_id: i64,
    expires_at: i64,
    created_at: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Store for managing session records.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new session for an account, generating a fresh opaque
    /// token. A collision with an existing token regenerates and retries
    /// instead of surfacing the constraint error.
    pub async fn create(
        &self,
        user_id: i64,
        now: i64,
        ttl_secs: i64,
    ) -> Result<Session, sqlx::Error> {
        let expires_at = now + ttl_secs;
        let mut attempt = 0;
        loop {
            let token = mint_opaque_token();
            let result = sqlx::query(
                "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&token)
            .bind(user_id)
            .bind(expires_at)
            .bind(now)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => {
                    return Ok(Session {
                        id: done.last_insert_rowid(),
                        token,
                        user_id,
                        expires_at,
                        created_at: now,
                    });
                }
                Err(e) => {
                    attempt += 1;
                    let collision = e
                        .as_database_error()
                        .is_some_and(|db| db.is_unique_violation());
                    if !collision || attempt >= CREATE_ATTEMPTS {
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Get a session by its token. Callers treat an expired row the same
    /// as a missing one.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, token, user_id, expires_at, created_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Session::from))
    }

    /// Delete a session by its token (single-device logout). Idempotent;
    /// returns the number of rows removed.
    pub async fn delete_by_token(&self, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every session for an account in one statement (logout
    /// everywhere / forced revocation). Returns the number removed.
    pub async fn delete_all_for_user(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count non-expired sessions for an account.
    pub async fn count_active_for_user(&self, user_id: i64, now: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE user_id = ? AND expires_at > ?")
                .bind(user_id)
                .bind(now)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    /// List non-expired sessions for an account, newest first.
    pub async fn list_active_for_user(
        &self,
        user_id: i64,
        now: i64,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, token, user_id, expires_at, created_at FROM sessions
             WHERE user_id = ? AND expires_at > ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Session::from).collect())
    }

    /// Delete all expired sessions. Runs from the cleanup scheduler,
    /// never inline with a request.
    pub async fn delete_expired(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
