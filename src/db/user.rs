//! Account storage: credentials plus the single-use token columns.
//!
//! Verification and reset tokens live directly on the account row, so at
//! most one of each kind exists per account and issuing a new one
//! overwrites (permanently invalidates) the previous value. Consuming a
//! token clears it in the same statement that applies its effect.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub uuid: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub verification_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    uuid: String,
    email: String,
    password_hash: String,
    verified: i32,
    verification_token: Option<String>,
    reset_token: Option<String>,
    reset_token_expires_at: Option<i64>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            email: row.email,
            password_hash: row.password_hash,
            verified: row.verified != 0,
            verification_token: row.verification_token,
            reset_token: row.reset_token,
            reset_token_expires_at: row.reset_token_expires_at,
        }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, uuid, email, password_hash, verified, verification_token, reset_token, reset_token_expires_at";

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new unverified account. Returns the account ID.
    pub async fn create(
        &self,
        uuid: &str,
        email: &str,
        password_hash: &str,
        verification_token: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (uuid, email, password_hash, verified, verification_token) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(uuid)
        .bind(email)
        .bind(password_hash)
        .bind(verification_token)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get an account by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", ACCOUNT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Account::from))
    }

    /// Get an account by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE uuid = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    /// Get an account by its live reset token.
    pub async fn get_by_reset_token(&self, token: &str) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE reset_token = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    /// Store a new reset token, overwriting any outstanding one.
    pub async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET reset_token = ?, reset_token_expires_at = ? WHERE id = ?")
            .bind(token)
            .bind(expires_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store a new verification token, overwriting any outstanding one.
    pub async fn set_verification_token(&self, id: i64, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET verification_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Consume a reset token: apply the new password hash and clear the
    /// token in one statement, guarded by the token value and its expiry.
    /// Returns false if the token was already consumed or superseded.
    pub async fn consume_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, reset_token = NULL, reset_token_expires_at = NULL
             WHERE reset_token = ? AND reset_token_expires_at > ?",
        )
        .bind(new_password_hash)
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume a verification token: mark the account verified and clear
    /// the token in one statement. Returns false if the token was already
    /// consumed or superseded.
    pub async fn consume_verification_token(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET verified = 1, verification_token = NULL WHERE verification_token = ?",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear reset tokens whose expiry has passed without consumption.
    pub async fn clear_expired_reset_tokens(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = NULL, reset_token_expires_at = NULL
             WHERE reset_token IS NOT NULL AND reset_token_expires_at <= ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
