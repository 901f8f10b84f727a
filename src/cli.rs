//! CLI argument parsing, validation, and startup helpers.

use crate::db::Database;
use crate::secrets::{ACCESS_TOKEN_SECRET_VAR, Secrets};
use clap::Parser;
use tracing::{error, info};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Tradepost",
    about = "Account and session service for the Tradepost marketplace"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7180")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tradepost.db")]
    pub database: String,

    /// Path to file containing the access token secret. Prefer using the
    /// ACCESS_TOKEN_SECRET env var instead
    #[arg(long)]
    pub secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load and validate signing secrets from the environment or a file.
/// Returns None and logs an error if any required secret is missing;
/// the caller must not bind a listener in that case.
pub fn load_secrets(secret_file: Option<&str>) -> Option<Secrets> {
    let access = if let Ok(secret) = std::env::var(ACCESS_TOKEN_SECRET_VAR) {
        // Clear the environment variable to prevent leaking.
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(ACCESS_TOKEN_SECRET_VAR) };
        Some(secret)
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        None
    };

    match Secrets::validate(access) {
        Ok(secrets) => Some(secrets),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
