pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod clock;
pub mod db;
pub mod jwt;
pub mod rate_limit;
pub mod secrets;

use api::create_api_router;
use auth::AuthService;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use secrets::Secrets;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Validated signing secrets (construct via `Secrets::validate`)
    pub secrets: Secrets,
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    // Secrets are validated before the app is built, so the codec
    // constructor cannot see an empty key here.
    let jwt = Arc::new(
        JwtConfig::new(config.secrets.access()).expect("secrets validated before app construction"),
    );

    let auth = AuthService::new(config.db.clone(), jwt.clone());

    Router::new().nest("/api", create_api_router(config.db.clone(), jwt, auth))
}

/// Run cleanup tasks and spawn the background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database) {
    cleanup::run_cleanup(db).await;
    cleanup::spawn_cleanup_scheduler(db.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    // Run cleanup tasks on startup
    init_cleanup(&config.db).await;

    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
