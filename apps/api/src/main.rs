//! # Tienda POS API Server
//!
//! ## Startup Sequence
//! ```text
//! 1. Initialize tracing (RUST_LOG, default info,tienda=debug,sqlx=warn)
//! 2. Load ApiConfig from TIENDA_* environment variables
//! 3. Open the database (WAL) and run migrations
//! 4. Build AppState (pool + shared product locks + coordinator)
//! 5. Serve until SIGINT/SIGTERM, then close the pool
//! ```

use anyhow::Context;
use tienda_api::{create_app, ApiConfig, AppState};
use tienda_db::Database;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Tienda POS API server");

    let config = ApiConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        db_path = %config.db_path,
        max_connections = config.db_max_connections,
        lock_timeout_ms = config.lock_timeout.as_millis() as u64,
        checkout_retries = config.checkout_retries,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("failed to open database")?;

    let state = AppState::new(db.clone(), &config);
    let app = create_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shut down gracefully");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tienda_db=trace` - Trace one crate
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tienda=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
