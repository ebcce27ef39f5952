use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gatehouse_db::{CredentialStore, PgStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_api::auth::password::prime_dummy_hash;
use gatehouse_api::background::session_reaper;
use gatehouse_api::config::ServerConfig;
use gatehouse_api::provision::ensure_bootstrap_admin;
use gatehouse_api::routes;
use gatehouse_api::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Fatal startup error");
        eprintln!("gatehouse-api: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        cookie = %config.session.cookie_name,
        session_lifetime_secs = config.session.lifetime.num_seconds(),
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = gatehouse_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    gatehouse_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    gatehouse_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let store: Arc<dyn CredentialStore> = Arc::new(PgStore::new(pool));

    // --- Password verifier ---
    let primed = tokio::task::spawn_blocking(prime_dummy_hash)
        .await
        .context("Failed to prepare password verifier")?;
    if !primed {
        tracing::warn!("Dummy password hash unavailable; unknown-user logins will answer faster");
    }

    // --- Bootstrap admin ---
    if let Some(admin) = &config.bootstrap_admin {
        ensure_bootstrap_admin(store.as_ref(), admin)
            .await
            .context("Failed to provision bootstrap admin")?;
    }

    // --- Session reaper ---
    let reaper_cancel = CancellationToken::new();
    let reaper_handle = tokio::spawn(session_reaper::run(
        Arc::clone(&store),
        Duration::from_secs(config.session.reap_interval_secs),
        reaper_cancel.clone(),
    ));

    // --- App ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let title = config.app_title.clone();
    let state = AppState::new(store, config);
    let app = routes::build_app(state);

    // --- Start server ---
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, title = %title, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    tracing::info!("Session reaper stopped");

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
