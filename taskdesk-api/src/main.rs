//! # TaskDesk API Server
//!
//! REST API for a small team task manager: JWT authentication, admin and
//! member roles, tasks with checklists, dashboards and XLSX reports.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Authentication (register, login, profile) with bearer tokens
//! - Task management with checklist-driven progress and status
//! - Admin and member dashboards
//! - Spreadsheet exports of tasks and per-user workloads
//! - Profile image uploads served from `/uploads`
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskdesk JWT_SECRET=... cargo run -p taskdesk-api
//! ```

use anyhow::Context;
use taskdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdesk_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG and LOG_FORMAT
    dotenvy::dotenv().ok();

    // Initialize tracing; LOG_FORMAT=json switches to one JSON object per line
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "taskdesk_api=debug,tower_http=debug".into()),
    );

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        "TaskDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.uploads.dir.display()
            )
        })?;

    let addr = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
