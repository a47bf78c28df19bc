//! Service runtime setup.
//!
//! Handles the database connection, migrations, worker spawning, the link
//! monitor and the shutdown sequence.

use crate::application::services::LinkMonitor;
use crate::config::Config;
use crate::domain::click_queue::ClickQueue;
use crate::domain::click_worker::ClickWorkerPool;
use crate::infrastructure::http_probe::HttpProbe;
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::shutdown::{join_or_abort, shutdown_signal, stop_click_pipeline};
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Connects to PostgreSQL using the pool settings from `config`.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Builds the shared services over PostgreSQL repositories.
pub fn build_state(pool: Arc<PgPool>, queue: Arc<ClickQueue>, config: &Config) -> AppState {
    AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool)),
        queue,
        config.allocation_settings(),
    )
}

/// Runs the service until a shutdown signal arrives.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Click queue and worker pool
/// - Link health monitor (unless disabled)
///
/// On SIGINT/SIGTERM the queue is closed, workers are cancelled and given
/// the configured grace period, then the database pool is closed.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - The monitor's HTTP client cannot be built
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let queue = Arc::new(ClickQueue::new(config.click_queue_capacity));
    let state = build_state(pool.clone(), queue.clone(), &config);
    let shutdown = CancellationToken::new();

    let workers = ClickWorkerPool::start(
        config.click_worker_count,
        queue.clone(),
        Arc::new(PgClickRepository::new(pool.clone())),
        shutdown.child_token(),
    );

    let monitor = match config.monitor_interval() {
        Some(interval) => {
            let probe = HttpProbe::new(config.monitor_timeout())
                .context("Failed to build link monitor HTTP client")?;
            let monitor = LinkMonitor::new(
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(probe),
                interval,
            );
            Some(tokio::spawn(monitor.run(shutdown.child_token())))
        }
        None => {
            tracing::info!("Link monitor disabled");
            None
        }
    };

    let links = state.link_service.count_links().await?;
    tracing::info!(links, "Service ready");

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, terminating gracefully...");

    let report = stop_click_pipeline(&queue, workers, config.shutdown_grace()).await;
    shutdown.cancel();

    if let Some(handle) = monitor {
        join_or_abort("link_monitor", handle, config.shutdown_grace()).await;
    }

    pool.close().await;
    tracing::info!(
        stopped = report.stopped,
        aborted = report.aborted,
        failed = report.failed,
        "Shutdown complete"
    );

    Ok(())
}
