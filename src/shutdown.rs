//! Process shutdown: signal handling and click pipeline teardown.

use std::time::Duration;

use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::domain::click_queue::ClickQueue;
use crate::domain::click_worker::{ClickWorkerPool, ShutdownReport};

/// Completes when the process receives Ctrl+C or, on Unix, SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is ignored rather than triggering an immediate shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}

/// Stops the click pipeline within `grace`.
///
/// Closes the queue so producers are rejected from here on, then cancels
/// the workers and waits for them. Events still buffered are discarded.
pub async fn stop_click_pipeline(
    queue: &ClickQueue,
    workers: ClickWorkerPool,
    grace: Duration,
) -> ShutdownReport {
    queue.close();
    let pending = queue.len();
    if pending > 0 {
        warn!(pending, "Discarding queued click events");
    }

    workers.shutdown(grace).await
}

/// Waits at most `grace` for a cancelled background task, then aborts it.
///
/// Returns `true` if the task finished on its own.
pub async fn join_or_abort(name: &str, mut handle: JoinHandle<()>, grace: Duration) -> bool {
    match timeout(grace, &mut handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!(task = name, error = %e, "Background task failed");
            true
        }
        Err(_) => {
            warn!(
                task = name,
                grace_ms = grace.as_millis() as u64,
                "Background task did not stop within grace period, aborting"
            );
            handle.abort();
            false
        }
    }
}
