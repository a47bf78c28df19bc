//! Background workers that persist queued click events.
//!
//! A [`ClickWorkerPool`] runs a fixed number of long-lived tasks sharing one
//! [`ClickQueue`]. Each worker repeatedly dequeues an event and writes it
//! through a [`ClickRepository`]. A failed write is logged and the event is
//! dropped; it is never retried, so one bad write cannot stall the pool.
//!
//! Workers stop when the shared [`CancellationToken`] fires or when the queue
//! is closed and drained, whichever happens first. A stopped worker never
//! touches the repository again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_queue::{ClickQueue, Dequeued};
use crate::domain::repositories::ClickRepository;

/// Default number of click workers.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Lifecycle of a single worker. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopped,
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    QueueClosed,
}

/// Outcome of [`ClickWorkerPool::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that reached `Stopped` within the grace period.
    pub stopped: usize,
    /// Workers still running when the grace period elapsed, aborted.
    pub aborted: usize,
    /// Workers whose task ended in a panic before it could be joined.
    pub failed: usize,
}

impl ShutdownReport {
    /// Total workers accounted for. Equals the pool size.
    pub fn total(&self) -> usize {
        self.stopped + self.aborted + self.failed
    }
}

/// A fixed set of click workers draining one queue.
pub struct ClickWorkerPool {
    workers: JoinSet<(usize, StopReason)>,
    stopped: Vec<Arc<AtomicBool>>,
    shutdown: CancellationToken,
}

impl ClickWorkerPool {
    /// Spawns `count` workers and returns immediately.
    ///
    /// Must be called from within a Tokio runtime. A `count` of zero is
    /// raised to one.
    pub fn start<R>(
        count: usize,
        queue: Arc<ClickQueue>,
        repository: Arc<R>,
        shutdown: CancellationToken,
    ) -> Self
    where
        R: ClickRepository + ?Sized + 'static,
    {
        let count = count.max(1);
        let mut workers = JoinSet::new();
        let mut stopped = Vec::with_capacity(count);

        for worker_id in 0..count {
            let flag = Arc::new(AtomicBool::new(false));
            stopped.push(flag.clone());

            let queue = queue.clone();
            let repository = repository.clone();
            let token = shutdown.clone();

            workers.spawn(async move {
                let reason = run_click_worker(worker_id, &queue, repository.as_ref(), &token).await;
                flag.store(true, Ordering::Release);
                (worker_id, reason)
            });
        }

        info!(workers = count, capacity = queue.capacity(), "Click workers started");

        Self {
            workers,
            stopped,
            shutdown,
        }
    }

    /// Number of workers the pool was started with.
    pub fn size(&self) -> usize {
        self.stopped.len()
    }

    /// Current state of every worker, indexed by worker id.
    pub fn states(&self) -> Vec<WorkerState> {
        self.stopped
            .iter()
            .map(|flag| {
                if flag.load(Ordering::Acquire) {
                    WorkerState::Stopped
                } else {
                    WorkerState::Running
                }
            })
            .collect()
    }

    /// Number of workers not yet stopped.
    pub fn running(&self) -> usize {
        self.states()
            .into_iter()
            .filter(|state| *state == WorkerState::Running)
            .count()
    }

    /// Cancels every worker and waits at most `grace` for them to stop.
    ///
    /// Workers still running after `grace` are aborted, so this never waits
    /// longer than the grace period (plus scheduling latency).
    pub async fn shutdown(mut self, grace: Duration) -> ShutdownReport {
        info!(
            workers = self.size(),
            grace_ms = grace.as_millis() as u64,
            "Stopping click workers"
        );
        self.shutdown.cancel();

        let mut stopped = 0;
        let mut failed = 0;
        let drained = timeout(grace, async {
            while let Some(result) = self.workers.join_next().await {
                match result {
                    Ok((worker_id, reason)) => {
                        debug!(worker_id, ?reason, "Click worker joined");
                        stopped += 1;
                    }
                    Err(e) => {
                        error!(error = %e, "Click worker task failed");
                        failed += 1;
                    }
                }
            }
        })
        .await;

        let aborted = match drained {
            Ok(()) => 0,
            Err(_) => {
                let remaining = self.workers.len();
                warn!(
                    remaining,
                    "Grace period elapsed before click workers stopped, aborting"
                );
                self.workers.abort_all();
                remaining
            }
        };

        info!(stopped, aborted, failed, "Click worker shutdown complete");
        ShutdownReport {
            stopped,
            aborted,
            failed,
        }
    }
}

/// Runs one worker until cancellation or until the queue is closed and empty.
///
/// Cancellation is checked on every iteration before taking another event,
/// and never interrupts a write in progress.
pub async fn run_click_worker<R>(
    worker_id: usize,
    queue: &ClickQueue,
    repository: &R,
    shutdown: &CancellationToken,
) -> StopReason
where
    R: ClickRepository + ?Sized,
{
    debug!(worker_id, "Click worker running");

    let reason = loop {
        match queue.dequeue(shutdown).await {
            Dequeued::Event(event) => persist_click(worker_id, repository, event).await,
            Dequeued::Cancelled => break StopReason::Cancelled,
            Dequeued::Closed => break StopReason::QueueClosed,
        }
    };

    debug!(worker_id, ?reason, "Click worker stopped");
    reason
}

async fn persist_click<R>(worker_id: usize, repository: &R, event: ClickEvent)
where
    R: ClickRepository + ?Sized,
{
    let link_id = event.link_id();

    match repository.create(event.into_new_click()).await {
        Ok(click) => {
            counter!("clicks_persisted_total").increment(1);
            debug!(worker_id, link_id, click_id = click.id, "Click persisted");
        }
        Err(e) => {
            counter!("clicks_failed_total").increment(1);
            error!(
                worker_id,
                link_id,
                kind = e.kind(),
                error = %e,
                "Failed to persist click, dropping event"
            );
        }
    }
}
