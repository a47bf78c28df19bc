//! Periodic reachability monitor for stored long URLs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::repositories::LinkRepository;
use crate::domain::url_probe::UrlProbe;
use crate::error::AppError;

/// A link whose reachability flipped since the previous check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub link_id: i64,
    pub code: String,
    pub long_url: String,
    pub reachable: bool,
}

/// Checks every stored link on a fixed interval and reports transitions.
///
/// The first observation of a link only records its state. Afterwards a
/// change in either direction is logged once.
pub struct LinkMonitor<L: LinkRepository + ?Sized, P: UrlProbe + ?Sized> {
    link_repository: Arc<L>,
    probe: Arc<P>,
    interval: Duration,
    last_seen: HashMap<i64, bool>,
}

impl<L: LinkRepository + ?Sized, P: UrlProbe + ?Sized> LinkMonitor<L, P> {
    pub fn new(link_repository: Arc<L>, probe: Arc<P>, interval: Duration) -> Self {
        Self {
            link_repository,
            probe,
            interval,
            last_seen: HashMap::new(),
        }
    }

    /// Probes all links once and returns those whose state changed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if links cannot be listed.
    pub async fn check_all(&mut self) -> Result<Vec<StatusChange>, AppError> {
        let links = self.link_repository.list_all().await?;
        let mut changes = Vec::new();

        for link in links {
            let reachable = self.probe.is_reachable(&link.long_url).await;

            match self.last_seen.insert(link.id, reachable) {
                Some(previous) if previous != reachable => {
                    if reachable {
                        info!(code = %link.code, url = %link.long_url, "Link is reachable again");
                    } else {
                        warn!(code = %link.code, url = %link.long_url, "Link became unreachable");
                    }
                    changes.push(StatusChange {
                        link_id: link.id,
                        code: link.code,
                        long_url: link.long_url,
                        reachable,
                    });
                }
                _ => {}
            }
        }

        Ok(changes)
    }

    /// Runs checks until `shutdown` is cancelled.
    ///
    /// Cancellation also interrupts a pass in progress, so stopping never
    /// waits on outstanding probes. A failed pass is logged and retried on
    /// the next tick.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Link monitor started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let outcome = tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => {
                            info!("Link monitor pass interrupted by shutdown");
                            break;
                        }
                        outcome = self.check_all() => outcome,
                    };

                    match outcome {
                        Ok(changes) if !changes.is_empty() => {
                            info!(changed = changes.len(), "Link monitor pass complete");
                        }
                        Ok(_) => {}
                        Err(e) => error!(error = %e, kind = e.kind(), "Link monitor pass failed"),
                    }
                }
            }
        }

        info!("Link monitor stopped");
    }
}
