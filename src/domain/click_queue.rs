//! Bounded click event queue shared by redirect producers and click workers.
//!
//! Producers call [`ClickQueue::try_enqueue`], which never waits: when the
//! buffer is full the event is dropped and `false` is returned. Consumers call
//! [`ClickQueue::dequeue`], which waits for an event, for the queue to be
//! closed and drained, or for cancellation, whichever comes first.
//!
//! The queue is built on a bounded [`mpsc`] channel. The single receiver sits
//! behind an async mutex so any number of workers can share it; whichever
//! worker holds the lock when an event arrives takes it.
//!
//! Admission and [`ClickQueue::close`] are serialized by a reader-writer
//! lock: an event accepted by `try_enqueue` is in the buffer before `close`
//! returns, so a worker draining a closed queue always sees it.

use metrics::counter;
use parking_lot::RwLock;
use tokio::sync::{Mutex, mpsc, mpsc::error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;

/// Default number of buffered click events.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Outcome of a [`ClickQueue::dequeue`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued {
    /// The next buffered event.
    Event(ClickEvent),
    /// The queue was closed and nothing is left to drain.
    Closed,
    /// The caller's cancellation token fired.
    Cancelled,
}

/// Bounded FIFO of [`ClickEvent`]s, safe for concurrent producers and consumers.
///
/// Constructed once at startup and shared behind an `Arc` by the redirect
/// path and the worker pool.
pub struct ClickQueue {
    sender: mpsc::Sender<ClickEvent>,
    receiver: Mutex<mpsc::Receiver<ClickEvent>>,
    closed: CancellationToken,
    admission: RwLock<()>,
}

impl ClickQueue {
    /// Creates a queue holding at most `capacity` events.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        Self {
            sender,
            receiver: Mutex::new(receiver),
            closed: CancellationToken::new(),
            admission: RwLock::new(()),
        }
    }

    /// Offers an event without waiting.
    ///
    /// Returns `true` if the event was buffered. Returns `false` if the queue
    /// is full or closed; the event is dropped and the click goes uncounted.
    pub fn try_enqueue(&self, event: ClickEvent) -> bool {
        let _admitting = self.admission.read();

        if self.closed.is_cancelled() {
            debug!(link_id = event.link_id(), "Click queue closed, rejecting event");
            return false;
        }

        match self.sender.try_send(event) {
            Ok(()) => {
                counter!("clicks_enqueued_total").increment(1);
                true
            }
            Err(TrySendError::Full(event)) => {
                counter!("clicks_dropped_total").increment(1);
                warn!(
                    link_id = event.link_id(),
                    capacity = self.capacity(),
                    "Click queue is full, dropping click event"
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                debug!(link_id = event.link_id(), "Click channel closed, rejecting event");
                false
            }
        }
    }

    /// Waits for the next event.
    ///
    /// Cancellation is checked before anything else, so a cancelled caller
    /// never receives another event. After [`Self::close`], buffered events
    /// are still handed out until the queue is empty, then
    /// [`Dequeued::Closed`] is returned.
    pub async fn dequeue(&self, shutdown: &CancellationToken) -> Dequeued {
        if shutdown.is_cancelled() {
            return Dequeued::Cancelled;
        }

        let mut receiver = tokio::select! {
            biased;
            () = shutdown.cancelled() => return Dequeued::Cancelled,
            receiver = self.receiver.lock() => receiver,
        };

        tokio::select! {
            biased;
            () = shutdown.cancelled() => Dequeued::Cancelled,
            event = receiver.recv() => event.map_or(Dequeued::Closed, Dequeued::Event),
            () = self.closed.cancelled() => match receiver.try_recv() {
                Ok(event) => Dequeued::Event(event),
                Err(_) => Dequeued::Closed,
            },
        }
    }

    /// Stops admitting new events. Already buffered events remain available.
    ///
    /// Waits for in-flight `try_enqueue` calls to finish first.
    pub fn close(&self) {
        let _closing = self.admission.write();
        if !self.closed.is_cancelled() {
            debug!(pending = self.len(), "Closing click queue");
        }
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

impl Default for ClickQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
