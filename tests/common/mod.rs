#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use url_shortener::application::services::AllocationSettings;
use url_shortener::domain::click_queue::ClickQueue;
use url_shortener::domain::entities::{Click, Link, NewClick, NewLink};
use url_shortener::domain::repositories::{ClickRepository, LinkRepository};
use url_shortener::error::AppError;
use url_shortener::infrastructure::persistence::InMemoryStore;
use url_shortener::state::AppState;

/// Click repository that records every call and can hold writes until released.
///
/// Set `stopped` to make any later `create` call fail the test run: it is
/// counted in `calls_after_stop`.
#[derive(Default)]
pub struct RecordingClickRepository {
    pub created: Mutex<Vec<NewClick>>,
    /// `create` calls entered, including ones still waiting on the gate.
    pub attempts: AtomicUsize,
    pub calls_after_stop: AtomicUsize,
    pub stopped: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create` waits for a permit from `gate` before recording.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn link_ids(&self) -> Vec<i64> {
        self.created.lock().iter().map(|c| c.link_id).collect()
    }

    pub fn len(&self) -> usize {
        self.created.lock().len()
    }
}

#[async_trait]
impl ClickRepository for RecordingClickRepository {
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.stopped.load(Ordering::SeqCst) {
            self.calls_after_stop.fetch_add(1, Ordering::SeqCst);
        }

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let mut created = self.created.lock();
        created.push(new_click.clone());

        Ok(Click::new(
            created.len() as i64,
            new_click.link_id,
            new_click.clicked_at,
            new_click.user_agent,
            new_click.ip,
        ))
    }

    async fn count_by_link_id(&self, link_id: i64) -> Result<i64, AppError> {
        Ok(self
            .created
            .lock()
            .iter()
            .filter(|c| c.link_id == link_id)
            .count() as i64)
    }
}

/// Metrics recorder that keeps counter totals by name.
///
/// Install for a scope with `metrics::with_local_recorder`.
#[derive(Default)]
pub struct CountingRecorder {
    counters: Mutex<HashMap<String, Arc<AtomicU64>>>,
}

impl CountingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .get(name)
            .map_or(0, |value| value.load(Ordering::SeqCst))
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let value = self
            .counters
            .lock()
            .entry(key.name().to_string())
            .or_default()
            .clone();
        Counter::from_arc(value)
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Log sink for a `tracing_subscriber::fmt` subscriber scoped to one test.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with a subscriber writing plain text into this sink.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Polls `condition` until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

pub async fn create_test_link(store: &InMemoryStore, code: &str, url: &str) -> Link {
    LinkRepository::create(
        store,
        NewLink {
            code: code.to_string(),
            long_url: url.to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn new_click(link_id: i64) -> NewClick {
    NewClick {
        link_id,
        clicked_at: Utc::now(),
        user_agent: None,
        ip: None,
    }
}

/// Services over one in-memory store.
pub fn create_test_state(
    store: Arc<InMemoryStore>,
    queue_capacity: usize,
    allocation: AllocationSettings,
) -> AppState {
    AppState::new(
        store.clone(),
        store,
        Arc::new(ClickQueue::new(queue_capacity)),
        allocation,
    )
}
