mod common;

use common::{
    CapturedLogs, CountingRecorder, RecordingClickRepository, create_test_link,
    create_test_state, wait_until,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url_shortener::application::services::{AllocationSettings, ClientInfo};
use url_shortener::domain::click_event::ClickEvent;
use url_shortener::domain::click_queue::ClickQueue;
use url_shortener::domain::click_worker::{ClickWorkerPool, WorkerState};
use url_shortener::infrastructure::persistence::InMemoryStore;

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_event_persisted_once_regardless_of_worker_count() {
    const EVENTS: usize = 200;

    for workers in [1, 2, 5, 16] {
        let store = Arc::new(InMemoryStore::new());
        let link = create_test_link(&store, "pipe01", "https://example.com/").await;
        let queue = Arc::new(ClickQueue::new(EVENTS));

        for i in 0..EVENTS {
            let ip = Some(format!("10.0.0.{}", i % 250));
            assert!(queue.try_enqueue(ClickEvent::new(link.id, ip, None)));
        }

        let pool = ClickWorkerPool::start(
            workers,
            queue.clone(),
            store.clone(),
            CancellationToken::new(),
        );

        assert!(
            wait_until(Duration::from_secs(5), || store.clicks().len() == EVENTS).await,
            "only {} of {EVENTS} clicks persisted with {workers} workers",
            store.clicks().len()
        );

        let report = pool.shutdown(GRACE).await;
        assert_eq!(report.stopped, workers);
        assert_eq!(report.aborted, 0);

        let clicks = store.clicks();
        let ids: HashSet<i64> = clicks.iter().map(|c| c.id).collect();
        assert_eq!(clicks.len(), EVENTS);
        assert_eq!(ids.len(), EVENTS);
        assert!(clicks.iter().all(|c| c.link_id == link.id));
    }
}

#[tokio::test]
async fn test_capacity_two_keeps_first_two_events() {
    let queue = Arc::new(ClickQueue::new(2));
    let repo = Arc::new(RecordingClickRepository::new());

    let recorder = CountingRecorder::new();
    let logs = CapturedLogs::new();

    // A, B, C, D in order, with no worker draining yet.
    let accepted: Vec<bool> = logs.capture(|| {
        metrics::with_local_recorder(&recorder, || {
            [1, 2, 3, 4]
                .into_iter()
                .map(|link_id| queue.try_enqueue(ClickEvent::new(link_id, None, None)))
                .collect()
        })
    });

    assert_eq!(accepted, vec![true, true, false, false]);
    assert_eq!(queue.len(), 2);
    assert_eq!(recorder.counter("clicks_enqueued_total"), 2);
    assert_eq!(recorder.counter("clicks_dropped_total"), 2);
    assert_eq!(logs.count("Click queue is full, dropping click event"), 2);
    assert!(logs.contents().contains("WARN"));

    let pool = ClickWorkerPool::start(1, queue.clone(), repo.clone(), CancellationToken::new());

    assert!(wait_until(Duration::from_secs(2), || repo.len() == 2).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let report = pool.shutdown(GRACE).await;
    assert_eq!(report.stopped, 1);
    assert_eq!(repo.link_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_enqueue_never_blocks_when_full() {
    let queue = ClickQueue::new(10);

    let started = Instant::now();
    let dropped = (0..10_000)
        .filter(|_| !queue.try_enqueue(ClickEvent::new(1, None, None)))
        .count();

    assert_eq!(dropped, 10_000 - 10);
    assert_eq!(queue.len(), 10);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_no_writes_after_workers_stopped() {
    let queue = Arc::new(ClickQueue::new(64));
    let repo = Arc::new(RecordingClickRepository::new());
    let pool = ClickWorkerPool::start(3, queue.clone(), repo.clone(), CancellationToken::new());

    for _ in 0..10 {
        assert!(queue.try_enqueue(ClickEvent::new(7, None, None)));
    }
    assert!(wait_until(Duration::from_secs(2), || repo.len() == 10).await);

    assert_eq!(pool.states(), vec![WorkerState::Running; 3]);
    let report = pool.shutdown(GRACE).await;
    assert_eq!(report.stopped, 3);
    repo.stopped.store(true, Ordering::SeqCst);

    // The queue is still open, but nobody consumes it anymore.
    for _ in 0..5 {
        assert!(queue.try_enqueue(ClickEvent::new(7, None, None)));
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(repo.calls_after_stop.load(Ordering::SeqCst), 0);
    assert_eq!(repo.len(), 10);
    assert_eq!(queue.len(), 5);
}

#[tokio::test]
async fn test_idle_workers_stop_well_within_grace() {
    let queue = Arc::new(ClickQueue::new(8));
    let repo = Arc::new(RecordingClickRepository::new());
    let pool = ClickWorkerPool::start(8, queue, repo, CancellationToken::new());

    let started = Instant::now();
    let report = pool.shutdown(GRACE).await;

    assert_eq!(report.stopped, 8);
    assert_eq!(report.aborted, 0);
    assert!(started.elapsed() < GRACE);
}

#[tokio::test]
async fn test_cancellation_lets_write_in_progress_finish() {
    let gate = Arc::new(Semaphore::new(0));
    let queue = Arc::new(ClickQueue::new(8));
    let repo = Arc::new(RecordingClickRepository::gated(gate.clone()));
    let pool = ClickWorkerPool::start(1, queue.clone(), repo.clone(), CancellationToken::new());

    assert!(queue.try_enqueue(ClickEvent::new(3, None, None)));
    assert!(queue.try_enqueue(ClickEvent::new(4, None, None)));
    assert!(wait_until(Duration::from_secs(2), || repo.attempts.load(Ordering::SeqCst) == 1).await);

    let shutdown = tokio::spawn(pool.shutdown(GRACE));
    tokio::time::sleep(Duration::from_millis(50)).await;
    gate.add_permits(1);

    let report = shutdown.await.unwrap();

    assert_eq!(report.stopped, 1);
    assert_eq!(report.aborted, 0);
    // The write in flight completed; the buffered event was left behind.
    assert_eq!(repo.link_ids(), vec![3]);
    assert_eq!(repo.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stuck_write_is_aborted_after_grace() {
    let gate = Arc::new(Semaphore::new(0));
    let queue = Arc::new(ClickQueue::new(8));
    let repo = Arc::new(RecordingClickRepository::gated(gate));
    let pool = ClickWorkerPool::start(2, queue.clone(), repo.clone(), CancellationToken::new());

    assert!(queue.try_enqueue(ClickEvent::new(5, None, None)));
    assert!(wait_until(Duration::from_secs(2), || repo.attempts.load(Ordering::SeqCst) == 1).await);

    let grace = Duration::from_millis(200);
    let started = Instant::now();
    let report = pool.shutdown(grace).await;

    assert_eq!(report.stopped, 1);
    assert_eq!(report.aborted, 1);
    assert!(started.elapsed() < grace + Duration::from_secs(1));
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_redirects_are_counted_in_stats() {
    let store = Arc::new(InMemoryStore::new());
    let state = create_test_state(store.clone(), 100, AllocationSettings::default());

    let link = state
        .link_service
        .create_unique_link("https://example.com/landing")
        .await
        .unwrap();

    for i in 0..12 {
        let client = ClientInfo {
            ip: Some(format!("192.0.2.{i}")),
            user_agent: Some("integration-test".to_string()),
        };
        let resolved = state.redirect_service.resolve(&link.code, client).await.unwrap();
        assert_eq!(resolved.long_url, "https://example.com/landing");
    }
    assert_eq!(state.click_queue.len(), 12);

    let pool = ClickWorkerPool::start(
        3,
        state.click_queue.clone(),
        store.clone(),
        CancellationToken::new(),
    );
    assert!(wait_until(Duration::from_secs(2), || store.clicks().len() == 12).await);
    pool.shutdown(GRACE).await;

    let stats = state.stats_service.get_link_stats(&link.code).await.unwrap();
    assert_eq!(stats.total_clicks, 12);
    assert!(
        store
            .clicks()
            .iter()
            .all(|c| c.user_agent.as_deref() == Some("integration-test"))
    );
}

#[tokio::test]
async fn test_closed_queue_is_drained_before_workers_stop() {
    let store = Arc::new(InMemoryStore::new());
    let link = create_test_link(&store, "drain1", "https://example.com/").await;
    let queue = Arc::new(ClickQueue::new(16));

    for _ in 0..16 {
        assert!(queue.try_enqueue(ClickEvent::new(link.id, None, None)));
    }
    queue.close();
    assert!(!queue.try_enqueue(ClickEvent::new(link.id, None, None)));

    let pool = ClickWorkerPool::start(4, queue.clone(), store.clone(), CancellationToken::new());

    assert!(wait_until(Duration::from_secs(2), || pool.running() == 0).await);
    assert_eq!(store.clicks().len(), 16);

    let report = pool.shutdown(GRACE).await;
    assert_eq!(report.stopped, 4);
}
