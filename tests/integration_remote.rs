//! Registry lifecycle over a remote-buffered sink, driven by the
//! in-memory list-store model.

mod common;

use logbuf::{FlushPolicy, Registry, RemoteSink, Sink};
use logbuf_redis::test_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn driver_drains_the_remote_buffer_on_the_timer() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote.log");
    let registry = Registry::new();
    let store = MemoryStore::new();

    let policy = FlushPolicy::new(
        100,
        1_000_000,
        Duration::from_millis(50),
        Duration::from_secs(60),
    );
    let sink: Arc<dyn Sink> = Arc::new(RemoteSink::new(
        Some(path.clone()),
        "logs:worker",
        policy,
        store.clone(),
    ));
    let sink = registry.register("logs:worker", sink).await;

    sink.append("first|").await.unwrap();
    sink.append("second|").await.unwrap();

    let start = std::time::Instant::now();
    while !store.items("logs:worker").is_empty() && start.elapsed() < Duration::from_secs(3) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first|second|");
    assert!(store.items("logs:worker").is_empty());
    assert_eq!(sink.pending_count(), 0);
    registry.shutdown().await;
}

#[tokio::test]
async fn evicted_remote_sink_deletes_its_buffer_key() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remote.log");
    let registry = Registry::with_sweep_interval(Duration::from_millis(50));
    let store = MemoryStore::new();

    let policy = FlushPolicy::new(
        100,
        1_000_000,
        Duration::from_millis(40),
        Duration::from_millis(150),
    );
    let sink: Arc<dyn Sink> = Arc::new(RemoteSink::new(
        Some(path.clone()),
        "logs:ephemeral",
        policy,
        store.clone(),
    ));
    let sink = registry.register("logs:ephemeral", sink).await;
    sink.append("goodbye").await.unwrap();

    let start = std::time::Instant::now();
    while registry.contains("logs:ephemeral").await && start.elapsed() < Duration::from_secs(3) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(!registry.contains("logs:ephemeral").await);
    assert!(sink.is_closed());
    assert_eq!(store.delete_count("logs:ephemeral"), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "goodbye");
    registry.shutdown().await;
}

#[tokio::test]
async fn producer_only_sink_appends_without_a_driver() {
    common::init_tracing();
    let store = MemoryStore::new();
    let sink = RemoteSink::new(
        None,
        "logs:producer",
        FlushPolicy::default(),
        store.clone(),
    );

    // No registry, no driver: appends must still complete immediately,
    // even far past the count threshold.
    for i in 0..500 {
        sink.append(&format!("event-{i}")).await.unwrap();
    }
    assert_eq!(sink.pending_count(), 500);
    assert_eq!(store.items("logs:producer").len(), 500);
}
