//! Sink that buffers records in the remote list store.

use async_trait::async_trait;
use logbuf_core::ports::{ListStore, Sink};
use logbuf_core::{FlushPolicy, SinkError, SinkSignals};
use logbuf_file::FileTarget;
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;
use std::sync::MutexGuard;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Time-to-live refreshed on the buffer key by every append, so buffers
/// abandoned by a crashed producer don't accumulate server-side.
const BUFFER_KEY_TTL: Duration = Duration::from_secs(7200);

/// Advisory counters for records pushed and not yet drained.
#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    count: usize,
    size: usize,
}

/// Sink that delegates buffering to a remote list store and drains it to
/// a local file when a driver is attached.
///
/// Appends write through to the store synchronously and never emit a
/// threshold signal: a producer-only process with no registered driver
/// must not block on a flush handoff nobody services.
pub struct RemoteSink<S> {
    category: String,
    cache_key: String,
    store: S,
    target: FileTarget,
    pending: StdMutex<Pending>,
    policy: FlushPolicy,
    signals: SinkSignals,
    closed: AtomicBool,
    // Serializes the range-write-trim drain against concurrent flush
    // callers (driver vs. teardown).
    drain: Mutex<()>,
}

impl<S: ListStore> RemoteSink<S> {
    /// Sink draining the list under `cache_key` to `path`. Pass `None`
    /// for a producer-only sink that is never flushed locally.
    pub fn new(
        path: Option<PathBuf>,
        cache_key: impl Into<String>,
        policy: FlushPolicy,
        store: S,
    ) -> Self {
        let cache_key = cache_key.into();
        Self {
            category: cache_key.clone(),
            cache_key,
            store,
            target: FileTarget::new(path),
            pending: StdMutex::new(Pending::default()),
            policy,
            signals: SinkSignals::new(),
            closed: AtomicBool::new(false),
            drain: Mutex::new(()),
        }
    }

    /// The remote key records are buffered under.
    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    fn pending(&self) -> MutexGuard<'_, Pending> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<S> Sink for RemoteSink<S>
where
    S: ListStore + 'static,
{
    fn category(&self) -> &str {
        &self.category
    }

    fn policy(&self) -> &FlushPolicy {
        &self.policy
    }

    async fn append(&self, record: &str) -> Result<usize, SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }
        self.store.push(&self.cache_key, record).await?;
        if let Err(error) = self.store.expire(&self.cache_key, BUFFER_KEY_TTL).await {
            warn!(category = %self.category, error = %error, "ttl refresh failed");
        }
        let mut pending = self.pending();
        pending.count += 1;
        pending.size += record.len();
        Ok(record.len())
    }

    async fn flush(&self) -> Result<usize, SinkError> {
        let _drain = self.drain.lock().await;
        self.target.ensure_open().await?;
        // Every drain cycle is capped at flush_count records; whatever
        // piles up beyond that waits for the next cycle.
        let records = self
            .store
            .range(&self.cache_key, self.policy.flush_count)
            .await?;
        if records.is_empty() {
            return Ok(0);
        }
        let mut bytes = Vec::with_capacity(records.iter().map(String::len).sum());
        for record in &records {
            bytes.extend_from_slice(record.as_bytes());
        }
        self.target.write(&bytes).await?;
        // Trim exactly what was written; records pushed while the drain
        // ran keep their place for the next cycle.
        self.store.trim(&self.cache_key, records.len()).await?;
        let mut pending = self.pending();
        pending.count = pending.count.saturating_sub(records.len());
        pending.size = pending.size.saturating_sub(bytes.len());
        Ok(bytes.len())
    }

    fn take_flush_requests(&self) -> Option<mpsc::Receiver<()>> {
        self.signals.take_flush_requests()
    }

    fn stop_token(&self) -> CancellationToken {
        self.signals.stop_token()
    }

    async fn close(&self) -> Result<(), SinkError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.target.is_configured() {
            if let Err(error) = self.flush().await {
                warn!(category = %self.category, error = %error, "final flush failed");
            }
        }
        self.target.close().await;
        // Destructive: whatever is still buffered under the key is gone.
        if let Err(error) = self.store.delete(&self.cache_key).await {
            warn!(category = %self.category, error = %error, "buffer key delete failed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn pending_count(&self) -> usize {
        self.pending().count
    }

    fn pending_size(&self) -> usize {
        self.pending().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store::MemoryStore;

    fn drain_policy(flush_count: usize) -> FlushPolicy {
        FlushPolicy::new(
            flush_count,
            1024 * 1024,
            Duration::from_secs(60),
            Duration::from_secs(600),
        )
    }

    #[tokio::test]
    async fn append_pushes_remotely_and_refreshes_ttl() {
        let store = MemoryStore::new();
        let sink = RemoteSink::new(None, "logs:api", drain_policy(10), store.clone());

        assert_eq!(sink.append("one").await.unwrap(), 3);
        assert_eq!(sink.append("two").await.unwrap(), 3);

        assert_eq!(store.items("logs:api"), ["one", "two"]);
        assert_eq!(store.ttl("logs:api"), Some(BUFFER_KEY_TTL));
        assert_eq!(sink.pending_count(), 2);
        assert_eq!(sink.pending_size(), 6);
    }

    #[tokio::test]
    async fn flush_drains_to_file_and_trims_exactly_what_was_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote.log");
        let store = MemoryStore::new();
        let sink = RemoteSink::new(
            Some(path.clone()),
            "logs:api",
            drain_policy(3),
            store.clone(),
        );

        for record in ["a", "b", "c", "d", "e"] {
            sink.append(record).await.unwrap();
        }

        // Capped at flush_count records per cycle.
        assert_eq!(sink.flush().await.unwrap(), 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
        assert_eq!(store.items("logs:api"), ["d", "e"]);

        assert_eq!(sink.flush().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abcde");
        assert!(store.items("logs:api").is_empty());
        assert_eq!(sink.flush().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn racing_pushes_survive_the_trim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote.log");
        let store = MemoryStore::new();
        let sink = RemoteSink::new(
            Some(path.clone()),
            "logs:api",
            drain_policy(10),
            store.clone(),
        );

        sink.append("early").await.unwrap();
        // A push that lands after the range is computed but before the
        // trim runs must stay queued.
        store.push_after_next_range("logs:api", "late");

        assert_eq!(sink.flush().await.unwrap(), 5);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "early");
        assert_eq!(store.items("logs:api"), ["late"]);
    }

    #[tokio::test]
    async fn pathless_flush_reports_output_not_configured() {
        let store = MemoryStore::new();
        let sink = RemoteSink::new(None, "logs:api", drain_policy(10), store.clone());
        sink.append("kept").await.unwrap();

        assert!(matches!(
            sink.flush().await,
            Err(SinkError::OutputNotConfigured)
        ));
        // The remote buffer was not touched.
        assert_eq!(store.items("logs:api"), ["kept"]);
    }

    #[tokio::test]
    async fn failed_file_write_leaves_the_remote_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("remote.log");
        let store = MemoryStore::new();
        let sink = RemoteSink::new(Some(path), "logs:api", drain_policy(10), store.clone());
        sink.append("kept").await.unwrap();

        assert!(matches!(sink.flush().await, Err(SinkError::Backend { .. })));
        assert_eq!(store.items("logs:api"), ["kept"]);
        assert_eq!(sink.pending_count(), 1);
    }

    #[tokio::test]
    async fn close_deletes_the_buffer_key_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote.log");
        let store = MemoryStore::new();
        let sink = RemoteSink::new(
            Some(path.clone()),
            "logs:api",
            drain_policy(10),
            store.clone(),
        );
        sink.append("tail").await.unwrap();

        sink.close().await.unwrap();
        assert!(sink.is_closed());
        // The final flush drained the record before the key was deleted.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "tail");
        assert_eq!(store.delete_count("logs:api"), 1);

        sink.close().await.unwrap();
        assert_eq!(store.delete_count("logs:api"), 1);

        assert!(matches!(sink.append("late").await, Err(SinkError::Closed)));
    }
}
