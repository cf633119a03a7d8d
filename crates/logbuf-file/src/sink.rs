//! Buffered local-file sink.

use crate::target::FileTarget;
use async_trait::async_trait;
use logbuf_core::ports::Sink;
use logbuf_core::{FlushPolicy, RecordBuffer, SinkError, SinkSignals};
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;
use std::sync::MutexGuard;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Sink that buffers records in memory and appends them to a local file.
///
/// The file path doubles as the category key. Appends and drains contend
/// on the buffer lock only; the file handle opens lazily on the first
/// flush. An appender that crosses a flush threshold signals the driver
/// and may wait until the request is accepted.
pub struct FileSink {
    category: String,
    target: FileTarget,
    buffer: StdMutex<RecordBuffer>,
    policy: FlushPolicy,
    signals: SinkSignals,
    closed: AtomicBool,
    // Serializes the snapshot-write-consume drain against concurrent
    // flush callers (driver vs. teardown).
    drain: Mutex<()>,
}

impl FileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, policy: FlushPolicy) -> Self {
        let path = path.into();
        Self {
            category: path.display().to_string(),
            target: FileTarget::new(Some(path)),
            buffer: StdMutex::new(RecordBuffer::new()),
            policy,
            signals: SinkSignals::new(),
            closed: AtomicBool::new(false),
            drain: Mutex::new(()),
        }
    }

    fn buffer(&self) -> MutexGuard<'_, RecordBuffer> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl Sink for FileSink {
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
        let over_threshold = {
            let mut buffer = self.buffer();
            buffer.push(record.as_bytes());
            buffer.count() >= self.policy.flush_count || buffer.size() >= self.policy.flush_size
        };
        if over_threshold {
            // Signalled outside the buffer lock; waits for the driver
            // when a request is already pending.
            self.signals.request_flush().await;
        }
        Ok(record.len())
    }

    async fn flush(&self) -> Result<usize, SinkError> {
        let _drain = self.drain.lock().await;
        self.target.ensure_open().await?;
        let (count, bytes) = self.buffer().snapshot(None);
        if count == 0 {
            return Ok(0);
        }
        self.target.write(&bytes).await?;
        // Only the written prefix is consumed; records appended while the
        // write was in flight stay pending for the next cycle.
        self.buffer().consume(count);
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
        if let Err(error) = self.flush().await {
            warn!(category = %self.category, error = %error, "final flush failed");
        }
        self.target.close().await;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn pending_count(&self) -> usize {
        self.buffer().count()
    }

    fn pending_size(&self) -> usize {
        self.buffer().size()
    }
}
