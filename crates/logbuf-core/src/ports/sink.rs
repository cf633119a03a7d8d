//! The polymorphic sink capability set.

use crate::config::FlushPolicy;
use crate::error::SinkError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One buffered log destination serving a single category.
///
/// Implementations own their buffer and backend writer exclusively; the
/// registry and the per-category driver share the sink through an
/// `Arc<dyn Sink>`. No two sinks share a buffer.
#[async_trait]
pub trait Sink: Send + Sync {
    /// The category key this sink serves. Immutable after creation.
    fn category(&self) -> &str;

    /// The flush/expire policy the sink was built with.
    fn policy(&self) -> &FlushPolicy;

    /// Buffer one record, returning its byte length.
    ///
    /// Fails with [`SinkError::Closed`] once the sink was closed. Crossing
    /// a flush threshold may wait until the driver accepts the request.
    async fn append(&self, record: &str) -> Result<usize, SinkError>;

    /// Drain pending records to the backing store, returning the bytes
    /// written.
    ///
    /// `Ok(0)` when nothing is pending; repeated no-op calls are fine.
    /// A failed write retains every record for the next cycle.
    async fn flush(&self) -> Result<usize, SinkError>;

    /// Hand over the threshold-signal receiver; `None` after the first
    /// call.
    fn take_flush_requests(&self) -> Option<mpsc::Receiver<()>>;

    /// Token cancelled to request a graceful stop of the driving loop.
    fn stop_token(&self) -> CancellationToken;

    /// Flush what can be flushed, then release the backend writer.
    ///
    /// Monotonic and idempotent: a second close is an error-free no-op
    /// and does not repeat destructive side effects.
    async fn close(&self) -> Result<(), SinkError>;

    /// Whether [`close`](Sink::close) ran.
    fn is_closed(&self) -> bool;

    /// Number of records currently buffered.
    fn pending_count(&self) -> usize;

    /// Byte length of the records currently buffered.
    fn pending_size(&self) -> usize;
}
