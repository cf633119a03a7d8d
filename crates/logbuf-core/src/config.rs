//! Flush-policy configuration shared by every sink variant.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a sink's buffered records are pushed to the backing store, and
/// when an idle category is evicted.
///
/// Immutable after construction; the sink and its registry entry each
/// carry a copy so the sweeper never has to call back into the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushPolicy {
    /// Flush once this many records are buffered.
    pub flush_count: usize,
    /// Flush once the buffered records reach this many bytes.
    pub flush_size: usize,
    /// Flush on this cadence even when no threshold was crossed.
    pub flush_duration: Duration,
    /// Evict the category after this long without a successful flush.
    pub expire_duration: Duration,
}

impl FlushPolicy {
    /// Create a policy with every knob explicit.
    #[must_use]
    pub const fn new(
        flush_count: usize,
        flush_size: usize,
        flush_duration: Duration,
        expire_duration: Duration,
    ) -> Self {
        Self {
            flush_count,
            flush_size,
            flush_duration,
            expire_duration,
        }
    }

    /// Set the record-count threshold.
    #[must_use]
    pub const fn with_flush_count(mut self, flush_count: usize) -> Self {
        self.flush_count = flush_count;
        self
    }

    /// Set the byte-size threshold.
    #[must_use]
    pub const fn with_flush_size(mut self, flush_size: usize) -> Self {
        self.flush_size = flush_size;
        self
    }

    /// Set the periodic flush cadence.
    #[must_use]
    pub const fn with_flush_duration(mut self, flush_duration: Duration) -> Self {
        self.flush_duration = flush_duration;
        self
    }

    /// Set the idle-eviction window.
    #[must_use]
    pub const fn with_expire_duration(mut self, expire_duration: Duration) -> Self {
        self.expire_duration = expire_duration;
        self
    }
}

impl Default for FlushPolicy {
    /// Defaults used by the default file sink: flush at 200 records or
    /// 10 KiB, every 5 seconds, evict after 5 idle minutes.
    fn default() -> Self {
        Self {
            flush_count: 200,
            flush_size: 10 * 1024,
            flush_duration: Duration::from_secs(5),
            expire_duration: Duration::from_secs(300),
        }
    }
}
