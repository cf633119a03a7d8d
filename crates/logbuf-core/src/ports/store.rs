//! The remote list-store capability the remote sink drains.

use crate::error::SinkError;
use async_trait::async_trait;
use std::time::Duration;

/// An ordered, key-addressed list store.
///
/// Push preserves insertion order. [`range`] and [`trim`] together
/// implement the read-committed-then-truncate drain: values pushed after
/// a `range` was computed must survive the matching `trim`.
///
/// [`range`]: ListStore::range
/// [`trim`]: ListStore::trim
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append one value to the tail of `key`'s list.
    async fn push(&self, key: &str, value: &str) -> Result<(), SinkError>;

    /// Read up to `limit` values from the head of `key`'s list.
    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, SinkError>;

    /// Drop the `count` oldest values of `key`'s list.
    async fn trim(&self, key: &str, count: usize) -> Result<(), SinkError>;

    /// Delete `key` and everything buffered under it.
    async fn delete(&self, key: &str) -> Result<(), SinkError>;

    /// Refresh the time-to-live on `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), SinkError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), SinkError>;
}
