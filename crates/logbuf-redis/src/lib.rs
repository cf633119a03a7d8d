//! Remote list-store backend for logbuf.
//!
//! [`RemoteSink`] buffers records in a list under a single key of a
//! remote store and drains them to a local file when a driver is
//! attached; [`RedisStore`] implements the
//! [`ListStore`](logbuf_core::ports::ListStore) port over the Redis list
//! commands.

pub mod config;
pub mod sink;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_store;

pub use config::RemoteConfig;
pub use sink::RemoteSink;
pub use store::RedisStore;
