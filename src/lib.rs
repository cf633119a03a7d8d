//! Buffered, category-keyed log sinks with managed flush/expire
//! lifecycle.
//!
//! Callers append text records to a [`Sink`]; the library accumulates
//! them and flushes on count/size thresholds, on a timer, and on
//! teardown. A [`Registry`] runs one driver task per category and evicts
//! categories that stay idle past their policy's expiry. Two backends
//! ship out of the box: [`FileSink`] buffers in process memory and
//! appends to a local file, [`RemoteSink`] buffers in a remote
//! list store and drains it to a file.
//!
//! ```no_run
//! use logbuf::{FlushPolicy, Registry, Sink};
//!
//! # async fn demo() -> Result<(), logbuf::SinkError> {
//! let registry = Registry::new();
//! let audit =
//!     logbuf::register_file_sink(&registry, "/var/log/app/audit.log", FlushPolicy::default())
//!         .await;
//! audit.append("user 42 logged in\n").await?;
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub use logbuf_core::ports::{ListStore, Sink};
pub use logbuf_core::{FlushPolicy, RecordBuffer, Registry, ServiceStat, SinkError, SinkSignals};
pub use logbuf_file::{FileSink, FileTarget};
pub use logbuf_redis::{RedisStore, RemoteConfig, RemoteSink};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build a file sink for `path` and register it under the path as its
/// category.
///
/// File logs are local-only, so the driving loop is always wanted;
/// registration starts it. If the category is already live, the existing
/// sink is returned instead.
pub async fn register_file_sink(
    registry: &Registry,
    path: impl Into<PathBuf>,
    policy: FlushPolicy,
) -> Arc<dyn Sink> {
    let sink: Arc<dyn Sink> = Arc::new(FileSink::new(path, policy));
    let category = sink.category().to_string();
    registry.register(&category, sink).await
}

/// The convenience path: reuse the sink already registered for `path`.
/// When `close_existing` is set, the old one is torn down first and a
/// fresh sink takes its place. New sinks get the default policy.
pub async fn default_file_sink(
    registry: &Registry,
    path: impl AsRef<Path>,
    close_existing: bool,
) -> Arc<dyn Sink> {
    let category = path.as_ref().display().to_string();
    if let Some(existing) = registry.lookup(&category).await {
        if !close_existing {
            return existing;
        }
        registry.close_category(&category).await;
    }
    let sink: Arc<dyn Sink> = Arc::new(FileSink::new(path.as_ref(), FlushPolicy::default()));
    registry.register(&category, sink).await
}

/// Build a remote-buffered sink without registering it.
///
/// Producers that only push (no local drain) run it standalone; attach a
/// drain by registering the returned sink explicitly. `path` is the
/// local file the drain writes to; `None` makes a producer-only sink.
pub async fn remote_sink(
    path: Option<PathBuf>,
    cache_key: impl Into<String>,
    policy: FlushPolicy,
    remote: &RemoteConfig,
) -> Result<Arc<RemoteSink<RedisStore>>, SinkError> {
    let store = RedisStore::connect(remote).await?;
    Ok(Arc::new(RemoteSink::new(path, cache_key, policy, store)))
}
