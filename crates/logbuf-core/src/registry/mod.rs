//! Bookkeeping of running log services.
//!
//! The registry maps each category to exactly one [`Service`]: the shared
//! sink handle, the activity timestamp the sweeper reads, and the driver
//! task that owns that sink's flush path. Every teardown path (explicit
//! close, stop signal, idle expiry, registry shutdown) funnels through
//! the same idempotent procedure: claim the map entry, flush, close.

mod driver;
mod sweeper;

use crate::config::FlushPolicy;
use crate::ports::Sink;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How often the sweeper scans for idle services.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// One registered category: the sink, its driver, and the activity state
/// the sweeper reads without calling back into the sink.
struct Service {
    sink: Arc<dyn Sink>,
    policy: FlushPolicy,
    last_activity: Instant,
    stop: CancellationToken,
    driver: JoinHandle<()>,
}

/// Point-in-time view of one registered service.
///
/// A debugging aid: the listing is taken under the registry lock but is
/// stale the moment it returns, so it is never authoritative under
/// concurrent mutation.
#[derive(Debug, Clone)]
pub struct ServiceStat {
    /// The category key.
    pub category: String,
    /// When the service last flushed at least one byte.
    pub last_activity: Instant,
    /// How long the service has been idle.
    pub idle: Duration,
}

pub(crate) struct RegistryInner {
    services: RwLock<HashMap<String, Service>>,
}

impl RegistryInner {
    /// Refresh the activity timestamp after a flush that wrote something.
    async fn touch(&self, category: &str) {
        if let Some(service) = self.services.write().await.get_mut(category) {
            service.last_activity = Instant::now();
        }
    }

    /// Claim and dismantle a category: remove the map entry, then flush
    /// and close the sink outside the lock.
    ///
    /// Removal doubles as the idempotency claim: a second caller finds
    /// nothing and returns `None`. Returns the service's stop token and
    /// driver handle so callers can signal and (optionally) await the
    /// driver.
    async fn teardown(&self, category: &str) -> Option<(CancellationToken, JoinHandle<()>)> {
        let service = self.services.write().await.remove(category)?;
        if !service.sink.is_closed() {
            match service.sink.flush().await {
                Ok(bytes) if bytes > 0 => {
                    debug!(category = %category, bytes, "final flush before close");
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(category = %category, error = %error, "final flush failed");
                }
            }
            if let Err(error) = service.sink.close().await {
                warn!(category = %category, error = %error, "close failed");
            }
        }
        info!(category = %category, "log service closed");
        Some((service.stop, service.driver))
    }
}

/// Registry of running log services, one per category.
///
/// Explicitly owned; there is no process-global instance. Create it
/// inside a tokio runtime (construction spawns the sweeper task) and call
/// [`shutdown`](Registry::shutdown) to drain every service before the
/// process exits.
pub struct Registry {
    inner: Arc<RegistryInner>,
    sweeper: JoinHandle<()>,
    shutdown: CancellationToken,
}

impl Registry {
    /// Registry with the stock 10-second idle sweep.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_interval(SWEEP_INTERVAL)
    }

    /// Registry whose idle sweeper runs on a custom cadence.
    #[must_use]
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        let inner = Arc::new(RegistryInner {
            services: RwLock::new(HashMap::new()),
        });
        let shutdown = CancellationToken::new();
        let sweeper = tokio::spawn(sweeper::run(
            Arc::clone(&inner),
            sweep_interval,
            shutdown.clone(),
        ));
        Self {
            inner,
            sweeper,
            shutdown,
        }
    }

    /// Register `sink` under `category` and start its driver.
    ///
    /// A category that is already registered keeps its running service:
    /// the existing sink is returned and `sink` is dropped. Concurrent
    /// calls for the same category resolve first-writer-wins, since the
    /// check-insert-spawn sequence holds the write lock throughout.
    pub async fn register(&self, category: &str, sink: Arc<dyn Sink>) -> Arc<dyn Sink> {
        let mut services = self.inner.services.write().await;
        if let Some(existing) = services.get(category) {
            debug!(category = %category, "category already registered");
            return Arc::clone(&existing.sink);
        }
        let stop = sink.stop_token();
        let flush_requests = sink.take_flush_requests();
        let driver = tokio::spawn(driver::run(
            Arc::clone(&self.inner),
            category.to_string(),
            Arc::clone(&sink),
            flush_requests,
        ));
        services.insert(
            category.to_string(),
            Service {
                policy: *sink.policy(),
                sink: Arc::clone(&sink),
                last_activity: Instant::now(),
                stop,
                driver,
            },
        );
        info!(category = %category, "log service registered");
        sink
    }

    /// Remove the map entry only; the driver keeps running and the sink
    /// stays open. Use [`close_category`](Registry::close_category) for a
    /// full teardown.
    pub async fn unregister(&self, category: &str) -> bool {
        self.inner
            .services
            .write()
            .await
            .remove(category)
            .is_some()
    }

    /// The registered sink for `category`, if any.
    pub async fn lookup(&self, category: &str) -> Option<Arc<dyn Sink>> {
        self.inner
            .services
            .read()
            .await
            .get(category)
            .map(|service| Arc::clone(&service.sink))
    }

    /// Whether `category` currently has a live service.
    pub async fn contains(&self, category: &str) -> bool {
        self.inner.services.read().await.contains_key(category)
    }

    /// Number of live services.
    pub async fn len(&self) -> usize {
        self.inner.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.services.read().await.is_empty()
    }

    /// Tear down `category` (flush, close, unregister) and signal its
    /// driver to exit. A no-op when the category is not registered.
    pub async fn close_category(&self, category: &str) {
        if let Some((stop, _driver)) = self.inner.teardown(category).await {
            stop.cancel();
        }
    }

    /// Point-in-time listing of every registered category.
    pub async fn snapshot(&self) -> Vec<ServiceStat> {
        let now = Instant::now();
        self.inner
            .services
            .read()
            .await
            .iter()
            .map(|(category, service)| ServiceStat {
                category: category.clone(),
                last_activity: service.last_activity,
                idle: now.duration_since(service.last_activity),
            })
            .collect()
    }

    /// Stop the sweeper, tear down every category, and wait for every
    /// driver to exit. Pending records are flushed on the way out.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        let categories: Vec<String> = self.inner.services.read().await.keys().cloned().collect();
        for category in categories {
            if let Some((stop, driver)) = self.inner.teardown(&category).await {
                stop.cancel();
                if let Err(error) = driver.await {
                    warn!(category = %category, error = %error, "driver did not exit cleanly");
                }
            }
        }
        let _ = (&mut self.sweeper).await;
        info!("registry shut down");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        // Drivers stop via their tokens; the sweeper has no other owner,
        // so don't leave it scanning a registry nobody holds. For a clean
        // drain of pending records, call shutdown() instead of dropping.
        self.sweeper.abort();
    }
}
