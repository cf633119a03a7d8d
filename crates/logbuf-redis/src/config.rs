//! Connection settings for the remote list store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how the remote store is reached.
///
/// The pool-shape knobs (`max_idle`, `max_active`, `idle_timeout`) are
/// part of the construction surface; how aggressively they are honored
/// is the store adapter's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `host:port` of the store.
    pub addr: String,
    /// Logical database index.
    pub db_index: u32,
    /// Upper bound on idle pooled connections.
    pub max_idle: u32,
    /// Upper bound on live connections; zero means unbounded.
    pub max_active: u32,
    /// How long an idle pooled connection may linger.
    pub idle_timeout: Duration,
}

impl RemoteConfig {
    pub fn new(addr: impl Into<String>, db_index: u32) -> Self {
        Self {
            addr: addr.into(),
            db_index,
            max_idle: 3,
            max_active: 0,
            idle_timeout: Duration::from_secs(240),
        }
    }

    #[must_use]
    pub const fn with_max_idle(mut self, max_idle: u32) -> Self {
        self.max_idle = max_idle;
        self
    }

    #[must_use]
    pub const fn with_max_active(mut self, max_active: u32) -> Self {
        self.max_active = max_active;
        self
    }

    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Connection URL understood by the client.
    #[must_use]
    pub fn url(&self) -> String {
        format!("redis://{}/{}", self.addr, self.db_index)
    }
}
