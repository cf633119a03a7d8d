//! In-memory [`ListStore`] model for drain-semantics tests.
//!
//! Behaves like the real store's list commands without a server: push
//! preserves insertion order, `range` reads a bounded head, `trim` drops
//! a prefix. Tests can inject a push between a `range` and its matching
//! `trim` to exercise the read-committed-then-truncate race.

use async_trait::async_trait;
use logbuf_core::SinkError;
use logbuf_core::ports::ListStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct State {
    lists: HashMap<String, Vec<String>>,
    ttls: HashMap<String, Duration>,
    deletes: HashMap<String, usize>,
    inject_after_range: HashMap<String, Vec<String>>,
}

/// Shared, cloneable in-memory list store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Current contents of `key`'s list.
    #[must_use]
    pub fn items(&self, key: &str) -> Vec<String> {
        self.state().lists.get(key).cloned().unwrap_or_default()
    }

    /// Last TTL set on `key`.
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.state().ttls.get(key).copied()
    }

    /// How many times `key` was deleted.
    #[must_use]
    pub fn delete_count(&self, key: &str) -> usize {
        self.state().deletes.get(key).copied().unwrap_or(0)
    }

    /// Queue `value` to land right after the next `range` on `key`,
    /// simulating a producer racing the drain.
    pub fn push_after_next_range(&self, key: &str, value: &str) {
        self.state()
            .inject_after_range
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn push(&self, key: &str, value: &str) -> Result<(), SinkError> {
        self.state()
            .lists
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, SinkError> {
        let mut state = self.state();
        let head: Vec<String> = state
            .lists
            .get(key)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default();
        if let Some(late) = state.inject_after_range.remove(key) {
            state.lists.entry(key.to_string()).or_default().extend(late);
        }
        Ok(head)
    }

    async fn trim(&self, key: &str, count: usize) -> Result<(), SinkError> {
        let mut state = self.state();
        if let Some(list) = state.lists.get_mut(key) {
            let count = count.min(list.len());
            list.drain(..count);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SinkError> {
        let mut state = self.state();
        state.lists.remove(key);
        state.ttls.remove(key);
        *state.deletes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), SinkError> {
        self.state().ttls.insert(key.to_string(), ttl);
        Ok(())
    }

    async fn ping(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
