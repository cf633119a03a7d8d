//! [`ListStore`] implementation over the Redis list commands.

use crate::config::RemoteConfig;
use async_trait::async_trait;
use logbuf_core::SinkError;
use logbuf_core::ports::ListStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Remote list store speaking RPUSH / LRANGE / LTRIM / DEL / EXPIRE over
/// one managed multiplexed connection.
///
/// The manager owns reconnects, which replaces the idle/active pool of
/// the construction surface; cloning the store (or the connection per
/// operation) is cheap.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store and probe liveness before handing it out.
    pub async fn connect(config: &RemoteConfig) -> Result<Self, SinkError> {
        let client = redis::Client::open(config.url()).map_err(SinkError::backend)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(SinkError::backend)?;
        let store = Self { conn };
        store.ping().await?;
        Ok(store)
    }
}

#[async_trait]
impl ListStore for RedisStore {
    async fn push(&self, key: &str, value: &str) -> Result<(), SinkError> {
        let mut conn = self.conn.clone();
        let _len: i64 = conn.rpush(key, value).await.map_err(SinkError::backend)?;
        Ok(())
    }

    async fn range(&self, key: &str, limit: usize) -> Result<Vec<String>, SinkError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
        conn.lrange(key, 0, stop).await.map_err(SinkError::backend)
    }

    async fn trim(&self, key: &str, count: usize) -> Result<(), SinkError> {
        let mut conn = self.conn.clone();
        let start = isize::try_from(count).unwrap_or(isize::MAX);
        let _: () = conn
            .ltrim(key, start, -1)
            .await
            .map_err(SinkError::backend)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SinkError> {
        let mut conn = self.conn.clone();
        let _removed: i64 = conn.del(key).await.map_err(SinkError::backend)?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), SinkError> {
        let mut conn = self.conn.clone();
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let _set: i64 = conn
            .expire(key, seconds)
            .await
            .map_err(SinkError::backend)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), SinkError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(SinkError::backend)?;
        Ok(())
    }
}
