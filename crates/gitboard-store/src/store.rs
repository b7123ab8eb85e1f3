use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;

use crate::error::StoreError;

/// An in-memory entry with an optional expiry.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        // expires_at is None when the TTL overflows Instant, i.e. never.
        match self.expires_at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

/// Key-value store with TTL support.
///
/// Cloning is cheap in both modes; clones share the underlying map or pool.
#[derive(Clone)]
pub enum KvStore {
    /// Single-instance: process-local map.
    Memory(Arc<DashMap<String, MemoryEntry>>),

    /// Multi-instance: shared Redis.
    Redis { pool: Pool },
}

impl KvStore {
    /// Create a new process-local store.
    pub fn memory() -> Self {
        KvStore::Memory(Arc::new(DashMap::new()))
    }

    /// Connect to Redis at `url` with the given pool size.
    pub fn connect_redis(url: &str, pool_size: usize) -> Result<Self, StoreError> {
        let mut cfg = deadpool_redis::Config::from_url(url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(pool_size));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        Ok(KvStore::Redis { pool })
    }

    /// Human-readable backend name, used by readiness reporting.
    pub fn mode(&self) -> &'static str {
        match self {
            KvStore::Memory(_) => "memory",
            KvStore::Redis { .. } => "redis",
        }
    }

    /// Get a value. Expired entries read as absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            KvStore::Memory(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        return Ok(Some(entry.value.clone()));
                    }
                    drop(entry);
                    map.remove(key);
                }
                Ok(None)
            }
            KvStore::Redis { pool } => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| StoreError::unavailable(e.to_string()))?;
                let value: Option<String> = conn.get(key).await?;
                Ok(value)
            }
        }
    }

    /// Set a value with a fresh TTL, overwriting any existing entry.
    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        match self {
            KvStore::Memory(map) => {
                map.insert(
                    key.to_string(),
                    MemoryEntry::new(value.to_string(), Duration::from_secs(ttl_secs)),
                );
                Ok(())
            }
            KvStore::Redis { pool } => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| StoreError::unavailable(e.to_string()))?;
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
                Ok(())
            }
        }
    }

    /// Set a value with a TTL only if the key is absent.
    ///
    /// Returns `true` when the value was set (the marker was acquired).
    /// Backs the send-code cooldown.
    pub async fn set_nx_ex(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        match self {
            KvStore::Memory(map) => {
                let fresh = MemoryEntry::new(value.to_string(), Duration::from_secs(ttl_secs));
                match map.entry(key.to_string()) {
                    Entry::Occupied(mut occupied) => {
                        if occupied.get().is_expired() {
                            occupied.insert(fresh);
                            Ok(true)
                        } else {
                            Ok(false)
                        }
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(fresh);
                        Ok(true)
                    }
                }
            }
            KvStore::Redis { pool } => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| StoreError::unavailable(e.to_string()))?;
                let reply: Option<String> = redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_secs)
                    .query_async(&mut conn)
                    .await?;
                Ok(reply.is_some())
            }
        }
    }

    /// Delete a key. Deleting an absent key is not an error.
    pub async fn del(&self, key: &str) -> Result<(), StoreError> {
        match self {
            KvStore::Memory(map) => {
                map.remove(key);
                Ok(())
            }
            KvStore::Redis { pool } => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| StoreError::unavailable(e.to_string()))?;
                conn.del::<_, ()>(key).await?;
                Ok(())
            }
        }
    }
}
