//! Look-aside cache collaborators.
//!
//! Services hold an `Arc<dyn Cache>` and never check for its presence: when
//! no Redis is configured the `NoopCache` answers every lookup with a miss.
pub mod redis;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

pub use self::redis::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] ::redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with per-key expiry
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache that stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

struct CachedValue {
    value: String,
    expire_at: Instant,
}

/// In-process cache with per-entry expiry
#[derive(Default)]
pub struct MemoryCache {
    map: Mutex<HashMap<String, CachedValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut map = self.map.lock().await;
        match map.get(key) {
            Some(cached) if Instant::now() < cached.expire_at => Ok(Some(cached.value.clone())),
            Some(_) => {
                map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let cached = CachedValue {
            value: value.to_string(),
            expire_at: Instant::now() + ttl,
        };
        self.map.lock().await.insert(key.to_string(), cached);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.map.lock().await.remove(key);
        Ok(())
    }
}

/// Cache key for a journal by id
pub fn journal_key(id: uuid::Uuid) -> String {
    format!("journal:{}", id)
}
