//! LRU + TTL cache in front of a content verifier

use super::verifier::{check_score, ContentVerifier};
use crate::config::VerifierCacheConfig;
use crate::error::Result;
use crate::types::ContentId;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct CachedScore {
    score: f64,
    cached_at: Instant,
}

impl CachedScore {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

/// Wraps a verifier and memoizes successful scores per content id
///
/// Failures are never cached.
pub struct CachedVerifier {
    inner: Arc<dyn ContentVerifier>,
    cache: RwLock<LruCache<ContentId, CachedScore>>,
    ttl: Duration,
}

impl CachedVerifier {
    pub fn new(inner: Arc<dyn ContentVerifier>, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner,
            cache: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Build from config; `None` when caching is disabled
    pub fn from_config(
        inner: Arc<dyn ContentVerifier>,
        config: &VerifierCacheConfig,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let capacity = NonZeroUsize::new(config.capacity)?;
        Some(Self::new(inner, capacity, Duration::from_secs(config.ttl_secs)))
    }

    /// Drop a cached score, e.g. after the content was regenerated
    pub fn invalidate(&self, content_id: &ContentId) {
        if let Ok(mut cache) = self.cache.write() {
            cache.pop(content_id);
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self.cache.read() {
            Ok(cache) => CacheStats {
                size: cache.len(),
                capacity: cache.cap().get(),
            },
            Err(_) => CacheStats {
                size: 0,
                capacity: 0,
            },
        }
    }

    fn lookup(&self, content_id: &ContentId) -> Option<f64> {
        let mut cache = self.cache.write().ok()?;
        let entry = cache.get(content_id).copied();
        match entry {
            Some(entry) if entry.is_valid(self.ttl) => Some(entry.score),
            Some(_) => {
                cache.pop(content_id);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl ContentVerifier for CachedVerifier {
    async fn verify(&self, content_id: &ContentId) -> Result<f64> {
        if let Some(score) = self.lookup(content_id) {
            debug!("Verifier cache hit for {}", content_id);
            return Ok(score);
        }

        let score = check_score(content_id, self.inner.verify(content_id).await?)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.put(
                content_id.clone(),
                CachedScore {
                    score,
                    cached_at: Instant::now(),
                },
            );
        }
        Ok(score)
    }
}
