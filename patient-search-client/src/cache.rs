use crate::deduplication::RequestDeduplicator;
use crate::transport::InstrumentedTransport;
use crate::{LookupKey, Patient};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the cache system
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long a loaded result stays valid
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(30),
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

/// Cached search result with metadata
#[derive(Clone, Debug)]
pub struct CachedResult {
    pub data: Vec<Patient>,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CachedResult {
    pub fn new(data: Vec<Patient>, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Check if the cached result is still valid
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.created_at + self.ttl
    }
}

/// Expiring, single-flight cache in front of an [`InstrumentedTransport`].
///
/// Expiry is lazy: a stale entry is treated as absent on read and replaced
/// by the next successful load. Failed loads are never stored.
pub struct SearchCache {
    cache: DashMap<LookupKey, CachedResult>,
    deduplicator: RequestDeduplicator<LookupKey, Vec<Patient>>,
    transport: InstrumentedTransport,
    pub config: CacheConfig,
}

impl SearchCache {
    pub fn new(config: CacheConfig, transport: InstrumentedTransport) -> Self {
        Self {
            cache: DashMap::new(),
            deduplicator: RequestDeduplicator::new(),
            transport,
            config,
        }
    }

    /// Patients for `key`, loading them at most once per key at a time.
    ///
    /// Blank keys and failed loads both yield an empty list.
    pub async fn get(&self, key: &str) -> Vec<Patient> {
        match LookupKey::new(key) {
            Ok(key) => self.get_key(&key).await,
            Err(_) => vec![],
        }
    }

    pub async fn get_key(&self, key: &LookupKey) -> Vec<Patient> {
        if let Some(cached) = self.get_valid(key) {
            return cached;
        }

        match self
            .deduplicator
            .execute(key.clone(), || self.load(key))
            .await
        {
            Ok(patients) => patients,
            Err(e) => {
                log::warn!("Lookup for {} abandoned: {}", key, e);
                vec![]
            }
        }
    }

    fn get_valid(&self, key: &LookupKey) -> Option<Vec<Patient>> {
        match self.cache.get(key) {
            Some(cached) if cached.is_valid() => {
                log::debug!("Cache hit for key: {}", key);
                Some(cached.data.clone())
            }
            Some(_) => {
                log::debug!("Cache expired for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    async fn load(&self, key: &LookupKey) -> Vec<Patient> {
        // Another leader may have finished between our miss and taking the marker.
        if let Some(cached) = self.get_valid(key) {
            return cached;
        }

        match self.transport.call(key).await {
            Ok(patients) => {
                self.put(key.clone(), patients.clone());
                patients
            }
            Err(e) => {
                log::warn!("Not caching failed search for {}: {}", key, e);
                vec![]
            }
        }
    }

    fn put(&self, key: LookupKey, data: Vec<Patient>) {
        log::debug!("Stored {} patients in cache with key: {}", data.len(), key);
        self.cache.insert(key, CachedResult::new(data, self.config.ttl));
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) {
        // Loads may insert while the sweep walks the shards, so count removals directly.
        let mut evicted = 0usize;
        self.cache.retain(|_, cached| {
            let keep = cached.is_valid();
            if !keep {
                evicted += 1;
            }
            keep
        });
        log::debug!("Evicted {} expired cache entries", evicted);
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        self.cache.clear();
        log::info!("Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut total_entries = 0;
        let mut expired_entries = 0;
        for entry in self.cache.iter() {
            total_entries += 1;
            if !entry.is_valid() {
                expired_entries += 1;
            }
        }

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            in_flight: self.deduplicator.stats().pending_requests,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub in_flight: usize,
}

/// Thread-safe wrapper for the cache
pub type SharedSearchCache = Arc<SearchCache>;
