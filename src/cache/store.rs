//! Expiring comic information store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::site::{AdapterFailure, ProductScraper};
use crate::domain::comics::ComicInfo;

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

pub const METRIC_CACHE_HIT: &str = "comicshelf_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "comicshelf_cache_miss_total";
pub const METRIC_CACHE_MEMO_HIT: &str = "comicshelf_cache_memo_hit_total";
pub const METRIC_CACHE_MEMO_EVICT: &str = "comicshelf_cache_memo_evict_total";
pub const METRIC_CACHE_FETCH_ERROR: &str = "comicshelf_cache_fetch_error_total";

/// A successful fetch and the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at: Instant,
    value: ComicInfo,
}

impl CacheEntry {
    /// Stale once `now - inserted_at >= ttl`.
    fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Memoizing front for [`ProductScraper::scrape_product`].
///
/// Only successful results are stored; a failed fetch leaves no trace and the
/// next call tries again.
pub struct ComicInfoCache {
    scraper: Arc<dyn ProductScraper>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    memo: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl ComicInfoCache {
    pub fn new(scraper: Arc<dyn ProductScraper>, config: &CacheConfig) -> Self {
        Self::with_clock(scraper, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        scraper: Arc<dyn ProductScraper>,
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scraper,
            clock,
            ttl: config.ttl,
            entries: Mutex::new(HashMap::new()),
            memo: Mutex::new(LruCache::new(config.memo_capacity_non_zero())),
        }
    }

    /// Normalize `raw_url` and return its comic information, fetching on a
    /// miss or a stale entry.
    pub async fn get_comic_info(&self, raw_url: &str) -> Result<ComicInfo, AdapterFailure> {
        let key = CacheKey::normalize(raw_url);
        self.get(&key).await
    }

    pub async fn get(&self, key: &CacheKey) -> Result<ComicInfo, AdapterFailure> {
        if let Some(value) = self.lookup(key) {
            counter!(METRIC_CACHE_HIT).increment(1);
            debug!(target = "comicshelf::cache", key = %key, "cache hit");
            return Ok(value);
        }

        counter!(METRIC_CACHE_MISS).increment(1);
        debug!(target = "comicshelf::cache", key = %key, "cache miss");
        self.memoized_fetch(key).await
    }

    /// Number of entries in the expiry map, stale ones included.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the memo layer still holds a result for `key`.
    pub fn is_memoized(&self, key: &CacheKey) -> bool {
        mutex_lock(&self.memo, SOURCE, "is_memoized").contains(key)
    }

    fn lookup(&self, key: &CacheKey) -> Option<ComicInfo> {
        let now = self.clock.now();
        let entries = mutex_lock(&self.entries, SOURCE, "lookup");
        entries
            .get(key)
            .filter(|entry| entry.is_live(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    async fn memoized_fetch(&self, key: &CacheKey) -> Result<ComicInfo, AdapterFailure> {
        if let Some(entry) = self.recall(key) {
            counter!(METRIC_CACHE_MEMO_HIT).increment(1);
            let value = entry.value.clone();
            self.store(key, entry);
            return Ok(value);
        }

        let value = match self.scraper.scrape_product(key.as_str()).await {
            Ok(value) => value,
            Err(failure) => {
                counter!(METRIC_CACHE_FETCH_ERROR).increment(1);
                warn!(
                    target = "comicshelf::cache",
                    key = %key,
                    error = %failure,
                    "comic fetch failed"
                );
                return Err(failure);
            }
        };

        let entry = CacheEntry {
            inserted_at: self.clock.now(),
            value: value.clone(),
        };
        self.memorize(key, entry.clone());
        self.store(key, entry);
        debug!(target = "comicshelf::cache", key = %key, "cache stored");
        Ok(value)
    }

    /// Memo entries obey the same TTL, so the memo never revives stale data.
    fn recall(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = self.clock.now();
        let mut memo = mutex_lock(&self.memo, SOURCE, "recall");
        memo.get(key)
            .filter(|entry| entry.is_live(now, self.ttl))
            .cloned()
    }

    fn memorize(&self, key: &CacheKey, entry: CacheEntry) {
        let evicted = mutex_lock(&self.memo, SOURCE, "memorize").push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != *key
        {
            counter!(METRIC_CACHE_MEMO_EVICT).increment(1);
            debug!(
                target = "comicshelf::cache",
                evicted = %evicted_key,
                "memo evicted least recently used key"
            );
        }
    }

    fn store(&self, key: &CacheKey, entry: CacheEntry) {
        mutex_lock(&self.entries, SOURCE, "store").insert(key.clone(), entry);
    }
}
