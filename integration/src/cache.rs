// Key/value cache used for account features. Entries carry their own TTL and a
// set of tags so related entries can be dropped together.
use moka::Expiry;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait KeyValueCache: Send + Sync {
    fn load(&self, key: &str) -> Option<Arc<[u8]>>;
    fn save(&self, key: &str, data: &[u8], tags: &[&str], ttl: Duration);
    fn remove(&self, key: &str);
    /// Removes every entry saved with `tag`.
    fn clean(&self, tag: &str);
}

#[derive(Clone)]
struct CacheEntry {
    data: Arc<[u8]>,
    tags: Arc<[String]>,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MokaCache {
    cache: Cache<String, CacheEntry>,
}

impl MokaCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        MokaCache { cache }
    }
}

impl KeyValueCache for MokaCache {
    fn load(&self, key: &str) -> Option<Arc<[u8]>> {
        self.cache.get(key).map(|entry| entry.data)
    }

    fn save(&self, key: &str, data: &[u8], tags: &[&str], ttl: Duration) {
        let entry = CacheEntry {
            data: Arc::from(data),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ttl,
        };
        self.cache.insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        self.cache.invalidate(key);
    }

    fn clean(&self, tag: &str) {
        let keys: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.tags.iter().any(|t| t == tag))
            .map(|(key, _)| key)
            .collect();

        for key in keys {
            self.cache.invalidate(key.as_str());
        }
    }
}
