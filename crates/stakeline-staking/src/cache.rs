//! Short-lived read cache owned by the services that use it.
//!
//! Entries expire lazily: an expired entry is dropped the next time it is
//! read. The clock is injected so tests can move time forward.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.start + offset
    }
}

pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    /// Insert using the cache's default TTL
    fn set(&self, key: &str, value: V);

    fn set_with_ttl(&self, key: &str, value: V, ttl: Duration);

    fn ttl(&self) -> Duration;

    fn invalidate(&self, key: &str);

    fn clear(&self);

    /// Number of stored entries, expired or not
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct MemoryCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> MemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        None
    }

    fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.ttl);
    }

    fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_clock() -> (MemoryCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(Duration::from_secs(30), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_hit_before_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.set("validators", 7);
        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get("validators"), Some(7));
    }

    #[test]
    fn test_expired_entry_is_dropped_on_read() {
        let (cache, clock) = cache_with_clock();
        cache.set("validators", 7);
        clock.advance(Duration::from_secs(30));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("validators"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_custom_ttl_and_invalidate() {
        let (cache, clock) = cache_with_clock();
        cache.set_with_ttl("price:USD", 5, Duration::from_secs(120));
        cache.set("price:GBP", 4);

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get("price:USD"), Some(5));
        assert_eq!(cache.get("price:GBP"), None);

        cache.invalidate("price:USD");
        assert_eq!(cache.get("price:USD"), None);
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = cache_with_clock();
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.ttl(), Duration::from_secs(30));
    }
}
