//! In-memory read-through cache with time-based expiry.
//!
//! Entries expire lazily: a read that finds a stale entry removes it.
//! Nothing is swept in the background unless the owner calls
//! [`ExpiringCache::purge_expired`]. An optional capacity bound evicts the
//! oldest entry when a new key would not fit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::types::Coordinates;

/// Default entry lifetime (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Time source for expiry decisions
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used to drive expiry in tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// `None` keeps the cache unbounded
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: None,
        }
    }
}

impl From<&folio_core::CacheSettings> for CacheConfig {
    fn from(settings: &folio_core::CacheSettings) -> Self {
        Self {
            ttl: Duration::from_secs(settings.ttl_secs),
            max_entries: (settings.max_entries > 0).then_some(settings.max_entries),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    written_at: Instant,
}

#[derive(Debug)]
pub struct ExpiringCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Return the value for `key` if it is younger than the TTL.
    /// A stale entry is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let fresh = match entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.written_at) < self.config.ttl,
            None => {
                tracing::debug!(key, "Cache miss");
                return None;
            }
        };

        if fresh {
            tracing::debug!(key, "Cache hit");
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            tracing::debug!(key, "Cache entry expired");
            entries.remove(key);
            None
        }
    }

    /// Insert or overwrite `key`, stamped with the current time.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        if let Some(max) = self.config.max_entries {
            if !entries.contains_key(&key) && entries.len() >= max {
                let ttl = self.config.ttl;
                entries.retain(|_, e| now.saturating_duration_since(e.written_at) < ttl);

                if entries.len() >= max {
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, e)| e.written_at)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        tracing::debug!(key = %oldest, "Evicting oldest cache entry");
                        entries.remove(&oldest);
                    }
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                written_at: now,
            },
        );
    }

    /// Remove every stale entry and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.written_at) < ttl);
        before - entries.len()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Normalised key for a forward geocoding query.
pub fn geo_key(city: &str) -> String {
    format!("geo_{}", city.trim().to_lowercase())
}

/// Key for current conditions at a coordinate pair (rounded to 0.01°).
pub fn weather_key(coords: Coordinates) -> String {
    format!("weather_{:.2}_{:.2}", coords.lat, coords.lon)
}

/// Key for a daily forecast at a coordinate pair (rounded to 0.01°).
pub fn forecast_key(coords: Coordinates) -> String {
    format!("forecast_{:.2}_{:.2}", coords.lat, coords.lon)
}
