//! # View Result Cache
//!
//! Records are immutable and only ever appended, so a view result is fully
//! determined by the view, its raw parameters and the id of the last record
//! in the snapshot. [`ViewCache`] memoizes results under exactly that key.
//!
//! ## Design Principles
//!
//! - BTreeMap storage for deterministic iteration and eviction order
//! - Logical clock (monotonic counter) instead of wall time
//! - Integer-only statistics
//!
//! Entries for older heads are never wrong, only unreachable once the log
//! grows; they age out through LRU eviction.
//!
//! The cache is meant for long-lived embedders that keep a [`RecordLog`]
//! and re-evaluate views as it grows. The one-shot CLI evaluates each view
//! once per process and does not use it.
//!
//! [`RecordLog`]: crate::store::RecordLog

use crate::record::RecordId;
use crate::store::LogSnapshot;
use crate::view::{ViewKind, evaluate_view};
use crate::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// Default number of cached results.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Default number of entries dropped per eviction.
pub const DEFAULT_EVICTION_BATCH: usize = 8;

// =============================================================================
// CACHE KEY
// =============================================================================

/// Identity of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViewCacheKey {
    pub view: ViewKind,
    /// Raw parameters as canonical JSON text (object keys sorted).
    pub params: String,
    /// Last record id of the snapshot, `None` for an empty log.
    pub head: Option<RecordId>,
}

impl ViewCacheKey {
    #[must_use]
    pub fn new(view: ViewKind, raw: &Value, head: Option<RecordId>) -> Self {
        Self {
            view,
            params: canonical(raw).to_string(),
            head,
        }
    }
}

/// Rebuild a JSON value with every object's keys in sorted order.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(inner) = map.get(key) {
                    sorted.insert(key.clone(), canonical(inner));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Clone)]
struct Slot {
    result: Value,
    last_access: u64,
}

/// Bounded LRU cache of view results.
#[derive(Debug)]
pub struct ViewCache {
    slots: BTreeMap<ViewCacheKey, Slot>,
    max_size: usize,
    eviction_batch: usize,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl ViewCache {
    /// Create a cache holding at most `max_size` results (minimum 1).
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            max_size: max_size.max(1),
            eviction_batch: DEFAULT_EVICTION_BATCH,
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Set how many entries are dropped when the cache is full.
    #[must_use]
    pub fn with_eviction_batch(mut self, batch: usize) -> Self {
        self.eviction_batch = batch.max(1);
        self
    }

    /// Return the cached result for this evaluation, or evaluate and cache it.
    pub fn evaluate(&mut self, view: ViewKind, snapshot: LogSnapshot<'_>, raw: &Value) -> Result<Value> {
        let key = ViewCacheKey::new(view, raw, snapshot.head());
        if let Some(hit) = self.get(&key) {
            trace!(view = %view, "view cache hit");
            return Ok(hit.clone());
        }

        let result = evaluate_view(view, &snapshot, raw)?;
        self.insert(key, result.clone());
        Ok(result)
    }

    /// Look up a result, refreshing its recency.
    pub fn get(&mut self, key: &ViewCacheKey) -> Option<&Value> {
        self.clock = self.clock.saturating_add(1);
        let now = self.clock;

        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.last_access = now;
                self.hits = self.hits.saturating_add(1);
                Some(&slot.result)
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Look up a result without touching recency or statistics.
    #[must_use]
    pub fn peek(&self, key: &ViewCacheKey) -> Option<&Value> {
        self.slots.get(key).map(|slot| &slot.result)
    }

    /// Store a result, evicting least recently used entries when full.
    pub fn insert(&mut self, key: ViewCacheKey, result: Value) {
        self.clock = self.clock.saturating_add(1);
        if self.slots.len() >= self.max_size && !self.slots.contains_key(&key) {
            self.evict();
        }
        self.slots.insert(
            key,
            Slot {
                result,
                last_access: self.clock,
            },
        );
    }

    /// Drop every cached result. Statistics are kept.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &ViewCacheKey) -> bool {
        self.slots.contains_key(key)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits.saturating_add(self.misses);
        let hit_rate_percent = if lookups == 0 {
            0
        } else {
            (self.hits.saturating_mul(100) / lookups) as u8
        };
        CacheStats {
            size: self.slots.len(),
            max_size: self.max_size,
            hits: self.hits,
            misses: self.misses,
            hit_rate_percent,
        }
    }

    fn evict(&mut self) {
        let mut by_age: Vec<(u64, ViewCacheKey)> = self
            .slots
            .iter()
            .map(|(key, slot)| (slot.last_access, key.clone()))
            .collect();
        // Ties cannot occur (one clock tick per access), key order is a fallback.
        by_age.sort();

        for (_, key) in by_age.into_iter().take(self.eviction_batch) {
            self.slots.remove(&key);
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Integer percentage, 0-100.
    pub hit_rate_percent: u8,
}

// =============================================================================
// TESTS
// =============================================================================
