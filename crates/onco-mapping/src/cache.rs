//! Content-addressed store for mapped output.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Limits applied to the cache on every store.
///
/// Both limits are off by default, in which case entries live for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Keep at most this many entries; the oldest go first. The entry just
    /// stored always stays, so zero acts as one.
    pub max_entries: Option<usize>,
    /// Entries older than this are neither served nor kept.
    pub max_age: Option<Duration>,
}

impl RetentionPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let Some(max_age) = self.max_age else {
            return false;
        };
        // Entries stamped in the future are not expired.
        (now - entry.created_at)
            .to_std()
            .is_ok_and(|age| age > max_age)
    }
}

/// One stored output. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    key: String,
    created_at: DateTime<Utc>,
    payload: Vec<u8>,
}

impl CacheEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

struct Slot {
    entry: Arc<CacheEntry>,
    sequence: u64,
}

#[derive(Default)]
struct Entries {
    slots: HashMap<String, Slot>,
    next_sequence: u64,
}

/// Map from content hash to [`CacheEntry`]; last writer wins.
#[derive(Default)]
pub struct MappingCache {
    entries: RwLock<Entries>,
    policy: RetentionPolicy,
}

impl std::fmt::Debug for MappingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingCache")
            .field("len", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl MappingCache {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            entries: RwLock::default(),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn store(&self, key: impl Into<String>, payload: Vec<u8>) -> Arc<CacheEntry> {
        self.store_at(key, payload, Utc::now())
    }

    /// Store with an explicit creation time, replacing any entry under the
    /// same key, then apply the retention policy.
    pub fn store_at(
        &self,
        key: impl Into<String>,
        payload: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            key: key.into(),
            created_at: now,
            payload,
        });
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries.slots.insert(
            entry.key.clone(),
            Slot {
                entry: Arc::clone(&entry),
                sequence,
            },
        );
        self.apply_policy(&mut entries, &entry.key, now);
        entry
    }

    fn apply_policy(&self, entries: &mut Entries, stored: &str, now: DateTime<Utc>) {
        let before = entries.slots.len();
        entries
            .slots
            .retain(|key, slot| key == stored || !self.policy.is_expired(&slot.entry, now));
        let expired = before - entries.slots.len();

        let mut evicted = 0;
        if let Some(max_entries) = self.policy.max_entries.map(|max| max.max(1))
            && entries.slots.len() > max_entries
        {
            let mut order: Vec<_> = entries
                .slots
                .iter()
                .filter(|(key, _)| key.as_str() != stored)
                .map(|(key, slot)| (slot.entry.created_at, slot.sequence, key.clone()))
                .collect();
            order.sort();
            evicted = entries.slots.len() - max_entries;
            for (_, _, key) in order.into_iter().take(evicted) {
                entries.slots.remove(&key);
            }
        }

        if expired > 0 || evicted > 0 {
            debug!(expired, evicted, remaining = entries.slots.len(), "cache retention applied");
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.get_at(key, Utc::now())
    }

    /// Entry under `key` unless it is past the retention age at `now`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .slots
            .get(key)
            .filter(|slot| !self.policy.is_expired(&slot.entry, now))
            .map(|slot| Arc::clone(&slot.entry))
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn store_overwrites_same_key() {
        let cache = MappingCache::default();
        cache.store("k", b"one".to_vec());
        cache.store("k", b"two".to_vec());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().payload(), b"two");
    }

    #[test]
    fn unknown_key_is_none() {
        let cache = MappingCache::default();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let cache = MappingCache::new(RetentionPolicy::unbounded().with_max_entries(2));
        let start = Utc::now();
        cache.store_at("a", Vec::new(), start);
        cache.store_at("b", Vec::new(), start + TimeDelta::seconds(1));
        cache.store_at("c", Vec::new(), start + TimeDelta::seconds(2));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn equal_timestamps_evict_in_store_order() {
        let cache = MappingCache::new(RetentionPolicy::unbounded().with_max_entries(1));
        let now = Utc::now();
        cache.store_at("a", Vec::new(), now);
        cache.store_at("b", Vec::new(), now);
        assert!(cache.get_at("a", now).is_none());
        assert!(cache.get_at("b", now).is_some());
    }

    #[test]
    fn zero_limit_keeps_the_entry_just_stored() {
        let cache = MappingCache::new(RetentionPolicy::unbounded().with_max_entries(0));
        let now = Utc::now();
        cache.store_at("b", Vec::new(), now);
        cache.store_at("a", b"late".to_vec(), now - TimeDelta::seconds(5));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("a", now).unwrap().payload(), b"late");
    }

    #[test]
    fn expired_entries_are_hidden_and_purged() {
        let cache = MappingCache::new(
            RetentionPolicy::unbounded().with_max_age(Duration::from_secs(60)),
        );
        let start = Utc::now();
        cache.store_at("old", b"x".to_vec(), start);
        let later = start + TimeDelta::seconds(61);
        assert!(cache.get_at("old", later).is_none());
        assert!(cache.get_at("old", start + TimeDelta::seconds(30)).is_some());
        cache.store_at("new", b"y".to_vec(), later);
        assert_eq!(cache.len(), 1);
    }
}
