//! Cache Store Module
//!
//! The thin protocol over a TTL-capable key-value backend, plus the
//! in-process `MemoryStore` backend that ships with the service.
//!
//! Entries are flat field maps stored under one key with a single TTL.
//! `set_hash` replaces the whole field map and resets the expiry, so a race
//! between two writers leaves one complete result in place, never a blend.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;

use crate::cache::{HashEntry, StoreStats};
use crate::config::StoreConfig;
use crate::error::{CacheError, Result};

// == Cache Store Protocol ==
/// Hash-level primitives over a TTL-bound key-value backend.
///
/// Implementations are shared between callers; every operation is a single
/// blocking call. Failures after a successful startup surface as
/// `CacheError::StoreUnavailable`, never swallowed.
pub trait CacheStore: Send + Sync {
    /// Connectivity probe. Called once at orchestrator construction;
    /// a failure there is fatal.
    fn ping(&self) -> Result<()>;

    /// Returns true if a live (unexpired) entry exists under `key`.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Stores `fields` under `key`, replacing any previous field map
    /// wholesale and (re)setting the expiry to `ttl_seconds` from now.
    fn set_hash(&self, key: &str, fields: HashMap<String, String>, ttl_seconds: u64)
        -> Result<()>;

    /// Returns the full field map, or None if the key is absent or expired.
    fn get_hash(&self, key: &str) -> Result<Option<HashMap<String, String>>>;

    /// Returns one field of the entry without retrieving the rest.
    fn get_field(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Returns true if the entry is live and contains `field`.
    fn field_exists(&self, key: &str, field: &str) -> Result<bool>;

    /// Remaining TTL in whole seconds, or None if the key is absent or expired.
    fn ttl_remaining(&self, key: &str) -> Result<Option<u64>>;

    /// Removes one entry. Returns true if a live entry existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every live entry whose key matches the glob `pattern`
    /// (`*` and `?` wildcards). Returns the number removed.
    fn delete_by_pattern(&self, pattern: &str) -> Result<usize>;

    /// Removes every expired entry. Returns the number removed.
    fn purge_expired(&self) -> Result<usize>;

    /// Current activity counters.
    fn stats(&self) -> Result<StoreStats>;
}

// == Memory Store ==
/// In-process TTL hash store.
///
/// Expired entries are dropped lazily when touched by a lookup and swept
/// periodically by the background cleanup task.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, HashEntry>,
    stats: StoreStats,
}

impl MemoryStore {
    // == Constructor ==
    /// Connects to the store namespace described by `config`.
    ///
    /// Each connection owns an independent namespace for the configured
    /// `db` index.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        if config.host.is_empty() {
            return Err(CacheError::Connection(
                "store host must not be empty".to_string(),
            ));
        }

        info!(
            host = %config.host,
            port = config.port,
            db = config.db,
            "Connected to cache store"
        );

        Ok(Self {
            inner: RwLock::new(Inner::default()),
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| CacheError::StoreUnavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| CacheError::StoreUnavailable("store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl CacheStore for MemoryStore {
    fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.entries.get(key).is_some_and(|e| !e.is_expired()))
    }

    fn set_hash(
        &self,
        key: &str,
        fields: HashMap<String, String>,
        ttl_seconds: u64,
    ) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .entries
            .insert(key.to_string(), HashEntry::new(fields, ttl_seconds));
        inner.stats.record_store();
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(())
    }

    fn get_hash(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let mut inner = self.write()?;
        match inner.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let fields = entry.fields.clone();
                inner.stats.record_hit();
                Ok(Some(fields))
            }
            Some(_) => {
                // Expired: drop lazily and report absent
                inner.entries.remove(key);
                let count = inner.entries.len();
                inner.stats.set_total_entries(count);
                inner.stats.record_miss();
                Ok(None)
            }
            None => {
                inner.stats.record_miss();
                Ok(None)
            }
        }
    }

    fn get_field(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut inner = self.write()?;
        match inner.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.fields.get(field).cloned();
                if value.is_some() {
                    inner.stats.record_hit();
                } else {
                    inner.stats.record_miss();
                }
                Ok(value)
            }
            Some(_) => {
                inner.entries.remove(key);
                let count = inner.entries.len();
                inner.stats.set_total_entries(count);
                inner.stats.record_miss();
                Ok(None)
            }
            None => {
                inner.stats.record_miss();
                Ok(None)
            }
        }
    }

    fn field_exists(&self, key: &str, field: &str) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner
            .entries
            .get(key)
            .is_some_and(|e| !e.is_expired() && e.fields.contains_key(field)))
    }

    fn ttl_remaining(&self, key: &str) -> Result<Option<u64>> {
        let inner = self.read()?;
        Ok(inner
            .entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.ttl_remaining()))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut inner = self.write()?;
        let existed = match inner.entries.remove(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        };
        if existed {
            inner.stats.record_deletes(1);
        }
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(existed)
    }

    fn delete_by_pattern(&self, pattern: &str) -> Result<usize> {
        let mut inner = self.write()?;
        let matching: Vec<String> = inner
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            inner.entries.remove(key);
        }

        inner.stats.record_deletes(matching.len());
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(matching.len())
    }

    fn purge_expired(&self) -> Result<usize> {
        let mut inner = self.write()?;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.remove(key);
        }

        inner.stats.record_deletes(expired.len());
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(expired.len())
    }

    fn stats(&self) -> Result<StoreStats> {
        let inner = self.read()?;
        let mut stats = inner.stats.clone();
        // Expired-but-unswept entries read as absent everywhere else,
        // so they must not count here either
        let live = inner.entries.values().filter(|e| !e.is_expired()).count();
        stats.set_total_entries(live);
        Ok(stats)
    }
}

// == Glob Matching ==
/// Matches `key` against a glob pattern with `*` (any run) and `?` (any
/// single byte) wildcards, the subset of Redis KEYS patterns this service
/// relies on.
///
/// Iterative two-pointer scan: on a mismatch, retry from the last `*` with
/// one more key byte consumed. O(pattern * key) worst case, so a
/// caller-supplied pattern full of stars cannot blow up the match.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p = pattern.as_bytes();
    let k = key.as_bytes();
    let (mut pi, mut ki) = (0, 0);
    // Position after the last '*', and the key position it was tried at
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some((pi + 1, ki));
            pi += 1;
        } else if let Some((star_pi, star_ki)) = star {
            pi = star_pi;
            ki = star_ki + 1;
            star = Some((star_pi, star_ki + 1));
        } else {
            return false;
        }
    }

    // Only trailing stars may remain
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
