//! Narrow key-value interface over the external cache
//!
//! Values are opaque bytes. Any key may vanish at any moment (eviction, expiry,
//! another client), so callers treat "absent" and "evicted" identically.

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;

/// A value read together with its compare-and-swap token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub token: u64,
}

/// Blocking key-value cache operations
pub trait CacheBackend: Send + Sync {
    /// Fetch a value, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Fetch a value along with its CAS token
    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>>;

    /// Store a value unconditionally
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Store a value only if the key is absent; `true` if stored
    fn add(&self, key: &str, value: &[u8]) -> Result<bool>;

    /// Replace a value only if its token still matches; `true` if stored
    fn compare_and_swap(&self, key: &str, value: &[u8], token: u64) -> Result<bool>;

    /// Remove a key; `true` if something was removed
    fn delete(&self, key: &str) -> Result<bool>;
}

/// In-process cache with memcached semantics, for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, Versioned>,
    next_token: u64,
}

impl MemoryInner {
    fn insert(&mut self, key: &str, value: &[u8]) {
        self.next_token += 1;
        self.entries.insert(
            key.to_string(),
            Versioned {
                value: value.to_vec(),
                token: self.next_token,
            },
        );
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a key the way a cache eviction would
    pub fn evict(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.lock().entries.get(key).map(|v| v.value.clone()))
    }

    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(self.inner.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.inner.lock().insert(key, value);
        Ok(())
    }

    fn add(&self, key: &str, value: &[u8]) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(key) {
            return Ok(false);
        }
        inner.insert(key, value);
        Ok(true)
    }

    fn compare_and_swap(&self, key: &str, value: &[u8], token: u64) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(current) if current.token == token => {
                inner.insert(key, value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.inner.lock().entries.remove(key).is_some())
    }
}
