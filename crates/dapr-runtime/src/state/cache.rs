use serde_json::Value;
use std::collections::HashMap;

use crate::errors::CacheError;

#[derive(Debug, Clone, PartialEq)]
enum CacheEntry {
    Present(Value),
    Absent,
}

/// Result of looking a key up in an [`EntityCache`].
///
/// `Absent` means the key is known not to exist; `NotLoaded` means the cache
/// has never seen it. A present `null` is still `Present`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheLookup<'a> {
    Present(&'a Value),
    Absent,
    NotLoaded,
}

impl CacheLookup<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, CacheLookup::Present(_))
    }
}

/// # EntityCache
///
/// Read-through cache of one entity's state keys for the duration of a
/// transaction.
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    name: String,
    entries: HashMap<String, CacheEntry>,
}

impl EntityCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, key: &str) -> CacheLookup<'_> {
        match self.entries.get(key) {
            Some(CacheEntry::Present(value)) => CacheLookup::Present(value),
            Some(CacheEntry::Absent) => CacheLookup::Absent,
            None => CacheLookup::NotLoaded,
        }
    }

    pub fn get_key(&self, key: &str) -> Result<&Value, CacheError> {
        match self.lookup(key) {
            CacheLookup::Present(value) => Ok(value),
            CacheLookup::Absent | CacheLookup::NotLoaded => {
                Err(CacheError::KeyNotFound(key.to_string()))
            }
        }
    }

    pub fn set_key(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), CacheEntry::Present(value));
    }

    pub fn mark_absent(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), CacheEntry::Absent);
    }

    /// Forgets the value of `key`. The key stays known, as absent.
    pub fn evict(&mut self, key: &str) {
        self.mark_absent(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_found()
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
