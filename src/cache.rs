//! Cache collaborator for expensive ensembles.
//!
//! The core never touches the filesystem; callers that want to persist
//! replicate ensembles implement [`EnsembleCache`] over whatever storage
//! they like (with file-level atomicity handled on their side) and route
//! computation through `get_or_compute`.

use crate::data::Ensemble;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Keyed storage for computed ensembles.
pub trait EnsembleCache {
    /// Return the ensemble stored under `key`, computing and storing it
    /// first if absent. A failed computation is not stored.
    fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Ensemble>
    where
        F: FnOnce() -> Result<Ensemble>;
}

/// In-process cache, useful for analysis sessions that revisit the same
/// simulation settings.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Ensemble>>,
}

impl MemoryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached ensembles.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EnsembleCache for MemoryCache {
    fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Ensemble>
    where
        F: FnOnce() -> Result<Ensemble>,
    {
        {
            let entries = self.entries.lock().expect("cache lock poisoned");
            if let Some(cached) = entries.get(key) {
                return Ok(cached.clone());
            }
        }
        // Lock released during computation; a racing computation of the
        // same key is wasted work, not corruption.
        let ensemble = compute()?;
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.entry(key.to_string()).or_insert_with(|| ensemble.clone());
        Ok(ensemble)
    }
}

/// Pass-through cache: always recomputes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl EnsembleCache for NoCache {
    fn get_or_compute<F>(&self, _key: &str, compute: F) -> Result<Ensemble>
    where
        F: FnOnce() -> Result<Ensemble>,
    {
        compute()
    }
}
