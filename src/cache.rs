//! Parsed-file cache contract.
//!
//! A resolution only ever asks a cache for a file's sections by name and,
//! on a miss, stores what it parsed. Entries are never evicted or
//! invalidated here: the owner of the cache decides when a file's contents
//! may have changed and clears it.
//!
//! Methods take `&self` and the trait requires `Send + Sync`, so one cache
//! can be shared by concurrent resolutions, async ones included. Two
//! resolutions racing on the same key write identical sections, so the
//! second write is harmless. Implementations are responsible for their own
//! synchronization; the provided impls cover `Mutex` and `RwLock` maps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::types::RawSection;

pub type CachedSections = Arc<[RawSection]>;

pub trait SectionCache: Send + Sync {
    fn get(&self, name: &str) -> Option<CachedSections>;
    fn set(&self, name: &str, sections: CachedSections);
}

impl SectionCache for Mutex<HashMap<String, CachedSections>> {
    fn get(&self, name: &str) -> Option<CachedSections> {
        let map = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.get(name).cloned()
    }

    fn set(&self, name: &str, sections: CachedSections) {
        let mut map = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(name.to_string(), sections);
    }
}

impl SectionCache for RwLock<HashMap<String, CachedSections>> {
    fn get(&self, name: &str) -> Option<CachedSections> {
        let map = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.get(name).cloned()
    }

    fn set(&self, name: &str, sections: CachedSections) {
        let mut map = self.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(name.to_string(), sections);
    }
}

/// Return the cached sections for `name`, or build them with `parse` and
/// store the result.
pub(crate) fn get_or_parse<E>(
    cache: Option<&dyn SectionCache>,
    name: &str,
    parse: impl FnOnce() -> Result<Vec<RawSection>, E>,
) -> Result<CachedSections, E> {
    if let Some(cache) = cache
        && let Some(hit) = cache.get(name)
    {
        tracing::trace!(name, "section cache hit");
        return Ok(hit);
    }
    let sections: CachedSections = parse()?.into();
    if let Some(cache) = cache {
        cache.set(name, Arc::clone(&sections));
    }
    Ok(sections)
}
