//! Map id → [`MapRecord`] lookup table.
//!
//! A [`MapRegistry`] is populated once at startup and read afterwards. It has no interior
//! mutability, so a shared reference can be handed to any number of reader threads. Tables that
//! must change at runtime go through [`SharedRegistry`], which swaps whole tables atomically.

use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{ErrorKind, IResult, failure_from_kind};
use crate::record::{MapRecord, RawMapRecord};
use crate::types::MapId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapRegistry {
    maps: IndexMap<MapId, MapRecord>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-validated records, stopping at the first duplicate.
    pub fn from_records<I>(records: I) -> IResult<Self>
    where
        I: IntoIterator<Item = MapRecord>,
    {
        let mut registry = Self::new();
        for record in records {
            registry.register(record)?;
        }
        Ok(registry)
    }

    /// Insert `record`. Fails with [`ErrorKind::DuplicateMapId`] if its id is taken; the
    /// registry is left untouched in that case.
    pub fn register(&mut self, record: MapRecord) -> IResult<()> {
        if self.maps.contains_key(record.map_id()) {
            return Err(failure_from_kind(ErrorKind::DuplicateMapId(
                record.map_id().clone(),
            )));
        }

        debug!(map = %record.map_id(), "registered map");
        self.maps.insert(record.map_id().clone(), record);
        Ok(())
    }

    /// Validate `raw` and insert it. Nothing is inserted if validation fails.
    pub fn register_raw(&mut self, raw: RawMapRecord) -> IResult<()> {
        self.register(MapRecord::new(raw)?)
    }

    /// Insert `record`, overwriting any existing entry with the same id.
    ///
    /// Returns the previous record. Overwrites keep the original listing position and are
    /// reported with a `warn` event.
    pub fn replace(&mut self, record: MapRecord) -> Option<MapRecord> {
        let previous = self.maps.insert(record.map_id().clone(), record);
        if let Some(previous) = &previous {
            warn!(map = %previous.map_id(), "overwrote registered map");
        }
        previous
    }

    /// Fails with [`ErrorKind::UnknownMap`] when `map_id` is not registered.
    pub fn lookup(&self, map_id: &str) -> IResult<&MapRecord> {
        self.maps
            .get(map_id)
            .ok_or_else(|| failure_from_kind(ErrorKind::UnknownMap(map_id.to_string())))
    }

    pub fn contains(&self, map_id: &str) -> bool {
        self.maps.contains_key(map_id)
    }

    /// Registered ids in insertion order. The iterator is `Clone`, so it can be restarted.
    pub fn list_maps(&self) -> impl Iterator<Item = &MapId> + Clone {
        self.maps.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &MapRecord> + Clone {
        self.maps.values()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// A registry that can be replaced while readers are active.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it for as long as they like; a
/// concurrent [`reload`](Self::reload) never mutates a published table.
pub struct SharedRegistry {
    snap: ArcSwap<MapRegistry>,
}

impl SharedRegistry {
    pub fn new(registry: MapRegistry) -> Self {
        Self {
            snap: ArcSwap::from_pointee(registry),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> Arc<MapRegistry> {
        self.snap.load_full()
    }

    /// Publish `registry` in place of the current table and return the old one.
    pub fn reload(&self, registry: MapRegistry) -> Arc<MapRegistry> {
        let previous = self.snap.swap(Arc::new(registry));
        debug!(
            previous = previous.len(),
            current = self.snap.load().len(),
            "reloaded map registry"
        );
        previous
    }

    /// Copy the current table, apply `edit` to the copy and publish it.
    ///
    /// If `edit` fails nothing is published. If another writer published in the meantime the
    /// edit is re-applied to the newer table.
    pub fn update<F>(&self, mut edit: F) -> IResult<()>
    where
        F: FnMut(&mut MapRegistry) -> IResult<()>,
    {
        loop {
            let cur = self.snap.load_full();
            let mut next = (*cur).clone();
            edit(&mut next)?;

            let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
            if Arc::ptr_eq(&prev, &cur) {
                return Ok(());
            }
        }
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(MapRegistry::new())
    }
}
