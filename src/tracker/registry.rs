//! Storage of live tracked objects, keyed by stable id.

use std::collections::BTreeMap;

use crate::error::{Result, TrackError};
use crate::tracker::tracked_object::TrackedObject;

/// Owns every live [`TrackedObject`] and the id counter.
///
/// Ids are issued in increasing order and never reused, so iterating in id
/// order is the same as iterating in creation order.
#[derive(Debug, Default)]
pub struct TrackRegistry {
    objects: BTreeMap<u64, TrackedObject>,
    last_id: u64,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id. The first id is 1.
    pub fn issue_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// The most recently issued id, or 0 if none was issued yet.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn get(&self, id: u64) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut TrackedObject> {
        self.objects.get_mut(&id)
    }

    pub fn try_get(&self, id: u64) -> Result<&TrackedObject> {
        self.get(id).ok_or(TrackError::UnknownId(id))
    }

    /// Insert or overwrite the object stored under `object.id`.
    pub fn put(&mut self, object: TrackedObject) {
        // Keep the counter ahead of externally built objects.
        self.last_id = self.last_id.max(object.id);
        self.objects.insert(object.id, object);
    }

    /// Evict an object. Absent ids are a no-op.
    pub fn remove(&mut self, id: u64) -> Option<TrackedObject> {
        self.objects.remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn all_ids(&self) -> Vec<u64> {
        self.objects.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedObject> {
        self.objects.values_mut()
    }

    pub(crate) fn objects_mut(&mut self) -> &mut BTreeMap<u64, TrackedObject> {
        &mut self.objects
    }

    /// Drop every object. The id counter is preserved.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
