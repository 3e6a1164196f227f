//! Creation, confirmation and eviction rules for tracked objects.

use log::debug;

use crate::tracker::registry::TrackRegistry;
use crate::tracker::tracked_object::TrackedObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// An object is evicted once it has missed this many cycles in a row.
    pub max_misses: u32,
    /// Consecutive hits needed to leave `Tentative`. `None` confirms on creation.
    pub confirm_hits: Option<u32>,
}

impl LifecyclePolicy {
    pub fn new(max_misses: u32, confirm_hits: Option<u32>) -> Self {
        Self {
            max_misses,
            confirm_hits,
        }
    }

    /// Bookkeeping for a freshly created object.
    pub fn on_create(&self, object: &mut TrackedObject) {
        object.consecutive_hits = 1;
        object.consecutive_misses = 0;
        object.is_confirmed = self.confirm_hits.is_none_or(|n| n <= 1);
    }

    pub fn record_hit(&self, object: &mut TrackedObject) {
        object.consecutive_misses = 0;
        object.consecutive_hits = object.consecutive_hits.saturating_add(1);
        object.age = object.age.saturating_add(1);
        if !object.is_confirmed {
            object.is_confirmed = self
                .confirm_hits
                .is_none_or(|n| object.consecutive_hits >= n);
        }
    }

    pub fn record_miss(&self, object: &mut TrackedObject) {
        object.consecutive_hits = 0;
        object.consecutive_misses = object.consecutive_misses.saturating_add(1);
        object.age = object.age.saturating_add(1);
    }

    pub fn should_evict(&self, object: &TrackedObject) -> bool {
        object.consecutive_misses >= self.max_misses
    }

    /// Remove every object past the miss threshold and return their ids.
    ///
    /// Dropping the object also drops its appearance tracker.
    pub fn evict(&self, registry: &mut TrackRegistry) -> Vec<u64> {
        let doomed: Vec<u64> = registry
            .iter()
            .filter(|o| self.should_evict(o))
            .map(|o| o.id)
            .collect();

        for &id in &doomed {
            if let Some(obj) = registry.remove(id) {
                debug!(
                    "Evicting track {} after {} consecutive misses",
                    id, obj.consecutive_misses
                );
            }
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::matching::Observation;
    use crate::tracker::track_state::TrackStatus;

    fn new_object(policy: &LifecyclePolicy, id: u64) -> TrackedObject {
        let mut obj = TrackedObject::new(id, &Observation::new(0.0, 0.0, 10.0, 10.0, 0.9));
        policy.on_create(&mut obj);
        obj
    }

    #[test]
    fn test_confirmation_after_hits() {
        let policy = LifecyclePolicy::new(3, Some(3));
        let mut obj = new_object(&policy, 1);
        assert_eq!(obj.status(), TrackStatus::Tentative);

        policy.record_hit(&mut obj);
        assert_eq!(obj.status(), TrackStatus::Tentative);
        policy.record_hit(&mut obj);
        assert_eq!(obj.status(), TrackStatus::Confirmed);

        policy.record_miss(&mut obj);
        assert_eq!(obj.status(), TrackStatus::Lost);
        policy.record_hit(&mut obj);
        assert_eq!(obj.status(), TrackStatus::Confirmed);
    }

    #[test]
    fn test_confirmed_on_creation_without_threshold() {
        let policy = LifecyclePolicy::new(3, None);
        let obj = new_object(&policy, 1);
        assert_eq!(obj.status(), TrackStatus::Confirmed);
    }

    #[test]
    fn test_miss_resets_hits_and_hit_resets_misses() {
        let policy = LifecyclePolicy::new(3, Some(3));
        let mut obj = new_object(&policy, 1);
        policy.record_hit(&mut obj);
        policy.record_miss(&mut obj);
        assert_eq!(obj.consecutive_hits, 0);
        assert_eq!(obj.consecutive_misses, 1);

        policy.record_hit(&mut obj);
        assert_eq!(obj.consecutive_misses, 0);
        assert_eq!(obj.consecutive_hits, 1);
        assert_eq!(obj.status(), TrackStatus::Tentative);
    }

    #[test]
    fn test_evict_at_threshold() {
        let policy = LifecyclePolicy::new(2, None);
        let mut registry = TrackRegistry::new();
        for _ in 0..2 {
            let id = registry.issue_id();
            registry.put(new_object(&policy, id));
        }

        if let Some(obj) = registry.get_mut(1) {
            policy.record_miss(obj);
        }
        assert!(policy.evict(&mut registry).is_empty());

        if let Some(obj) = registry.get_mut(1) {
            policy.record_miss(obj);
        }
        assert_eq!(policy.evict(&mut registry), vec![1]);
        assert_eq!(registry.all_ids(), vec![2]);
    }
}
