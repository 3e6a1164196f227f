//! Identity tracking engine: association, update and eviction per cycle.

use std::fmt;

use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::error::{Result, TrackError};
use crate::tracker::appearance::Frame;
use crate::tracker::lifecycle::LifecyclePolicy;
use crate::tracker::matching::{self, AssignmentPolicy, AssignmentResult, Observation};
use crate::tracker::rect::{Rect, centroid_distance_batch};
use crate::tracker::registry::TrackRegistry;
use crate::tracker::track_state::TrackStatus;
use crate::tracker::tracked_object::TrackedObject;

/// Configuration for the [`IdentityTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Consecutive misses after which a track is evicted
    pub max_misses: u32,
    /// Consecutive hits required to confirm a track, `None` to confirm at once
    pub confirm_hits: Option<u32>,
    /// Largest centroid distance (pixels) accepted as a match
    pub max_distance: Option<f32>,
    pub assignment: AssignmentPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_misses: 5,
            confirm_hits: None,
            max_distance: None,
            assignment: AssignmentPolicy::Greedy,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_misses == 0 {
            return Err(TrackError::InvalidConfig(
                "max_misses must be at least 1".into(),
            ));
        }
        if self.confirm_hits == Some(0) {
            return Err(TrackError::InvalidConfig(
                "confirm_hits must be at least 1".into(),
            ));
        }
        if let Some(d) = self.max_distance {
            if !d.is_finite() || d <= 0.0 {
                return Err(TrackError::InvalidConfig(format!(
                    "max_distance must be positive and finite, got {}",
                    d
                )));
            }
        }
        Ok(())
    }

    pub fn lifecycle(&self) -> LifecyclePolicy {
        LifecyclePolicy::new(self.max_misses, self.confirm_hits)
    }
}

/// Which path a cycle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Full detector run and re-association
    Detect,
    /// Positions carried forward by per-object appearance trackers
    Interpolate,
}

impl fmt::Display for CycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleMode::Detect => f.write_str("detect"),
            CycleMode::Interpolate => f.write_str("interpolate"),
        }
    }
}

/// Summary of what one cycle did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub mode: CycleMode,
    pub matched: Vec<u64>,
    pub created: Vec<u64>,
    pub missed: Vec<u64>,
    pub evicted: Vec<u64>,
    /// Observations rejected as invalid
    pub dropped: usize,
}

impl CycleReport {
    fn new(cycle: u64, mode: CycleMode) -> Self {
        Self {
            cycle,
            mode,
            matched: Vec::new(),
            created: Vec::new(),
            missed: Vec::new(),
            evicted: Vec::new(),
            dropped: 0,
        }
    }
}

/// Read-only view of one track, taken after the lifecycle pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    pub id: u64,
    pub bbox: Rect,
    pub class_id: Option<u32>,
    pub class_label: Option<String>,
    pub attribute: Option<String>,
    pub status: TrackStatus,
}

impl From<&TrackedObject> for TrackSnapshot {
    fn from(obj: &TrackedObject) -> Self {
        Self {
            id: obj.id,
            bbox: obj.bbox(),
            class_id: obj.class_id,
            class_label: obj.class_label.clone(),
            attribute: obj.attribute.clone(),
            status: obj.status(),
        }
    }
}

impl fmt::Display for TrackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match (&self.class_label, self.class_id) {
            (Some(label), _) => label.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "-".to_string(),
        };
        write!(
            f,
            "id={} class={} attr={} status={} box=[{:.1},{:.1},{:.1},{:.1}]",
            self.id,
            class,
            self.attribute.as_deref().unwrap_or("-"),
            self.status,
            self.bbox.x,
            self.bbox.y,
            self.bbox.width,
            self.bbox.height
        )
    }
}

pub struct IdentityTracker {
    registry: TrackRegistry,
    config: TrackerConfig,
    policy: LifecyclePolicy,
    cycle: u64,
}

impl Default for IdentityTracker {
    fn default() -> Self {
        let config = TrackerConfig::default();
        Self {
            registry: TrackRegistry::new(),
            policy: config.lifecycle(),
            config,
            cycle: 0,
        }
    }
}

impl IdentityTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: TrackRegistry::new(),
            policy: config.lifecycle(),
            config,
            cycle: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TrackRegistry {
        &mut self.registry
    }

    /// Number of cycles processed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Detect cycle: associate `observations` with the live tracks by
    /// centroid distance, then run the eviction pass.
    pub fn update(&mut self, observations: Vec<Observation>) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport::new(self.cycle, CycleMode::Detect);

        let observations: Vec<Observation> = observations
            .into_iter()
            .filter(|obs| {
                if obs.bbox.is_valid() {
                    return true;
                }
                let err = TrackError::InvalidObservation {
                    width: obs.bbox.width,
                    height: obs.bbox.height,
                };
                warn!("Cycle {}: dropping observation: {}", self.cycle, err);
                report.dropped += 1;
                false
            })
            .collect();

        let track_ids = self.registry.all_ids();
        let track_rects: Vec<Rect> = self.registry.iter().map(|t| t.bbox()).collect();
        let obs_rects: Vec<Rect> = observations.iter().map(|o| o.bbox).collect();
        let dists = centroid_distance_batch(&track_rects, &obs_rects);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_observations,
        } = matching::assign(&dists, self.config.assignment, self.config.max_distance);

        for (itrack, iobs) in matches {
            let id = track_ids[itrack];
            if let Some(track) = self.registry.get_mut(id) {
                trace!(
                    "Cycle {}: track {} matched observation {} at distance {:.2}",
                    self.cycle,
                    id,
                    iobs,
                    dists[[itrack, iobs]]
                );
                track.update(&observations[iobs]);
                self.policy.record_hit(track);
                report.matched.push(id);
            }
        }

        for itrack in unmatched_tracks {
            let id = track_ids[itrack];
            if let Some(track) = self.registry.get_mut(id) {
                self.policy.record_miss(track);
                report.missed.push(id);
            }
        }

        for iobs in unmatched_observations {
            let id = self.registry.issue_id();
            let mut track = TrackedObject::new(id, &observations[iobs]);
            self.policy.on_create(&mut track);
            self.registry.put(track);
            report.created.push(id);
        }

        report.evicted = self.policy.evict(&mut self.registry);
        self.log_report(&report);
        report
    }

    /// Interpolate cycle: move every track with its own appearance tracker.
    ///
    /// A tracker failure counts as a miss. Tracks without an appearance
    /// tracker are left as they are.
    pub fn interpolate(&mut self, frame: &Frame) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport::new(self.cycle, CycleMode::Interpolate);

        // Each call only touches its own track, so they can run side by side.
        let outcomes: Vec<(u64, Option<bool>)> = self
            .registry
            .objects_mut()
            .par_iter_mut()
            .map(|(&id, track)| (id, track.track_appearance(frame)))
            .collect();

        for (id, outcome) in outcomes {
            let Some(located) = outcome else {
                continue;
            };
            if let Some(track) = self.registry.get_mut(id) {
                if located {
                    self.policy.record_hit(track);
                    report.matched.push(id);
                } else {
                    self.policy.record_miss(track);
                    report.missed.push(id);
                }
            }
        }

        report.evicted = self.policy.evict(&mut self.registry);
        self.log_report(&report);
        report
    }

    /// A cycle in which nothing is observed and nothing is counted.
    pub fn coast(&mut self) -> CycleReport {
        self.cycle += 1;
        CycleReport::new(self.cycle, CycleMode::Interpolate)
    }

    /// Live tracks in creation order.
    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        self.registry.iter().map(TrackSnapshot::from).collect()
    }

    fn log_report(&self, report: &CycleReport) {
        debug!(
            "Cycle {} ({}): matched={} created={} missed={} evicted={} dropped={} live={}",
            report.cycle,
            report.mode,
            report.matched.len(),
            report.created.len(),
            report.missed.len(),
            report.evicted.len(),
            report.dropped,
            self.registry.len()
        );
    }
}
