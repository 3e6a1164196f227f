//! Single tracked object with a stable identity.

use std::fmt;

use nalgebra::Point2;

use crate::tracker::appearance::{AppearanceTracker, Frame};
use crate::tracker::matching::Observation;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackStatus;

pub struct TrackedObject {
    /// Unique track identifier, issued by the registry
    pub id: u64,
    bbox: Rect,
    centroid: Point2<f32>,
    /// Detector class index
    pub class_id: Option<u32>,
    /// Human readable class name, resolved from `class_id`
    pub class_label: Option<String>,
    /// Opaque payload such as the dominant colour
    pub attribute: Option<String>,
    /// Last detection confidence score
    pub confidence: f32,
    /// Consecutive cycles without a match
    pub consecutive_misses: u32,
    /// Consecutive cycles with a match
    pub consecutive_hits: u32,
    /// Number of cycles this object has lived through
    pub age: u32,
    /// Whether the confirmation threshold has been reached
    pub is_confirmed: bool,
    appearance: Option<Box<dyn AppearanceTracker>>,
}

impl TrackedObject {
    /// Create a new object from an observation. The object counts as hit once.
    pub fn new(id: u64, observation: &Observation) -> Self {
        Self {
            id,
            bbox: observation.bbox,
            centroid: observation.bbox.center(),
            class_id: observation.class_id,
            class_label: None,
            attribute: observation.attribute.clone(),
            confidence: observation.confidence,
            consecutive_misses: 0,
            consecutive_hits: 1,
            age: 1,
            is_confirmed: false,
            appearance: None,
        }
    }

    #[inline]
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    #[inline]
    pub fn centroid(&self) -> Point2<f32> {
        self.centroid
    }

    pub fn set_bbox(&mut self, bbox: Rect) {
        self.bbox = bbox;
        self.centroid = bbox.center();
    }

    pub fn status(&self) -> TrackStatus {
        if self.consecutive_misses > 0 {
            TrackStatus::Lost
        } else if self.is_confirmed {
            TrackStatus::Confirmed
        } else {
            TrackStatus::Tentative
        }
    }

    /// Take position and payload from a matched observation.
    ///
    /// Payload fields are only overwritten when the observation carries them.
    pub fn update(&mut self, observation: &Observation) {
        self.set_bbox(observation.bbox);
        self.confidence = observation.confidence;
        if observation.class_id.is_some() {
            self.class_id = observation.class_id;
        }
        if observation.attribute.is_some() {
            self.attribute = observation.attribute.clone();
        }
    }

    pub fn has_appearance_tracker(&self) -> bool {
        self.appearance.is_some()
    }

    /// Install a fresh appearance tracker, dropping the previous one.
    pub fn set_appearance_tracker(&mut self, tracker: Box<dyn AppearanceTracker>) {
        self.appearance = Some(tracker);
    }

    /// Run the appearance tracker on `frame`.
    ///
    /// Returns `None` when the object has no tracker attached, otherwise
    /// whether the object was located.
    pub fn track_appearance(&mut self, frame: &Frame) -> Option<bool> {
        let bbox = self.bbox;
        let tracker = self.appearance.as_mut()?;
        match tracker.track(frame, bbox) {
            Some(new_box) if new_box.is_valid() => {
                self.set_bbox(new_box);
                Some(true)
            }
            _ => Some(false),
        }
    }
}

impl fmt::Debug for TrackedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedObject")
            .field("id", &self.id)
            .field("bbox", &self.bbox)
            .field("class_id", &self.class_id)
            .field("class_label", &self.class_label)
            .field("attribute", &self.attribute)
            .field("consecutive_misses", &self.consecutive_misses)
            .field("consecutive_hits", &self.consecutive_hits)
            .field("status", &self.status())
            .field("appearance", &self.appearance.is_some())
            .finish()
    }
}
