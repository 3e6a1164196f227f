mod appearance;
mod engine;
mod lifecycle;
mod matching;
mod rect;
mod registry;
mod track_state;
mod tracked_object;

pub use appearance::{AppearanceTracker, AppearanceTrackerFactory, Frame};
pub use engine::{CycleMode, CycleReport, IdentityTracker, TrackSnapshot, TrackerConfig};
pub use lifecycle::LifecyclePolicy;
pub use matching::{AssignmentPolicy, AssignmentResult, Observation, assign};
pub use rect::{Rect, centroid_distance_batch};
pub use registry::TrackRegistry;
pub use track_state::TrackStatus;
pub use tracked_object::TrackedObject;
