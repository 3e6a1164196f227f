//! Identity tracking for video streams.
//!
//! Objects are detected every few frames by an external detector and followed
//! in between by lightweight per-object trackers. The [`tracker`] module keeps
//! stable ids across those cycles; [`integration`] wires the collaborators and
//! drives the detect/interpolate cadence.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackError};
pub use integration::{
    AttributeExtractor, ClassNames, DetectionSource, FrameSource, IntoObservations,
    ObservationBuilder, PipelineConfig, StepOutcome, Strategy, TrackerPipeline,
};
pub use tracker::{
    AppearanceTracker, AppearanceTrackerFactory, AssignmentPolicy, CycleMode, CycleReport, Frame,
    IdentityTracker, LifecyclePolicy, Observation, Rect, TrackRegistry, TrackSnapshot,
    TrackStatus, TrackedObject, TrackerConfig,
};
