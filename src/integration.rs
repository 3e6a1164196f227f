//! Integration module for connecting detectors, appearance trackers and frame
//! sources with the identity tracker.
//!
//! This module provides the collaborator traits and the pipeline that
//! alternates detect and interpolate cycles.

mod builder;
mod detector;
mod labels;
mod pipeline;

pub use builder::ObservationBuilder;
pub use detector::{AttributeExtractor, DetectionSource, FrameSource, IntoObservations};
pub use labels::ClassNames;
pub use pipeline::{PipelineConfig, StepOutcome, Strategy, TrackerPipeline};
pub use crate::tracker::{AppearanceTracker, AppearanceTrackerFactory, CycleMode, Frame};
