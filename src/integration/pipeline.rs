//! TrackerPipeline for alternating detection and per-object tracking.

use log::{info, warn};

use crate::error::{Result, TrackError};
use crate::tracker::{
    AppearanceTrackerFactory, CycleMode, CycleReport, Frame, IdentityTracker, TrackSnapshot,
    TrackerConfig,
};

use super::{AttributeExtractor, ClassNames, DetectionSource, FrameSource};

/// Configuration for the [`TrackerPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Run the detector every `detect_interval` frames
    pub detect_interval: u32,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detect_interval: 10,
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.detect_interval == 0 {
            return Err(TrackError::InvalidConfig(
                "detect_interval must be at least 1".into(),
            ));
        }
        self.tracker.validate()
    }
}

/// How positions are carried between detector runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Centroid matching only; tracks hold still between detections.
    Centroid,
    /// Centroid matching on detect frames, appearance trackers in between.
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Processed(CycleReport),
    /// The frame source has no more frames.
    EndOfStream,
}

/// Drives the detect/interpolate cadence around an [`IdentityTracker`].
///
/// Frame 0 and every `detect_interval`-th frame after it run the detector and
/// re-associate; all other frames run the per-object appearance trackers
/// when a factory is installed.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: IdentityTracker,
    detect_interval: u32,
    counter: u32,
    factory: Option<Box<dyn AppearanceTrackerFactory>>,
    extractor: Option<Box<dyn AttributeExtractor>>,
    class_names: Option<ClassNames>,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and config.
    pub fn new(detector: D, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector,
            tracker: IdentityTracker::new(config.tracker)?,
            detect_interval: config.detect_interval,
            counter: 0,
            factory: None,
            extractor: None,
            class_names: None,
        })
    }

    /// Create a new tracking pipeline with default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self {
            detector,
            tracker: IdentityTracker::default(),
            detect_interval: PipelineConfig::default().detect_interval,
            counter: 0,
            factory: None,
            extractor: None,
            class_names: None,
        }
    }

    /// Switch to the hybrid strategy using trackers from `factory`.
    pub fn with_appearance_factory(
        mut self,
        factory: impl AppearanceTrackerFactory + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn with_attribute_extractor(mut self, extractor: impl AttributeExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    pub fn with_class_names(mut self, names: ClassNames) -> Self {
        self.class_names = Some(names);
        self
    }

    pub fn strategy(&self) -> Strategy {
        if self.factory.is_some() {
            Strategy::Hybrid
        } else {
            Strategy::Centroid
        }
    }

    /// Cycle mode for a given position in the cadence.
    pub fn mode_for(&self, counter: u32) -> CycleMode {
        if counter % self.detect_interval == 0 {
            CycleMode::Detect
        } else {
            CycleMode::Interpolate
        }
    }

    /// Mode the next processed frame will use.
    pub fn next_mode(&self) -> CycleMode {
        self.mode_for(self.counter)
    }

    /// Process a single frame and report what changed.
    ///
    /// Per-frame failures (detector errors, invalid boxes, lost objects) are
    /// absorbed here and never abort the stream.
    pub fn process_frame(&mut self, frame: &Frame) -> CycleReport {
        let report = match self.next_mode() {
            CycleMode::Detect => self.detect_cycle(frame),
            CycleMode::Interpolate if self.factory.is_some() => self.tracker.interpolate(frame),
            CycleMode::Interpolate => self.tracker.coast(),
        };
        self.counter = (self.counter + 1) % self.detect_interval;
        report
    }

    /// Pull one frame from `source` and process it.
    pub fn step<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> StepOutcome {
        match source.next_frame() {
            Some(frame) => StepOutcome::Processed(self.process_frame(&frame)),
            None => {
                info!(
                    "Frame source exhausted after {} cycles, {} live tracks",
                    self.tracker.cycle(),
                    self.tracker.registry().len()
                );
                StepOutcome::EndOfStream
            }
        }
    }

    /// Process frames until the source is exhausted, handing each cycle's
    /// report and snapshot to `on_cycle`. Returns the number of frames processed.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_cycle: F) -> u64
    where
        S: FrameSource + ?Sized,
        F: FnMut(&CycleReport, &[TrackSnapshot]),
    {
        let mut processed = 0;
        while let StepOutcome::Processed(report) = self.step(source) {
            processed += 1;
            on_cycle(&report, &self.snapshot());
        }
        processed
    }

    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        self.tracker.snapshot()
    }

    fn detect_cycle(&mut self, frame: &Frame) -> CycleReport {
        let mut observations = match self.detector.detect(frame) {
            Ok(observations) => observations,
            Err(e) => {
                warn!(
                    "Detector failed on cycle {}, treating as empty: {:?}",
                    self.tracker.cycle() + 1,
                    e
                );
                Vec::new()
            }
        };

        if let Some(extractor) = &self.extractor {
            for obs in observations.iter_mut() {
                if obs.attribute.is_none() && obs.bbox.is_valid() {
                    obs.attribute = extractor.extract(frame, obs.bbox);
                }
            }
        }

        let report = self.tracker.update(observations);

        let registry = self.tracker.registry_mut();
        for &id in report.matched.iter().chain(report.created.iter()) {
            let Some(track) = registry.get_mut(id) else {
                continue;
            };
            if let (Some(names), Some(class_id)) = (&self.class_names, track.class_id) {
                track.class_label = names.label(class_id).map(String::from);
            }
            if let Some(factory) = &self.factory {
                track.set_appearance_tracker(factory.create(frame, track.bbox()));
            }
        }

        report
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut IdentityTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Observation, Rect};

    struct MockDetector {
        observations: Vec<Observation>,
        calls: usize,
    }

    impl DetectionSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: &Frame) -> std::result::Result<Vec<Observation>, Self::Error> {
            self.calls += 1;
            Ok(self.observations.clone())
        }
    }

    struct FailingDetector;

    impl DetectionSource for FailingDetector {
        type Error = String;

        fn detect(&mut self, _frame: &Frame) -> std::result::Result<Vec<Observation>, Self::Error> {
            Err("model not loaded".into())
        }
    }

    fn mock(observations: Vec<Observation>) -> MockDetector {
        MockDetector {
            observations,
            calls: 0,
        }
    }

    #[test]
    fn test_cadence() {
        let config = PipelineConfig {
            detect_interval: 3,
            ..Default::default()
        };
        let mut pipeline = TrackerPipeline::new(mock(vec![]), config).unwrap();
        let frame = Frame::empty(640, 480);

        let modes: Vec<CycleMode> = (0..7).map(|_| pipeline.process_frame(&frame).mode).collect();
        assert_eq!(
            modes,
            vec![
                CycleMode::Detect,
                CycleMode::Interpolate,
                CycleMode::Interpolate,
                CycleMode::Detect,
                CycleMode::Interpolate,
                CycleMode::Interpolate,
                CycleMode::Detect,
            ]
        );
        assert_eq!(pipeline.detector().calls, 3);
    }

    #[test]
    fn test_interval_one_always_detects() {
        let config = PipelineConfig {
            detect_interval: 1,
            ..Default::default()
        };
        let pipeline = TrackerPipeline::new(mock(vec![]), config).unwrap();
        assert!((0..5).all(|c| pipeline.mode_for(c) == CycleMode::Detect));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PipelineConfig {
            detect_interval: 0,
            ..Default::default()
        };
        assert!(TrackerPipeline::new(mock(vec![]), config).is_err());
    }

    #[test]
    fn test_detector_failure_is_empty_cycle() {
        let mut pipeline = TrackerPipeline::with_default_config(FailingDetector);
        let report = pipeline.process_frame(&Frame::empty(640, 480));
        assert_eq!(report.mode, CycleMode::Detect);
        assert!(report.created.is_empty());
        assert!(pipeline.snapshot().is_empty());
    }

    #[test]
    fn test_centroid_strategy_coasts() {
        let obs = vec![Observation::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.9)];
        let mut pipeline = TrackerPipeline::with_default_config(mock(obs));
        assert_eq!(pipeline.strategy(), Strategy::Centroid);

        let frame = Frame::empty(640, 480);
        pipeline.process_frame(&frame);
        let report = pipeline.process_frame(&frame);
        assert_eq!(report.mode, CycleMode::Interpolate);
        assert!(report.missed.is_empty());
        assert_eq!(pipeline.tracker().registry().get(1).map(|t| t.consecutive_misses), Some(0));
    }

    #[test]
    fn test_class_names_and_attributes() {
        let obs = vec![Observation::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.9).with_class(1)];
        let mut pipeline = TrackerPipeline::with_default_config(mock(obs))
            .with_class_names(ClassNames::parse("buoy\nboat\n"))
            .with_attribute_extractor(|_: &Frame, _: Rect| Some("red".to_string()));

        pipeline.process_frame(&Frame::empty(640, 480));
        let snap = pipeline.snapshot();
        assert_eq!(snap[0].class_label.as_deref(), Some("boat"));
        assert_eq!(snap[0].attribute.as_deref(), Some("red"));
    }

    #[test]
    fn test_step_end_of_stream() {
        let mut pipeline = TrackerPipeline::with_default_config(mock(vec![]));
        let mut source = vec![Frame::empty(1, 1)].into_iter();
        assert!(matches!(pipeline.step(&mut source), StepOutcome::Processed(_)));
        assert_eq!(pipeline.step(&mut source), StepOutcome::EndOfStream);
    }
}
