//! Traits for the collaborators around the identity tracker.

use crate::tracker::{Frame, Observation, Rect};

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
///
/// # Example
///
/// ```ignore
/// use centrack_rs::{DetectionSource, Frame, Observation};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame) -> Result<Vec<Observation>, Self::Error> {
///         // Run inference and return observations
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::fmt::Debug;

    /// Run inference on a frame and return observations in the frame's
    /// pixel coordinates.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Observation>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Observation`s.
pub trait IntoObservations {
    fn into_observations(self) -> Vec<Observation>;
}

impl IntoObservations for Vec<Observation> {
    fn into_observations(self) -> Vec<Observation> {
        self
    }
}

/// `(bbox, class_id, confidence)` triples as most detectors emit them.
impl IntoObservations for Vec<(Rect, u32, f32)> {
    fn into_observations(self) -> Vec<Observation> {
        self.into_iter()
            .map(|(bbox, class_id, confidence)| {
                Observation::from_rect(bbox, confidence).with_class(class_id)
            })
            .collect()
    }
}

/// Computes an opaque descriptor for a detected box, e.g. its dominant colour.
pub trait AttributeExtractor {
    fn extract(&self, frame: &Frame, bbox: Rect) -> Option<String>;
}

impl<F> AttributeExtractor for F
where
    F: Fn(&Frame, Rect) -> Option<String>,
{
    fn extract(&self, frame: &Frame, bbox: Rect) -> Option<String> {
        self(frame, bbox)
    }
}

/// Upstream frame supplier. `None` means the stream is exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<I> FrameSource for I
where
    I: Iterator<Item = Frame>,
{
    fn next_frame(&mut self) -> Option<Frame> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triples_into_observations() {
        let raw = vec![(Rect::new(1.0, 2.0, 3.0, 4.0), 7u32, 0.5f32)];
        let obs = raw.into_observations();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].class_id, Some(7));
        assert_eq!(obs[0].confidence, 0.5);
        assert_eq!(obs[0].bbox, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_iterator_frame_source() {
        let mut source = vec![Frame::empty(2, 2)].into_iter();
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
    }
}
