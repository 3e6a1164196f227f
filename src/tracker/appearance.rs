//! Per-object appearance tracking between detector runs.

use crate::tracker::rect::Rect;

/// An opaque frame buffer handed to the collaborators.
///
/// The layout of `data` is whatever the detector and appearance trackers
/// agree on; the identity tracker never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// A frame of the given size with no pixel data attached.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(Vec::new(), width, height)
    }
}

/// Single-object visual tracker (KCF, CSRT, ...).
///
/// One instance is owned by each tracked object and dropped with it.
pub trait AppearanceTracker: Send {
    /// Locate the object in `frame` given its last known box.
    ///
    /// Returns `None` when the object could not be found this frame.
    fn track(&mut self, frame: &Frame, last_box: Rect) -> Option<Rect>;
}

impl<F> AppearanceTracker for F
where
    F: FnMut(&Frame, Rect) -> Option<Rect> + Send,
{
    fn track(&mut self, frame: &Frame, last_box: Rect) -> Option<Rect> {
        self(frame, last_box)
    }
}

/// Creates appearance trackers initialised on a frame and box.
pub trait AppearanceTrackerFactory {
    fn create(&self, frame: &Frame, bbox: Rect) -> Box<dyn AppearanceTracker>;
}
