use nalgebra::Point2;

/// Axis-aligned bounding box in frame pixel coordinates.
///
/// Stored in TLWH form (top-left x, top-left y, width, height). Detectors
/// commonly emit TLBR corners or a center plus size; both are accepted by the
/// constructors below.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect centered on `(cx, cy)`.
    #[inline]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// A box is usable for tracking only with finite corners and center and
    /// a strictly positive size.
    pub fn is_valid(&self) -> bool {
        let [x1, y1, x2, y2] = self.to_tlbr();
        let c = self.center();
        [x1, y1, x2, y2, self.width, self.height, c.x, c.y]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

use ndarray::Array2;

/// Euclidean distance between box centers.
///
/// Returns a matrix of shape (M, N) where M is the length of `rows`
/// and N is the length of `cols`.
pub fn centroid_distance_batch(rows: &[Rect], cols: &[Rect]) -> Array2<f32> {
    let mut dists = Array2::zeros((rows.len(), cols.len()));
    for (i, a) in rows.iter().enumerate() {
        let ca = a.center();
        for (j, b) in cols.iter().enumerate() {
            dists[[i, j]] = nalgebra::distance(&ca, &b.center());
        }
    }
    dists
}
