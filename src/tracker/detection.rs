use nalgebra::Point2;
use ndarray::Array2;

use crate::geometry::BBox;

/// One detected object in one frame, as supplied by the external detector.
///
/// The tracking core never mutates a detection; it only reads the class,
/// center and bounding box. The segmentation mask, when present, is carried
/// through untouched for downstream compositing.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Index into the session's class label list
    pub class_index: usize,
    /// Human-readable class label
    pub label: String,
    /// Bounding box in TLBR pixel coordinates
    pub bbox: BBox,
    /// Pixel center of the bounding box
    pub center: Point2<f32>,
    /// Optional per-pixel segmentation mask (frame-sized, row-major)
    pub mask: Option<Array2<bool>>,
}

impl Detection {
    /// Create a detection; the center is derived from the box.
    pub fn new(class_index: usize, label: impl Into<String>, bbox: BBox) -> Self {
        Self {
            class_index,
            label: label.into(),
            center: bbox.center(),
            bbox,
            mask: None,
        }
    }

    /// Attach a segmentation mask.
    pub fn with_mask(mut self, mask: Array2<bool>) -> Self {
        self.mask = Some(mask);
        self
    }
}
