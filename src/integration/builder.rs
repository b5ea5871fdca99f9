//! Builder and sanitization helpers for detection inputs.

use ndarray::Array2;

use crate::geometry::BBox;
use crate::tracker::Detection;

/// Builder for creating `Detection` objects from various box formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    class_index: usize,
    label: String,
    bbox: BBox,
    mask: Option<Array2<bool>>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class index and label.
    pub fn class(mut self, class_index: usize, label: impl Into<String>) -> Self {
        self.class_index = class_index;
        self.label = label.into();
        self
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BBox::new(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BBox::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (top-left x, top-left y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = BBox::from_tlwh(x, y, w, h);
        self
    }

    /// Attach a segmentation mask.
    pub fn mask(mut self, mask: Array2<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        let mut det = Detection::new(self.class_index, self.label, self.bbox);
        det.mask = self.mask;
        det
    }
}

/// Clamp detection boxes to the frame and drop degenerate ones.
///
/// The tracking core requires well-formed boxes (`x1 < x2`, `y1 < y2`); this
/// is the filter that guarantees it. Centers are recomputed from the clamped
/// boxes.
pub fn sanitize_detections(
    detections: Vec<Detection>,
    width: u32,
    height: u32,
) -> Vec<Detection> {
    detections
        .into_iter()
        .filter_map(|mut det| {
            det.bbox = det.bbox.clamp_to_frame(width, height);
            if det.bbox.is_degenerate() {
                return None;
            }
            det.center = det.bbox.center();
            Some(det)
        })
        .collect()
}
