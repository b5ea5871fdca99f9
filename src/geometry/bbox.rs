use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in TLBR pixel coordinates.
///
/// A well-formed box satisfies `x1 < x2` and `y1 < y2`; degenerate boxes are
/// filtered out by [`crate::integration::sanitize_detections`] before they
/// reach the tracking core.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge x coordinate
    pub x1: f32,
    /// Top edge y coordinate
    pub y1: f32,
    /// Right edge x coordinate
    pub x2: f32,
    /// Bottom edge y coordinate
    pub y2: f32,
}

impl BBox {
    /// Create a box from TLBR coordinates.
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from center coordinates and dimensions (XYWH format).
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    /// Create a box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + w,
            y2: y + h,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Midpoint of the bottom edge, where an upright object meets the ground.
    #[inline]
    pub fn bottom_center(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    /// Whether the box has no positive extent in either axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Clamp the box to a `width` x `height` frame.
    ///
    /// The result may be degenerate if the box lies entirely outside the frame.
    pub fn clamp_to_frame(&self, width: u32, height: u32) -> Self {
        let max_x = (width.saturating_sub(1)) as f32;
        let max_y = (height.saturating_sub(1)) as f32;
        Self {
            x1: self.x1.max(0.0),
            y1: self.y1.max(0.0),
            x2: self.x2.min(max_x),
            y2: self.y2.min(max_y),
        }
    }
}
