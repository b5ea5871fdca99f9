use nalgebra::Point2;

use crate::geometry::BBox;
use crate::tracker::Detection;

/// Last known state of one tracked identity.
///
/// A record lives in exactly one of the identity manager's pools: `active`
/// (updated recently) or `inactive` (retained for possible revival).
#[derive(Debug, Clone)]
pub struct TrackRecord {
    /// Persistent global identity
    pub global_id: u64,
    /// Class index at the last observation
    pub class_index: usize,
    /// Bounding box at the last observation
    pub bbox: BBox,
    /// Pixel center at the last observation
    pub center: Point2<f32>,
    /// Frame index of the last observation
    pub last_frame: u64,
}

impl TrackRecord {
    pub fn new(global_id: u64, detection: &Detection, frame_index: u64) -> Self {
        Self {
            global_id,
            class_index: detection.class_index,
            bbox: detection.bbox,
            center: detection.center,
            last_frame: frame_index,
        }
    }

    /// Frames elapsed since the last observation, or `None` when the record
    /// was last seen after `frame_index` (never eligible for matching).
    #[inline]
    pub fn age(&self, frame_index: u64) -> Option<u64> {
        frame_index.checked_sub(self.last_frame)
    }

    /// Absorb a matched detection, keeping the identity and class.
    pub fn update(&mut self, detection: &Detection, frame_index: u64) {
        self.bbox = detection.bbox;
        self.center = detection.center;
        self.last_frame = frame_index;
    }
}
