//! Pixel-space and 3D geometry: bounding boxes, pinhole intrinsics and the
//! monocular ground-plane localizer.

mod bbox;
mod localizer;

pub use bbox::BBox;
pub use localizer::{CalibrationError, CameraConfig, Intrinsics, Localizer, PositionEstimate};
