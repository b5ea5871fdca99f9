//! Spatially-grounded multi-object tracking.
//!
//! Turns per-frame 2D detections from an external vision model into stable
//! object tracks: each detection receives a persistent global identity, an
//! optional monocular 3D position (camera and world space, when the object's
//! physical height is known), and a smoothed position stream for trajectory
//! rendering.

pub mod geometry;
pub mod integration;
pub mod smoothing;
pub mod tracker;

pub use geometry::{BBox, CalibrationError, CameraConfig, Intrinsics, Localizer, PositionEstimate};
pub use integration::{
    DetectionBuilder, DetectionSource, PipelineError, SessionConfig, TrackedObject,
    TrackerPipeline, TrackingSession, sanitize_detections,
};
pub use smoothing::{SmootherConfig, SmoothingPolicy, TrackSmoother};
pub use tracker::{ContinuityMap, Detection, IdentityManager, ReidConfig, TrackRecord};
