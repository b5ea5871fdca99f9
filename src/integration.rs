//! Integration layer connecting an external detection backend to the
//! tracking core.
//!
//! Provides the `DetectionSource` seam for inference backends, detection
//! construction and sanitization helpers, and the per-stream
//! `TrackingSession` / `TrackerPipeline` that wire the identity manager,
//! localizer and smoothers together.

mod builder;
mod detector;
mod pipeline;

pub use builder::{DetectionBuilder, sanitize_detections};
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::{PipelineError, SessionConfig, TrackedObject, TrackerPipeline, TrackingSession};
