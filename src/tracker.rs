//! Spatiotemporal re-identification: assigns persistent global identities to
//! per-frame detections using center distance, frame age and class-continuity
//! gating.

mod continuity;
mod detection;
mod identity_manager;
mod matching;
mod record;

pub use continuity::ContinuityMap;
pub use detection::Detection;
pub use identity_manager::{IdentityManager, ReidConfig};
pub use matching::{AssignmentResult, gated_distances, greedy_assignment};
pub use record::TrackRecord;
