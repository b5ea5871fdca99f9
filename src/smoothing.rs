//! Per-identity temporal filtering of position streams.
//!
//! One [`TrackSmoother`] serves one coordinate space (pixel or world ground
//! plane); a session owns one per stream. Both filtering policies share the
//! same gap/teleport reset contract.

mod policy;
mod smoother;

pub use policy::SmoothingPolicy;
pub use smoother::{SmootherConfig, TrackSmoother};
