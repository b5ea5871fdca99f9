use std::collections::{HashMap, VecDeque};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::smoothing::policy::SmoothingPolicy;

/// Parameters for one coordinate space's smoother.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmootherConfig {
    pub policy: SmoothingPolicy,
    /// Frames without an update after which history is discarded
    pub gap_reset_frames: u64,
    /// Position jump beyond which history is discarded, in the space's units
    pub teleport_threshold: f64,
}

impl SmootherConfig {
    /// Defaults for the pixel-center stream.
    pub fn pixel() -> Self {
        Self {
            policy: SmoothingPolicy::default(),
            gap_reset_frames: 60,
            teleport_threshold: 300.0,
        }
    }

    /// Defaults for the world ground-plane stream, in meters.
    pub fn world() -> Self {
        Self {
            teleport_threshold: 1.5,
            ..Self::pixel()
        }
    }
}

/// Bounded trail of smoothed outputs for one identity.
#[derive(Debug, Clone)]
struct Trail {
    points: VecDeque<(u64, Vector2<f64>)>,
}

impl Trail {
    fn new() -> Self {
        Self {
            points: VecDeque::new(),
        }
    }

    fn last(&self) -> Option<(u64, Vector2<f64>)> {
        self.points.back().copied()
    }

    fn push(&mut self, frame_index: u64, point: Vector2<f64>, capacity: usize) {
        while self.points.len() >= capacity {
            self.points.pop_front();
        }
        self.points.push_back((frame_index, point));
    }

    fn positions(&self) -> Vec<Vector2<f64>> {
        self.points.iter().map(|&(_, p)| p).collect()
    }
}

/// Per-identity temporal filter for one coordinate space.
///
/// State is created on first observation, cleared by gap or teleport resets,
/// and evicted via [`TrackSmoother::forget`]/[`TrackSmoother::retain`] when
/// the identity manager drops an id.
#[derive(Debug, Clone)]
pub struct TrackSmoother {
    config: SmootherConfig,
    trails: HashMap<u64, Trail>,
}

impl TrackSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            trails: HashMap::new(),
        }
    }

    /// Filter one raw observation for `global_id` at `frame_index`.
    ///
    /// Reset triggers run first: a gap of `gap_reset_frames` or a jump beyond
    /// `teleport_threshold` discards history, and the raw value is returned
    /// unfiltered as the new seed.
    pub fn smooth(
        &mut self,
        global_id: u64,
        frame_index: u64,
        raw: Vector2<f64>,
    ) -> Vector2<f64> {
        let capacity = self.config.policy.history_capacity();
        let trail = self.trails.entry(global_id).or_insert_with(Trail::new);

        if let Some((last_frame, last_point)) = trail.last() {
            if frame_index.saturating_sub(last_frame) >= self.config.gap_reset_frames {
                trace!(global_id, frame_index, "gap reset");
                trail.points.clear();
            } else if (raw - last_point).norm() > self.config.teleport_threshold {
                trace!(global_id, frame_index, "teleport reset");
                trail.points.clear();
            }
        }

        let smoothed = match trail.last() {
            None => raw,
            Some(_) => self.config.policy.step(&trail.positions(), raw),
        };
        trail.push(frame_index, smoothed, capacity);
        smoothed
    }

    /// Absence passthrough: an absent raw position leaves state untouched
    /// and propagates unchanged.
    pub fn smooth_optional(
        &mut self,
        global_id: u64,
        frame_index: u64,
        raw: Option<Vector2<f64>>,
    ) -> Option<Vector2<f64>> {
        raw.map(|point| self.smooth(global_id, frame_index, point))
    }

    /// Drop the state of one identity.
    pub fn forget(&mut self, global_id: u64) {
        self.trails.remove(&global_id);
    }

    /// Keep only identities accepted by the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(u64) -> bool) {
        self.trails.retain(|&gid, _| keep(gid));
    }

    /// Drop all state.
    pub fn clear(&mut self) {
        self.trails.clear();
    }

    pub fn tracked_ids(&self) -> usize {
        self.trails.len()
    }
}
