use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// EMA step used when direction-weighted smoothing lacks motion history.
const FALLBACK_ALPHA: f64 = 0.5;

const DIR_EPSILON: f64 = 1e-6;

/// Filtering policy. Both variants satisfy the same reset and absence
/// contract; pick one per deployment, do not hybridize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SmoothingPolicy {
    /// Exponential moving average: `s = prev + alpha * (raw - prev)`.
    Ema {
        /// Blend factor in (0, 1]; higher is more responsive
        alpha: f64,
    },
    /// Attenuates motion perpendicular to the recent average direction.
    DirectionWeighted {
        /// Number of recent trail points used for the average direction
        history: usize,
        /// Fraction of perpendicular ("wobble") motion to suppress, in [0, 1]
        penalty: f64,
    },
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
        Self::DirectionWeighted {
            history: 10,
            penalty: 0.65,
        }
    }
}

impl SmoothingPolicy {
    /// Points of smoothed trail each identity needs to retain.
    pub(crate) fn history_capacity(&self) -> usize {
        match self {
            Self::Ema { .. } => 1,
            Self::DirectionWeighted { history, .. } => history + 2,
        }
    }

    /// Produce the next smoothed point from the previous trail and the raw
    /// observation. `trail` is ordered oldest to newest and never empty.
    pub(crate) fn step(&self, trail: &[Vector2<f64>], raw: Vector2<f64>) -> Vector2<f64> {
        let prev = trail[trail.len() - 1];
        match *self {
            Self::Ema { alpha } => prev + (raw - prev) * alpha,
            Self::DirectionWeighted { history, penalty } => {
                let step = raw - prev;
                match average_direction(trail, history) {
                    Some(dir) => {
                        let parallel = dir * step.dot(&dir);
                        let perpendicular = step - parallel;
                        prev + parallel + perpendicular * (1.0 - penalty)
                    }
                    None => prev + step * FALLBACK_ALPHA,
                }
            }
        }
    }
}

/// Average unit direction over the deltas of the trail's last `history`
/// points, or `None` when there is not enough distinct motion to define one.
fn average_direction(trail: &[Vector2<f64>], history: usize) -> Option<Vector2<f64>> {
    if trail.len() < 2 {
        return None;
    }
    let start = trail.len().saturating_sub(history);
    let mut sum = Vector2::zeros();
    for pair in trail[start..].windows(2) {
        let delta = pair[1] - pair[0];
        let norm = delta.norm();
        if norm > DIR_EPSILON {
            sum += delta / norm;
        }
    }
    let norm = sum.norm();
    if norm < DIR_EPSILON {
        return None;
    }
    Some(sum / norm)
}
