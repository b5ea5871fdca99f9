//! Matching utilities for identity assignment.
//!
//! Candidates are gated by frame age, center distance and class continuity
//! into a detection-by-candidate cost matrix; assignment is then greedy in
//! detection order. This reproduces the deployed nearest-neighbor behavior
//! deliberately: it is order-dependent, not a globally optimal bipartite
//! assignment.

use nalgebra::distance;
use ndarray::Array2;

use crate::tracker::continuity::ContinuityMap;
use crate::tracker::detection::Detection;
use crate::tracker::record::TrackRecord;

/// Cost assigned to pairs excluded by a gate.
const INELIGIBLE: f32 = f32::INFINITY;

/// Outcome of one greedy assignment pass over a candidate pool.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// (detection row, candidate column) pairs
    pub matches: Vec<(usize, usize)>,
    /// Detection rows left without a candidate
    pub unmatched_detections: Vec<usize>,
}

/// Build the gated center-distance matrix between detections and candidate
/// track records.
///
/// An entry is the Euclidean center distance, or infinity when the pair fails
/// any gate: candidate age outside `[0, max_frames]`, distance above
/// `max_radius_px`, or continuity-incompatible classes.
pub fn gated_distances(
    detections: &[&Detection],
    candidates: &[&TrackRecord],
    frame_index: u64,
    max_radius_px: f32,
    max_frames: u64,
    continuity: &ContinuityMap,
) -> Array2<f32> {
    let mut dists = Array2::from_elem((detections.len(), candidates.len()), INELIGIBLE);
    for (j, record) in candidates.iter().enumerate() {
        if !matches!(record.age(frame_index), Some(age) if age <= max_frames) {
            continue;
        }
        for (i, det) in detections.iter().enumerate() {
            if !continuity.compatible(record.class_index, det.class_index) {
                continue;
            }
            let d = distance(&det.center, &record.center);
            if d <= max_radius_px {
                dists[[i, j]] = d;
            }
        }
    }
    dists
}

/// Greedy row-order assignment over a cost matrix.
///
/// Each detection row, in input order, claims the eligible candidate column
/// of minimum cost among those still unclaimed; ties resolve to the earlier
/// column. A row with no eligible unclaimed column goes unmatched.
pub fn greedy_assignment(dists: &Array2<f32>) -> AssignmentResult {
    let (rows, cols) = dists.dim();
    let mut claimed = vec![false; cols];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for i in 0..rows {
        let mut best: Option<(usize, f32)> = None;
        for j in 0..cols {
            if claimed[j] {
                continue;
            }
            let d = dists[[i, j]];
            if d.is_finite() && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        match best {
            Some((j, _)) => {
                claimed[j] = true;
                matches.push((i, j));
            }
            None => unmatched_detections.push(i),
        }
    }

    AssignmentResult {
        matches,
        unmatched_detections,
    }
}
