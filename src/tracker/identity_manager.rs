//! The identity manager: a heuristic re-identification state machine.
//!
//! Identities live in two pools. `active` holds records updated in the
//! current or immediately preceding frames; `inactive` holds records that
//! missed an update but remain eligible for revival inside the re-id window.
//! The pools partition all known identities: a record is never in both.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracker::continuity::ContinuityMap;
use crate::tracker::detection::Detection;
use crate::tracker::matching::{gated_distances, greedy_assignment};
use crate::tracker::record::TrackRecord;

/// Re-identification gates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReidConfig {
    /// Maximum center distance for a match, in pixels
    pub max_radius_px: f32,
    /// Maximum frame age for a match; older records are purged
    pub max_frames: u64,
}

impl Default for ReidConfig {
    fn default() -> Self {
        Self {
            max_radius_px: 240.0,
            max_frames: 180,
        }
    }
}

/// Assigns persistent global identities to per-frame detections.
///
/// Owned exclusively by one tracking session; independent camera streams use
/// independent managers. Matching is greedy in detection order: when two
/// detections could claim the same record, the one earlier in the input wins
/// and the other falls through to the next phase or to a fresh identity.
pub struct IdentityManager {
    /// Records updated this frame or revivable without leaving `active`,
    /// keyed by id so candidate scans run in ascending-id order.
    active: BTreeMap<u64, TrackRecord>,
    /// Records awaiting revival, in demotion order.
    inactive: Vec<TrackRecord>,
    next_id: u64,
    continuity: ContinuityMap,
    config: ReidConfig,
}

impl IdentityManager {
    pub fn new(classes: &[String], continuity_groups: &[Vec<String>], config: ReidConfig) -> Self {
        Self {
            active: BTreeMap::new(),
            inactive: Vec::new(),
            next_id: 0,
            continuity: ContinuityMap::from_label_sets(classes, continuity_groups),
            config,
        }
    }

    /// Assign a global identity to every detection of one frame.
    ///
    /// Returns one id per detection, in input order. No detection is ever
    /// rejected: an unmatched detection spawns a fresh identity. Frame
    /// indices must be non-decreasing across calls within a session.
    pub fn assign(&mut self, frame_index: u64, detections: &[Detection]) -> Vec<u64> {
        let mut ids = vec![u64::MAX; detections.len()];
        let mut pending: Vec<usize> = (0..detections.len()).collect();

        // Phase 1: match against the active pool.
        pending = self.match_active(frame_index, detections, &mut ids, pending);

        // Phase 2: remaining detections may revive inactive records.
        pending = self.match_inactive(frame_index, detections, &mut ids, pending);

        // Phase 3: the rest spawn fresh identities.
        for &i in &pending {
            let gid = self.next_id;
            self.next_id += 1;
            self.active
                .insert(gid, TrackRecord::new(gid, &detections[i], frame_index));
            debug!(gid, frame_index, label = %detections[i].label, "spawned identity");
            ids[i] = gid;
        }

        // Phase 4: demote active records not touched this frame.
        let untouched: Vec<u64> = self
            .active
            .iter()
            .filter(|(_, rec)| rec.last_frame != frame_index)
            .map(|(&gid, _)| gid)
            .collect();
        for gid in untouched {
            if let Some(record) = self.active.remove(&gid) {
                self.inactive.push(record);
            }
        }

        // Phase 5: purge inactive records past the re-id window.
        let before = self.inactive.len();
        let window = self.config.max_frames;
        self.inactive
            .retain(|rec| matches!(rec.age(frame_index), Some(age) if age <= window));
        if self.inactive.len() < before {
            debug!(
                purged = before - self.inactive.len(),
                frame_index, "purged stale identities"
            );
        }

        ids
    }

    fn match_active(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
        ids: &mut [u64],
        pending: Vec<usize>,
    ) -> Vec<usize> {
        let dets: Vec<&Detection> = pending.iter().map(|&i| &detections[i]).collect();
        let candidate_ids: Vec<u64> = self.active.keys().copied().collect();
        let candidates: Vec<&TrackRecord> = candidate_ids.iter().map(|g| &self.active[g]).collect();

        let dists = gated_distances(
            &dets,
            &candidates,
            frame_index,
            self.config.max_radius_px,
            self.config.max_frames,
            &self.continuity,
        );
        let result = greedy_assignment(&dists);

        for (row, col) in result.matches {
            let det_index = pending[row];
            let gid = candidate_ids[col];
            if let Some(record) = self.active.get_mut(&gid) {
                record.update(&detections[det_index], frame_index);
            }
            ids[det_index] = gid;
        }
        result
            .unmatched_detections
            .into_iter()
            .map(|row| pending[row])
            .collect()
    }

    fn match_inactive(
        &mut self,
        frame_index: u64,
        detections: &[Detection],
        ids: &mut [u64],
        pending: Vec<usize>,
    ) -> Vec<usize> {
        let dets: Vec<&Detection> = pending.iter().map(|&i| &detections[i]).collect();
        let candidates: Vec<&TrackRecord> = self.inactive.iter().collect();

        let dists = gated_distances(
            &dets,
            &candidates,
            frame_index,
            self.config.max_radius_px,
            self.config.max_frames,
            &self.continuity,
        );
        let result = greedy_assignment(&dists);

        // Revive matched records into the active pool, removing from the
        // highest index down so earlier column indices stay valid.
        let mut revivals = result.matches;
        revivals.sort_by(|a, b| b.1.cmp(&a.1));
        for (row, col) in revivals {
            let det_index = pending[row];
            let mut record = self.inactive.remove(col);
            let gid = record.global_id;
            record.update(&detections[det_index], frame_index);
            self.active.insert(gid, record);
            debug!(gid, frame_index, "revived identity");
            ids[det_index] = gid;
        }
        result
            .unmatched_detections
            .into_iter()
            .map(|row| pending[row])
            .collect()
    }

    /// Whether an identity is still known, in either pool.
    pub fn contains(&self, global_id: u64) -> bool {
        self.active.contains_key(&global_id)
            || self.inactive.iter().any(|r| r.global_id == global_id)
    }

    /// Identities currently in either pool.
    pub fn known_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.active
            .keys()
            .copied()
            .chain(self.inactive.iter().map(|r| r.global_id))
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn inactive_len(&self) -> usize {
        self.inactive.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn det(class_index: usize, label: &str, cx: f32, cy: f32) -> Detection {
        Detection::new(class_index, label, BBox::from_xywh(cx, cy, 40.0, 40.0))
    }

    fn manager() -> IdentityManager {
        IdentityManager::new(&classes(&["obj"]), &[], ReidConfig::default())
    }

    #[test]
    fn test_ids_monotonic_from_zero() {
        let mut m = manager();
        let ids = m.assign(0, &[det(0, "obj", 100.0, 100.0), det(0, "obj", 900.0, 100.0)]);
        assert_eq!(ids, vec![0, 1]);
        let ids = m.assign(1, &[det(0, "obj", 100.0, 2000.0)]);
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_nearby_detection_keeps_id() {
        let mut m = manager();
        assert_eq!(m.assign(0, &[det(0, "obj", 100.0, 100.0)]), vec![0]);
        assert_eq!(m.assign(1, &[det(0, "obj", 110.0, 105.0)]), vec![0]);
        assert_eq!(m.active_len(), 1);
        assert_eq!(m.inactive_len(), 0);
    }

    #[test]
    fn test_distant_detection_spawns() {
        let mut m = manager();
        m.assign(0, &[det(0, "obj", 100.0, 100.0)]);
        // 500px away, beyond the 240px radius.
        assert_eq!(m.assign(1, &[det(0, "obj", 600.0, 100.0)]), vec![1]);
    }

    #[test]
    fn test_demotion_and_revival() {
        let mut m = manager();
        m.assign(0, &[det(0, "obj", 100.0, 100.0)]);
        // Nothing this frame: id 0 demoted.
        m.assign(1, &[]);
        assert_eq!(m.active_len(), 0);
        assert_eq!(m.inactive_len(), 1);
        // Reappears within radius and window: revived.
        assert_eq!(m.assign(50, &[det(0, "obj", 130.0, 100.0)]), vec![0]);
        assert_eq!(m.active_len(), 1);
        assert_eq!(m.inactive_len(), 0);
    }

    #[test]
    fn test_purge_is_final() {
        let mut m = manager();
        m.assign(0, &[det(0, "obj", 100.0, 100.0)]);
        m.assign(1, &[]);
        // Age 200 > 180: the record is gone before matching can see it.
        assert_eq!(m.assign(200, &[det(0, "obj", 100.0, 100.0)]), vec![1]);
        assert!(!m.contains(0));
        // And it can never come back.
        assert_eq!(m.assign(201, &[det(0, "obj", 100.0, 100.0)]), vec![1]);
    }

    #[test]
    fn test_greedy_contention_first_detection_wins() {
        let mut m = manager();
        m.assign(0, &[det(0, "obj", 100.0, 100.0)]);
        // Both detections are within radius of track 0; the first wins it.
        let ids = m.assign(1, &[det(0, "obj", 120.0, 100.0), det(0, "obj", 105.0, 100.0)]);
        assert_eq!(ids[0], 0);
        assert_eq!(ids[1], 1);
    }

    #[test]
    fn test_continuity_group_bridges_classes() {
        let cls = classes(&["white bottle", "black bottle", "chair"]);
        let groups = vec![vec!["white bottle".to_string(), "black bottle".to_string()]];
        let mut m = IdentityManager::new(&cls, &groups, ReidConfig::default());

        assert_eq!(m.assign(0, &[det(0, "white bottle", 100.0, 100.0)]), vec![0]);
        // Different class, same group: identity carries over.
        assert_eq!(m.assign(5, &[det(1, "black bottle", 120.0, 110.0)]), vec![0]);
        // A chair at the same spot is not continuity-compatible.
        assert_eq!(m.assign(6, &[det(2, "chair", 120.0, 110.0)]), vec![1]);
    }

    #[test]
    fn test_every_detection_gets_exactly_one_id() {
        let mut m = manager();
        let dets: Vec<Detection> = (0..5)
            .map(|i| det(0, "obj", 100.0 + 300.0 * i as f32, 100.0))
            .collect();
        let ids = m.assign(0, &dets);
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }
}
