use std::collections::HashMap;

use tracing::warn;

/// Class-continuity table: groups of detector classes treated as the same
/// physical object for identity matching (e.g. "paper air plane" vs
/// "paper airplane in hand").
#[derive(Debug, Clone, Default)]
pub struct ContinuityMap {
    /// class index -> group id; classes outside any group are absent
    class_group: HashMap<usize, usize>,
}

impl ContinuityMap {
    /// Build the table from label sets.
    ///
    /// Labels not present in `classes` are dropped from their group, and
    /// groups left with fewer than two members are not materialized. Both
    /// cases are silent exclusions, not errors.
    pub fn from_label_sets(classes: &[String], groups: &[Vec<String>]) -> Self {
        let name_to_index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut class_group = HashMap::new();
        let mut next_group = 0;
        for group in groups {
            let mut indices = Vec::with_capacity(group.len());
            for label in group {
                match name_to_index.get(label.as_str()) {
                    Some(&index) => indices.push(index),
                    None => warn!(%label, "continuity group names unknown class; skipping"),
                }
            }
            if indices.len() >= 2 {
                for index in indices {
                    class_group.insert(index, next_group);
                }
                next_group += 1;
            }
        }
        Self { class_group }
    }

    /// Whether two class indices may share an identity: identical, or both
    /// members of the same continuity group.
    #[inline]
    pub fn compatible(&self, a: usize, b: usize) -> bool {
        if a == b {
            return true;
        }
        match (self.class_group.get(&a), self.class_group.get(&b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }
}
