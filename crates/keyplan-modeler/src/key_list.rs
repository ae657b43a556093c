//! Insertion-ordered clustering key set.
//!
//! Keys are addressed by normalized field name with O(1) membership, while
//! position in the list is the on-disk clustering order. Conflict repair is
//! expressed as three positional operations: find the slot after the last
//! key a pattern references, drop unreferenced keys from that slot onward,
//! and insert at the slot.

use indexmap::IndexMap;
use keyplan_core::{normalize, ClusteringKeyRecommendation};

/// Ordered clustering keys keyed by normalized field name.
#[derive(Debug, Clone, Default)]
pub struct ClusteringKeyList {
    keys: IndexMap<String, ClusteringKeyRecommendation>,
}

impl ClusteringKeyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether a field (normalized name) is already placed.
    pub fn contains(&self, normalized: &str) -> bool {
        self.keys.contains_key(normalized)
    }

    /// The key in position 0.
    pub fn first(&self) -> Option<&ClusteringKeyRecommendation> {
        self.keys.get_index(0).map(|(_, key)| key)
    }

    /// Normalized name of the key in position 0.
    pub fn first_field(&self) -> Option<&str> {
        self.keys.get_index(0).map(|(name, _)| name.as_str())
    }

    /// Normalized names in clustering order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Append a key; returns false if the field is already placed.
    pub fn push(&mut self, key: ClusteringKeyRecommendation) -> bool {
        let name = normalize(&key.field);
        if self.keys.contains_key(&name) {
            return false;
        }
        self.keys.insert(name, key);
        true
    }

    /// Position immediately after the last key accepted by `referenced`,
    /// or the end of the list when no key is referenced.
    pub fn slot_after_last<F>(&self, referenced: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.keys
            .keys()
            .rposition(|name| referenced(name))
            .map(|i| i + 1)
            .unwrap_or(self.keys.len())
    }

    /// Remove every key at or after `start` that `referenced` rejects,
    /// returning the removed keys in their former order.
    pub fn remove_unreferenced_from<F>(
        &mut self,
        start: usize,
        referenced: F,
    ) -> Vec<ClusteringKeyRecommendation>
    where
        F: Fn(&str) -> bool,
    {
        let doomed: Vec<String> = self
            .keys
            .keys()
            .skip(start)
            .filter(|name| !referenced(name))
            .cloned()
            .collect();

        doomed
            .iter()
            .filter_map(|name| self.keys.shift_remove(name))
            .collect()
    }

    /// Insert a key at `index` (clamped to the list length); returns false
    /// if the field is already placed.
    pub fn insert_at(&mut self, index: usize, key: ClusteringKeyRecommendation) -> bool {
        let name = normalize(&key.field);
        if self.keys.contains_key(&name) {
            return false;
        }
        let index = index.min(self.keys.len());
        self.keys.shift_insert(index, name, key);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusteringKeyRecommendation> {
        self.keys.values()
    }

    pub fn into_vec(self) -> Vec<ClusteringKeyRecommendation> {
        self.keys.into_values().collect()
    }
}
