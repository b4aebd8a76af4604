//! # Statistics Store
//!
//! Visit counts and value estimates keyed by position hash. The store is the
//! only state the search learns into. It grows monotonically: entries are
//! created on first sight and never evicted during a run.
//!
//! Both players' search agents hold clones of one [`SharedStats`] handle, so
//! everything one side learns is immediately visible to the other.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Statistics for one position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStats {
    /// Number of simulations that passed through the position.
    pub visits: u32,
    /// Value estimate, White-positive, nominally within [-1, 1].
    pub value: f64,
}

/// Position hash -> statistics.
#[derive(Clone, Debug, Default)]
pub struct StatsStore {
    entries: HashMap<u64, NodeStats>,
}

/// Handle through which several agents share one store.
pub type SharedStats = Arc<Mutex<StatsStore>>;

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the store in a shareable handle.
    pub fn into_shared(self) -> SharedStats {
        Arc::new(Mutex::new(self))
    }

    /// Rebuilds a store from separate visit-count and value dumps.
    ///
    /// A hash present in only one of the maps takes the default for the other.
    pub fn from_parts(plays: HashMap<u64, u32>, values: HashMap<u64, f64>) -> Self {
        let mut entries: HashMap<u64, NodeStats> = plays
            .into_iter()
            .map(|(hash, visits)| (hash, NodeStats { visits, value: 0.0 }))
            .collect();
        for (hash, value) in values {
            entries.entry(hash).or_default().value = value;
        }
        StatsStore { entries }
    }

    /// Visit counts, one entry per known position.
    pub fn plays(&self) -> HashMap<u64, u32> {
        self.entries.iter().map(|(h, s)| (*h, s.visits)).collect()
    }

    /// Value estimates, one entry per known position.
    pub fn values(&self) -> HashMap<u64, f64> {
        self.entries.iter().map(|(h, s)| (*h, s.value)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.entries.contains_key(&hash)
    }

    pub fn get(&self, hash: u64) -> Option<NodeStats> {
        self.entries.get(&hash).copied()
    }

    /// Creates a zeroed entry for `hash` unless one already exists.
    pub fn ensure(&mut self, hash: u64) {
        self.entries.entry(hash).or_default();
    }

    /// Creates or overwrites the entry for `hash` with a zeroed one.
    pub fn insert_unvisited(&mut self, hash: u64) {
        self.entries.insert(hash, NodeStats::default());
    }

    /// Overwrites the entry for `hash`.
    pub fn reset_to(&mut self, hash: u64, stats: NodeStats) {
        self.entries.insert(hash, stats);
    }

    /// Counts a visit and replaces the value with `outcome`.
    pub fn record_terminal(&mut self, hash: u64, outcome: f64) {
        let entry = self.entries.entry(hash).or_default();
        entry.visits += 1;
        entry.value = outcome;
    }

    /// Counts a visit and moves the value toward `outcome` by a running mean.
    pub fn record_visit(&mut self, hash: u64, outcome: f64) {
        let entry = self.entries.entry(hash).or_default();
        entry.visits += 1;
        entry.value += (outcome - entry.value) / entry.visits as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        let mut store = StatsStore::new();
        store.ensure(1);
        store.record_visit(1, 1.0);
        store.record_visit(1, -1.0);
        store.record_visit(1, 0.0);
        let stats = store.get(1).unwrap();
        assert_eq!(stats.visits, 3);
        assert!(stats.value.abs() < 1e-12);
    }

    #[test]
    fn test_terminal_overwrites_value() {
        let mut store = StatsStore::new();
        store.record_visit(5, 1.0);
        store.record_terminal(5, -1.0);
        assert_eq!(store.get(5), Some(NodeStats { visits: 2, value: -1.0 }));
    }

    #[test]
    fn test_ensure_keeps_existing() {
        let mut store = StatsStore::new();
        store.record_visit(9, 1.0);
        store.ensure(9);
        assert_eq!(store.get(9).unwrap().visits, 1);
        store.insert_unvisited(9);
        assert_eq!(store.get(9), Some(NodeStats::default()));
    }

    #[test]
    fn test_parts_roundtrip() {
        let mut store = StatsStore::new();
        store.record_visit(1, 1.0);
        store.record_visit(2, -0.5);
        store.record_visit(2, 0.5);
        let restored = StatsStore::from_parts(store.plays(), store.values());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(2), store.get(2));
    }

    #[test]
    fn test_shared_handle_sees_updates() {
        let shared = StatsStore::new().into_shared();
        let other = Arc::clone(&shared);
        shared.lock().record_visit(42, 1.0);
        assert!(other.lock().contains(42));
    }
}
