//! Bounded, deduplicated, newest-first clipboard history.

use chrono::{DateTime, Utc};

use super::entry::HistoryEntry;

/// Default number of entries kept in the history.
pub const MAX_ENTRIES: usize = 50;

/// Ordered history of distinct clipboard values, newest first.
///
/// Invariants maintained by `insert`:
/// - no two entries share a value
/// - `len() <= capacity()`
/// - the most recently inserted new value is at index 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_ENTRIES)
    }
}

impl HistoryStore {
    /// Empty store holding at most `capacity` entries. A capacity of zero is
    /// raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity.min(MAX_ENTRIES)),
            capacity,
        }
    }

    /// Wrap entries read from disk. They are taken as-is, in file order.
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        Self {
            entries,
            capacity: capacity.max(1),
        }
    }

    /// Record `value` observed at `now`.
    ///
    /// Empty values and values already present are ignored; existing entries
    /// are never reordered or re-timestamped. At capacity the oldest entry is
    /// evicted first. Returns whether the store changed.
    pub fn insert(&mut self, value: &str, now: DateTime<Utc>) -> bool {
        if value.is_empty() || self.contains(value) {
            return false;
        }

        while !self.entries.is_empty() && self.entries.len() >= self.capacity {
            self.entries.pop();
        }

        self.entries.insert(0, HistoryEntry::new(value, now));
        true
    }

    /// Value-returning form of [`HistoryStore::insert`].
    pub fn inserted(mut self, value: &str, now: DateTime<Utc>) -> Self {
        self.insert(value, now);
        self
    }

    /// Drop every entry whose value equals `value`. Returns whether anything
    /// was removed.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.value() != value);
        self.entries.len() != before
    }

    /// Value-returning form of [`HistoryStore::remove`].
    pub fn removed(mut self, value: &str) -> Self {
        self.remove(value);
        self
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e.value() == value)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn values(store: &HistoryStore) -> Vec<&str> {
        store.entries().iter().map(|e| e.value()).collect()
    }

    #[test]
    fn test_capacity_two_example() {
        let mut store = HistoryStore::new(2);
        store.insert("a", t(0));
        store.insert("b", t(1));
        store.insert("c", t(2));
        assert_eq!(values(&store), vec!["c", "b"]);

        let before = store.clone();
        assert!(!store.insert("b", t(3)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_newest_first() {
        let store = HistoryStore::new(10)
            .inserted("first", t(0))
            .inserted("second", t(1))
            .inserted("third", t(2));

        assert_eq!(values(&store), vec!["third", "second", "first"]);
        assert_eq!(store.get(0).unwrap().recorded_at(), t(2));
    }

    #[test]
    fn test_empty_value_is_noop() {
        let mut store = HistoryStore::new(3).inserted("x", t(0));
        let before = store.clone();

        assert!(!store.insert("", t(5)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_duplicate_keeps_order_and_timestamp() {
        let mut store = HistoryStore::new(5)
            .inserted("old", t(0))
            .inserted("new", t(10));

        assert!(!store.insert("old", t(20)));
        assert_eq!(values(&store), vec!["new", "old"]);
        assert_eq!(store.get(1).unwrap().recorded_at(), t(0));
    }

    #[test]
    fn test_invariants_hold_over_many_inserts() {
        let mut store = HistoryStore::new(MAX_ENTRIES);
        for i in 0..500 {
            // Each value arrives twice in a row; 71 distinct values cycle past the cap.
            let value = format!("value-{}", (i / 2 * 7) % 71);
            let was_present = store.contains(&value);
            let len_before = store.len();
            let oldest_before = store.entries().last().cloned();

            let changed = store.insert(&value, t(i));

            assert_eq!(changed, !was_present);
            assert!(store.len() <= MAX_ENTRIES);
            let unique: HashSet<&str> = values(&store).into_iter().collect();
            assert_eq!(unique.len(), store.len());

            if changed {
                assert_eq!(store.get(0).unwrap().value(), value);
                if len_before == MAX_ENTRIES {
                    assert_eq!(store.len(), MAX_ENTRIES);
                    let oldest = oldest_before.unwrap();
                    assert!(!store.contains(oldest.value()));
                }
            }
        }
    }

    #[test]
    fn test_remove_keeps_others_in_order() {
        let mut store = HistoryStore::new(5)
            .inserted("a", t(0))
            .inserted("b", t(1))
            .inserted("c", t(2));
        let expected: Vec<HistoryEntry> = store
            .entries()
            .iter()
            .filter(|e| e.value() != "b")
            .cloned()
            .collect();

        assert!(store.remove("b"));
        assert!(!store.contains("b"));
        assert_eq!(store.entries(), expected.as_slice());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = HistoryStore::new(5).inserted("a", t(0));
        let after = store.clone().removed("zzz");
        assert_eq!(after, store);
    }

    #[test]
    fn test_newlines_preserved() {
        let store = HistoryStore::new(5).inserted("line 1\nline 2\n", t(0));
        assert_eq!(store.get(0).unwrap().value(), "line 1\nline 2\n");
    }

    #[test]
    fn test_oversized_loaded_store_shrinks_on_insert() {
        let entries = (0..4).map(|i| HistoryEntry::new(format!("v{i}"), t(i))).collect();
        let mut store = HistoryStore::from_entries(entries, 2);

        store.insert("fresh", t(10));
        assert_eq!(values(&store), vec!["fresh", "v0"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one_entry() {
        let mut store = HistoryStore::new(0);
        assert_eq!(store.capacity(), 1);

        store.insert("a", t(0));
        store.insert("b", t(1));
        assert_eq!(values(&store), vec!["b"]);

        let loaded = HistoryStore::from_entries(Vec::new(), 0);
        assert_eq!(loaded.capacity(), 1);
    }
}
