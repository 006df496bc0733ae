use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::resolver::{ResolveStats, ResolvedBatch};
use crate::types::PlayerMarketRow;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Resolved rows for one game date from one backend fetch. Immutable once built.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub rows: Vec<PlayerMarketRow>,
    pub stats: ResolveStats,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, batch: ResolvedBatch) -> Self {
        Self {
            date,
            rows: batch.rows,
            stats: batch.stats,
            fetched_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// Latest snapshot per game date. A refresh swaps the `Arc`, so readers
/// holding an older snapshot keep a consistent view.
pub struct RowStore {
    snapshots: DashMap<NaiveDate, Arc<Snapshot>>,
}

impl RowStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshots.insert(snapshot.date, Arc::clone(&snapshot));
        snapshot
    }

    pub fn get(&self, date: NaiveDate) -> Option<Arc<Snapshot>> {
        self.snapshots.get(&date).map(|s| Arc::clone(s.value()))
    }

    /// Cached dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self.snapshots.iter().map(|e| *e.key()).collect();
        dates.sort();
        dates
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop the oldest game dates until at most `max` remain. `keep` is never dropped.
    /// Returns the evicted dates.
    pub fn evict_to(&self, max: usize, keep: NaiveDate) -> Vec<NaiveDate> {
        let mut evicted = Vec::new();
        let candidates: Vec<_> = self.dates().into_iter().filter(|d| *d != keep).collect();
        let excess = self.len().saturating_sub(max);
        for date in candidates.into_iter().take(excess) {
            self.snapshots.remove(&date);
            evicted.push(date);
        }
        evicted
    }
}

impl Default for RowStore {
    fn default() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).expect("valid test date")
    }

    fn snapshot(d: u32, names: &[&str]) -> Snapshot {
        let rows = names
            .iter()
            .map(|n| PlayerMarketRow { player_name: n.to_string(), ..Default::default() })
            .collect();
        Snapshot::new(day(d), ResolvedBatch { rows, stats: ResolveStats::default() })
    }

    #[test]
    fn insert_replaces_previous_snapshot() {
        let store = RowStore::new();
        let old = store.insert(snapshot(1, &["A"]));
        store.insert(snapshot(1, &["A", "B"]));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(day(1)).unwrap().rows.len(), 2);
        // Holders of the old Arc are unaffected.
        assert_eq!(old.rows.len(), 1);
    }

    #[test]
    fn missing_date_returns_none() {
        let store = RowStore::new();
        assert!(store.get(day(3)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn evicts_oldest_dates_but_keeps_pinned_day() {
        let store = RowStore::new();
        for d in [5, 1, 3, 2, 4] {
            store.insert(snapshot(d, &["x"]));
        }

        let evicted = store.evict_to(3, day(1));
        assert_eq!(evicted, vec![day(2), day(3)]);
        assert_eq!(store.dates(), vec![day(1), day(4), day(5)]);
    }

    #[test]
    fn evict_is_noop_under_cap() {
        let store = RowStore::new();
        store.insert(snapshot(1, &[]));
        assert!(store.evict_to(7, day(1)).is_empty());
        assert_eq!(store.len(), 1);
    }
}
