//! Per-table operation counters
//!
//! - Counters only, monotonic
//! - Atomic so read paths (`&self`) can count without `&mut`
//! - Relaxed ordering; values are exact in the single-threaded model

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operation counters owned by one `Table`
#[derive(Debug, Default)]
pub struct TableMetrics {
    tuples_inserted: AtomicU64,
    tuples_loaded: AtomicU64,
    tuples_deleted: AtomicU64,
    tuples_updated: AtomicU64,
    filters_evaluated: AtomicU64,
    index_probes: AtomicU64,
    full_scans: AtomicU64,
    index_rebuilds: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub tuples_inserted: u64,
    pub tuples_loaded: u64,
    pub tuples_deleted: u64,
    pub tuples_updated: u64,
    pub filters_evaluated: u64,
    pub index_probes: u64,
    pub full_scans: u64,
    pub index_rebuilds: u64,
}

impl TableMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inserted(&self, n: u64) {
        self.tuples_inserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_loaded(&self, n: u64) {
        self.tuples_loaded.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_deleted(&self, n: u64) {
        self.tuples_deleted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_updated(&self, n: u64) {
        self.tuples_updated.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_filters(&self) {
        self.filters_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_probes(&self) {
        self.index_probes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_full_scans(&self) {
        self.full_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_rebuilds(&self) {
        self.index_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn index_probes(&self) -> u64 {
        self.index_probes.load(Ordering::Relaxed)
    }

    pub fn full_scans(&self) -> u64 {
        self.full_scans.load(Ordering::Relaxed)
    }

    /// Copies every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tuples_inserted: self.tuples_inserted.load(Ordering::Relaxed),
            tuples_loaded: self.tuples_loaded.load(Ordering::Relaxed),
            tuples_deleted: self.tuples_deleted.load(Ordering::Relaxed),
            tuples_updated: self.tuples_updated.load(Ordering::Relaxed),
            filters_evaluated: self.filters_evaluated.load(Ordering::Relaxed),
            index_probes: self.index_probes.load(Ordering::Relaxed),
            full_scans: self.full_scans.load(Ordering::Relaxed),
            index_rebuilds: self.index_rebuilds.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(TableMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = TableMetrics::new();
        metrics.add_inserted(3);
        metrics.add_inserted(2);
        metrics.increment_index_probes();
        metrics.increment_full_scans();
        metrics.increment_full_scans();

        let snap = metrics.snapshot();
        assert_eq!(snap.tuples_inserted, 5);
        assert_eq!(snap.index_probes, 1);
        assert_eq!(snap.full_scans, 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = TableMetrics::new();
        metrics.add_deleted(4);
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["tuples_deleted"], 4);
    }
}
