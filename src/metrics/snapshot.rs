//! Point-in-time metric snapshots.
//!
//! A snapshot is a plain value: cheap to copy, safe to hand across threads,
//! and merged shard by shard without holding more than one lock at a time
//! (so, like `total_charge`, it is an estimate under concurrency).

use crate::metrics::{MetricsSink, ShardMetrics};

/// Counters and gauges for one sharded cache (or a single shard).
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMetricsSnapshot {
    pub lookup_hits: u64,
    pub lookup_misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub erases: u64,
    pub pruned: u64,

    // gauges captured at snapshot time
    pub usage: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    pub(crate) fn from_shard(metrics: &ShardMetrics, usage: usize, capacity: usize) -> Self {
        Self {
            lookup_hits: metrics.lookup_hits,
            lookup_misses: metrics.lookup_misses,
            inserts: metrics.inserts,
            updates: metrics.updates,
            evictions: metrics.evictions,
            erases: metrics.erases,
            pruned: metrics.pruned,
            usage,
            capacity,
        }
    }

    /// Accumulates another snapshot into this one (counters and usage add;
    /// capacity adds because shards partition the nominal capacity).
    pub fn merge(&mut self, other: &CacheMetricsSnapshot) {
        self.lookup_hits += other.lookup_hits;
        self.lookup_misses += other.lookup_misses;
        self.inserts += other.inserts;
        self.updates += other.updates;
        self.evictions += other.evictions;
        self.erases += other.erases;
        self.pruned += other.pruned;
        self.usage += other.usage;
        self.capacity += other.capacity;
    }

    /// Emits every metric into `sink` under `<prefix>.<name>`.
    pub fn report(&self, prefix: &str, sink: &mut dyn MetricsSink) {
        sink.counter(&format!("{prefix}.lookup_hits"), self.lookup_hits);
        sink.counter(&format!("{prefix}.lookup_misses"), self.lookup_misses);
        sink.counter(&format!("{prefix}.inserts"), self.inserts);
        sink.counter(&format!("{prefix}.updates"), self.updates);
        sink.counter(&format!("{prefix}.evictions"), self.evictions);
        sink.counter(&format!("{prefix}.erases"), self.erases);
        sink.counter(&format!("{prefix}.pruned"), self.pruned);
        sink.gauge(&format!("{prefix}.usage"), self.usage as u64);
        sink.gauge(&format!("{prefix}.capacity"), self.capacity as u64);
    }
}

/// Snapshot of an adaptive cache: the real side, the ghost side, and the
/// adaptation signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveMetricsSnapshot {
    pub real: CacheMetricsSnapshot,
    pub ghost: CacheMetricsSnapshot,
    pub ghost_hits: u64,
    pub adjustments_applied: u64,
}

impl AdaptiveMetricsSnapshot {
    /// Emits the real side under `<prefix>.real`, the ghost side under
    /// `<prefix>.ghost`, and the adaptation counters under `<prefix>`.
    pub fn report(&self, prefix: &str, sink: &mut dyn MetricsSink) {
        self.real.report(&format!("{prefix}.real"), sink);
        self.ghost.report(&format!("{prefix}.ghost"), sink);
        sink.counter(&format!("{prefix}.ghost_hits"), self.ghost_hits);
        sink.counter(
            &format!("{prefix}.adjustments_applied"),
            self.adjustments_applied,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_counters_and_gauges() {
        let mut a = CacheMetricsSnapshot {
            lookup_hits: 1,
            inserts: 2,
            usage: 10,
            capacity: 100,
            ..Default::default()
        };
        let b = CacheMetricsSnapshot {
            lookup_hits: 3,
            inserts: 4,
            usage: 20,
            capacity: 100,
            ..Default::default()
        };

        a.merge(&b);
        assert_eq!(a.lookup_hits, 4);
        assert_eq!(a.inserts, 6);
        assert_eq!(a.usage, 30);
        assert_eq!(a.capacity, 200);
    }
}
