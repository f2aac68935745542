//! Operation counters and reporting for the cache hierarchy.
//!
//! Recording and consumption are kept apart: shards bump plain counters
//! under the lock they already hold, snapshots aggregate those counters on
//! demand, and a [`MetricsSink`] receives the result as named counters and
//! gauges for whatever monitoring system sits behind it.
//!
//! ```text
//!   shard counters ──► CacheMetricsSnapshot ──► MetricsSink
//!   (under lock)        (merge across shards)    (named counters/gauges)
//! ```
//!
//! Everything here is behind the default-on `metrics` feature.

pub mod snapshot;

pub use snapshot::{AdaptiveMetricsSnapshot, CacheMetricsSnapshot};

/// Receiver for named counters and gauges.
///
/// Implement this for your monitoring system; snapshots report into it via
/// their `report` methods. Counter names are `<prefix>.<metric>`.
pub trait MetricsSink {
    fn counter(&mut self, name: &str, value: u64);
    fn gauge(&mut self, name: &str, value: u64);
}

/// Per-shard operation counters, updated under the shard lock.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ShardMetrics {
    pub lookup_hits: u64,
    pub lookup_misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub erases: u64,
    pub pruned: u64,
}
