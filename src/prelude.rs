pub use crate::builder::CacheBuilder;
pub use crate::cache::{
    new_block_cache, new_lru_cache, new_point_cache, AdaptiveCache, AdaptiveLookup, BlockCache,
    GhostCache, Handle, PointCache, ShardedLruCache,
};
pub use crate::ds::{hash_bytes, hash_bytes_seeded};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::traits::{Cache, Deleter};

#[cfg(feature = "metrics")]
pub use crate::metrics::{AdaptiveMetricsSnapshot, CacheMetricsSnapshot, MetricsSink};
