//! Cache hierarchy: shard → sharded → adaptive → block / point.

pub mod adaptive;
pub mod block;
pub mod handle;
pub mod point;
pub(crate) mod shard;
pub mod sharded;

pub use adaptive::{AdaptiveCache, AdaptiveLookup, ADJUST_THRESHOLD};
pub use block::BlockCache;
pub use handle::Handle;
pub use point::PointCache;
pub use sharded::{GhostCache, ShardedLruCache, MIN_SHARDED_CAPACITY, NUM_SHARDS, SHARD_BITS};

/// Creates a sharded LRU cache with the given total capacity.
pub fn new_lru_cache<V: Send + Sync + 'static>(capacity: usize) -> ShardedLruCache<V> {
    ShardedLruCache::new(capacity)
}

/// Creates a block cache: one adaptive cache dedicated to data blocks.
pub fn new_block_cache<V: Send + Sync + 'static>(capacity: usize) -> BlockCache<V> {
    BlockCache::new(capacity)
}

/// Creates a point cache with the budget split evenly between the
/// key→value and key→locator sides.
pub fn new_point_cache<V, P>(capacity: usize) -> PointCache<V, P>
where
    V: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    PointCache::new(capacity)
}
