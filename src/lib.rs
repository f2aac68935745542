//! shardlru: sharded, reference-counted LRU caching primitives with
//! adaptive ghost tracking, built for embedded key-value storage engines.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

pub use cache::{
    new_block_cache, new_lru_cache, new_point_cache, AdaptiveCache, AdaptiveLookup, BlockCache,
    GhostCache, Handle, PointCache, ShardedLruCache,
};
pub use traits::{Cache, Deleter};
