//! Sharded LRU cache: the public cache contract over 16 independent shards.
//!
//! ## Architecture
//!
//! ```text
//!   key ──► hash_bytes ──► hash >> 28 ──► shard index (0..16)
//!
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ ShardedLruCache<V>                                       │
//!   │                                                          │
//!   │   shards: [LruShard; 16]   each with its own mutex and   │
//!   │                            ceil(capacity / 16) budget    │
//!   │   last_id: AtomicU64       key-space partitioning ids    │
//!   │   capacity: AtomicUsize    nominal total, floor-guarded  │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations on distinct shards never contend. Whole-cache views
//! (`total_charge`, metrics snapshots, invariant checks) take one shard
//! lock at a time, so they are estimates under concurrency.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cache::handle::Handle;
use crate::cache::shard::LruShard;
use crate::ds::hash::hash_bytes;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::traits::{Cache, Deleter};

/// Number of shard-index bits taken from the top of the hash.
pub const SHARD_BITS: u32 = 4;

/// Number of independent shards.
pub const NUM_SHARDS: usize = 1 << SHARD_BITS;

/// Nominal capacity below which shrink requests are ignored, so aggressive
/// adaptive rebalancing cannot collapse a cache entirely.
pub const MIN_SHARDED_CAPACITY: usize = 1 << 21;

/// A sharded cache used to record the keys of recently evicted entries.
///
/// The ghost role is a use-site contract, not a type: any sharded cache
/// whose values are the evicted charges works. Ghost entries are charged 1
/// each, so a ghost of capacity `c` remembers about `c` keys.
pub type GhostCache = ShardedLruCache<usize>;

fn shard_index(hash: u32) -> usize {
    (hash >> (32 - SHARD_BITS)) as usize
}

/// Concurrent bounded LRU cache, sharded by the top bits of the key hash.
///
/// # Example
///
/// ```
/// use shardlru::ShardedLruCache;
///
/// let cache: ShardedLruCache<String> = ShardedLruCache::new(4096);
/// let handle = cache.insert(b"k", "v".to_string(), 1, Box::new(|_, _| {}));
/// assert_eq!(handle.value(), "v");
/// cache.release(handle);
///
/// let handle = cache.lookup(b"k").expect("resident");
/// cache.release(handle);
/// ```
pub struct ShardedLruCache<V> {
    shards: Vec<LruShard<V>>,
    last_id: AtomicU64,
    capacity: AtomicUsize,
}

impl<V: Send + Sync + 'static> ShardedLruCache<V> {
    /// Creates a cache with the given total capacity, split evenly across
    /// the shards (`ceil(capacity / 16)` each).
    pub fn new(capacity: usize) -> Self {
        let per_shard = (capacity + NUM_SHARDS - 1) / NUM_SHARDS;
        Self {
            shards: (0..NUM_SHARDS).map(|_| LruShard::new(per_shard)).collect(),
            last_id: AtomicU64::new(0),
            capacity: AtomicUsize::new(capacity),
        }
    }

    fn shard_for(&self, hash: u32) -> &LruShard<V> {
        &self.shards[shard_index(hash)]
    }

    /// Inserts `key → value` and returns a handle pinning the entry.
    pub fn insert(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V> {
        let hash = hash_bytes(key);
        self.shard_for(hash)
            .insert(key, hash, Arc::new(value), charge, deleter)
    }

    /// Like [`insert`](Self::insert), recording each key this insert evicts
    /// in `ghost` (payload: the evicted charge, at ghost charge 1).
    pub fn insert_with_ghost(
        &self,
        key: &[u8],
        value: V,
        charge: usize,
        ghost: &GhostCache,
        deleter: Deleter<V>,
    ) -> Handle<V> {
        let hash = hash_bytes(key);
        self.shard_for(hash)
            .insert_with_ghost(key, hash, Arc::new(value), charge, ghost, deleter)
    }

    /// Returns a handle for `key`, or `None` if absent.
    pub fn lookup(&self, key: &[u8]) -> Option<Handle<V>> {
        let hash = hash_bytes(key);
        self.shard_for(hash).lookup(key, hash)
    }

    /// Releases a handle obtained from this cache. Exactly one release per
    /// handle; the entry is destroyed when its last reference drops.
    pub fn release(&self, handle: Handle<V>) {
        self.shard_for(handle.hash()).release(handle)
    }

    /// Reads the value behind a handle without locking.
    pub fn value<'a>(&self, handle: &'a Handle<V>) -> &'a V {
        handle.value()
    }

    /// Unindexes `key` if present; the entry survives until every
    /// outstanding handle is released.
    pub fn erase(&self, key: &[u8]) {
        let hash = hash_bytes(key);
        self.shard_for(hash).erase(key, hash)
    }

    /// Returns a fresh monotone id, independent of the shard locks.
    pub fn new_id(&self) -> u64 {
        self.last_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Evicts every entry not pinned by a client, shard by shard.
    pub fn prune(&self) {
        for shard in &self.shards {
            shard.prune();
        }
    }

    /// Non-atomic sum of per-shard usage; an estimate under concurrency.
    pub fn total_charge(&self) -> usize {
        self.shards.iter().map(|shard| shard.total_charge()).sum()
    }

    /// The nominal capacity this cache was configured with, as adjusted.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Adds a signed delta, split evenly across shards. Shrinks are refused
    /// below [`MIN_SHARDED_CAPACITY`] and otherwise applied lazily: a shard
    /// only re-evicts on its next insert.
    pub fn adjust_capacity(&self, delta: isize) {
        if delta < 0 && self.capacity.load(Ordering::Relaxed) < MIN_SHARDED_CAPACITY {
            return;
        }
        let per_shard = delta / NUM_SHARDS as isize;
        for shard in &self.shards {
            shard.adjust_capacity(per_shard);
        }
        let _ = self
            .capacity
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |capacity| {
                Some(capacity.saturating_add_signed(delta))
            });
    }

    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for shard in &self.shards {
            shard.check_invariants()?;
        }
        Ok(())
    }

    /// Counters and gauges merged across all shards.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let mut merged = CacheMetricsSnapshot::default();
        for shard in &self.shards {
            merged.merge(&shard.metrics_snapshot());
        }
        merged
    }
}

impl<V> std::fmt::Debug for ShardedLruCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &NUM_SHARDS)
            .field("capacity", &self.capacity.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<V: Send + Sync + 'static> Cache<V> for ShardedLruCache<V> {
    fn insert(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V> {
        ShardedLruCache::insert(self, key, value, charge, deleter)
    }

    fn insert_with_ghost(
        &self,
        key: &[u8],
        value: V,
        charge: usize,
        ghost: &GhostCache,
        deleter: Deleter<V>,
    ) -> Handle<V> {
        ShardedLruCache::insert_with_ghost(self, key, value, charge, ghost, deleter)
    }

    fn lookup(&self, key: &[u8]) -> Option<Handle<V>> {
        ShardedLruCache::lookup(self, key)
    }

    fn release(&self, handle: Handle<V>) {
        ShardedLruCache::release(self, handle)
    }

    fn erase(&self, key: &[u8]) {
        ShardedLruCache::erase(self, key)
    }

    fn new_id(&self) -> u64 {
        ShardedLruCache::new_id(self)
    }

    fn prune(&self) {
        ShardedLruCache::prune(self)
    }

    fn total_charge(&self) -> usize {
        ShardedLruCache::total_charge(self)
    }

    fn adjust_capacity(&self, delta: isize) {
        ShardedLruCache::adjust_capacity(self, delta)
    }
}
