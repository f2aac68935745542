//! Block cache: a dedicated adaptive budget for data blocks.
//!
//! A thin façade over one [`AdaptiveCache`]. It exists so the storage
//! engine can give opaque data blocks a capacity pool separate from the
//! point-lookup caches; every operation passes straight through.

use crate::cache::adaptive::{AdaptiveCache, AdaptiveLookup};
use crate::cache::handle::Handle;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::AdaptiveMetricsSnapshot;
use crate::traits::Deleter;

/// Adaptive cache for fixed-size opaque blocks.
///
/// # Example
///
/// ```
/// use shardlru::{new_block_cache, AdaptiveLookup};
///
/// let cache = new_block_cache::<Vec<u8>>(1 << 20);
/// let handle = cache.insert(b"block:0", vec![0u8; 4096], 4096, Box::new(|_, _| {}));
/// cache.release(handle);
///
/// if let AdaptiveLookup::Hit(handle) = cache.lookup(b"block:0") {
///     assert_eq!(handle.value().len(), 4096);
///     cache.release(handle);
/// }
/// ```
pub struct BlockCache<V> {
    inner: AdaptiveCache<V>,
}

impl<V: Send + Sync + 'static> BlockCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: AdaptiveCache::new(capacity),
        }
    }

    pub fn insert(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V> {
        self.inner.insert(key, value, charge, deleter)
    }

    pub fn lookup(&self, key: &[u8]) -> AdaptiveLookup<V> {
        self.inner.lookup(key)
    }

    pub fn release(&self, handle: Handle<V>) {
        self.inner.release(handle)
    }

    pub fn value<'a>(&self, handle: &'a Handle<V>) -> &'a V {
        handle.value()
    }

    pub fn new_id(&self) -> u64 {
        self.inner.new_id()
    }

    pub fn total_charge(&self) -> usize {
        self.inner.total_charge()
    }

    pub fn total_real_charge(&self) -> usize {
        self.inner.total_real_charge()
    }

    pub fn total_ghost_charge(&self) -> usize {
        self.inner.total_ghost_charge()
    }

    pub fn adjust_capacity(&self, delta: isize) {
        self.inner.adjust_capacity(delta)
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> AdaptiveMetricsSnapshot {
        self.inner.metrics_snapshot()
    }
}

impl<V> std::fmt::Debug for BlockCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCache")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_roundtrip() {
        let cache: BlockCache<Vec<u8>> = BlockCache::new(1 << 16);

        let handle = cache.insert(b"b0", vec![1, 2, 3], 3, Box::new(|_, _| {}));
        assert_eq!(cache.value(&handle), &[1, 2, 3]);
        cache.release(handle);

        match cache.lookup(b"b0") {
            AdaptiveLookup::Hit(handle) => {
                assert_eq!(cache.value(&handle), &[1, 2, 3]);
                cache.release(handle);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn ids_and_charges_delegate() {
        let cache: BlockCache<u64> = BlockCache::new(1 << 16);
        assert_eq!(cache.new_id(), 1);
        assert_eq!(cache.new_id(), 2);

        let handle = cache.insert(b"b", 9, 64, Box::new(|_, _| {}));
        assert_eq!(cache.total_real_charge(), 64);
        assert_eq!(cache.total_ghost_charge(), 0);
        assert_eq!(cache.total_charge(), 64);
        cache.release(handle);
    }
}
