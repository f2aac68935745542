//! Opaque handles naming live cache entries.
//!
//! A [`Handle`] is returned by `insert` and `lookup` and pins its entry:
//! the entry may be evicted or erased from the cache while the handle is
//! outstanding, but it is not destroyed until the handle is released. The
//! handle owns a clone of the entry's `Arc<V>`, so [`Handle::value`] reads
//! without taking any lock.
//!
//! Handles are deliberately not `Clone`: the cache contract is one release
//! per acquisition, and consuming `release(handle)` makes a second release
//! unrepresentable.

use std::sync::Arc;

use crate::ds::arena::EntryId;

/// Reference to a live cache entry.
///
/// Must be passed back to the originating cache's `release` exactly once.
/// Dropping a handle without releasing it leaks the entry's reference and
/// causes the cache's teardown assertion to fire.
pub struct Handle<V> {
    id: EntryId,
    hash: u32,
    value: Arc<V>,
}

impl<V> Handle<V> {
    pub(crate) fn new(id: EntryId, hash: u32, value: Arc<V>) -> Self {
        Self { id, hash, value }
    }

    /// Reads the cached value. No lock is taken; the handle's own reference
    /// keeps the value alive even after eviction or erase.
    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn id(&self) -> EntryId {
        self.id
    }

    pub(crate) fn hash(&self) -> u32 {
        self.hash
    }
}

impl<V> std::fmt::Debug for Handle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}
