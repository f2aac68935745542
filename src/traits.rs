//! Public cache contract.
//!
//! The cache variants form a closed set: the sharded LRU cache implements
//! the full [`Cache`] contract, while the adaptive, block, and point caches
//! expose inherent surfaces: operations a variant cannot support (such as
//! `erase` on the adaptive cache) are simply absent from its type instead
//! of aborting at runtime.
//!
//! ## Contract summary
//!
//! | Operation            | Behavior                                        |
//! |----------------------|-------------------------------------------------|
//! | `insert`             | Always succeeds; evicts synchronously if needed |
//! | `insert_with_ghost`  | As `insert`, recording evicted keys in a ghost  |
//! | `lookup`             | `None` on miss; hit pins the entry              |
//! | `release`            | Consumes the handle; exactly one per handle     |
//! | `value`              | Lock-free read through the handle               |
//! | `erase`              | Unindexes; entry survives outstanding handles   |
//! | `new_id`             | Monotone id for key-space partitioning          |
//! | `prune`              | Drops every entry not pinned by a client        |
//! | `total_charge`       | Estimate of summed charges                      |
//! | `adjust_capacity`    | Signed delta; shrink is applied lazily          |

use std::sync::Arc;

use crate::cache::handle::Handle;
use crate::cache::sharded::GhostCache;

/// Destructor callback attached to each entry.
///
/// Runs exactly once, under the owning shard's lock, when the last
/// reference to the entry drops. It must be fast and must not call back
/// into the cache that owns the entry (the shard mutex is not reentrant).
pub type Deleter<V> = Box<dyn FnOnce(&[u8], Arc<V>) + Send>;

/// Thread-safe bounded cache keyed by byte slices.
///
/// Every operation is total: `insert` cannot fail (over-capacity entries
/// are cached briefly and evicted on the spot) and `lookup` signals absence
/// with `None`.
pub trait Cache<V>: Send + Sync {
    /// Inserts `key → value` with the given charge against capacity.
    ///
    /// The returned handle pins the entry until released. Reinserting an
    /// existing key displaces the previous entry (its deleter runs once no
    /// handle references it anymore).
    fn insert(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V>;

    /// Like [`insert`](Cache::insert), but each entry evicted to make room
    /// is recorded in `ghost` with its original charge as the payload.
    fn insert_with_ghost(
        &self,
        key: &[u8],
        value: V,
        charge: usize,
        ghost: &GhostCache,
        deleter: Deleter<V>,
    ) -> Handle<V>;

    /// Returns a handle for `key`, or `None` if absent.
    fn lookup(&self, key: &[u8]) -> Option<Handle<V>>;

    /// Releases a handle obtained from this cache.
    fn release(&self, handle: Handle<V>);

    /// Reads the value behind a handle. No lock is taken; the handle's own
    /// reference keeps the value alive.
    fn value<'a>(&self, handle: &'a Handle<V>) -> &'a V {
        handle.value()
    }

    /// Unindexes `key` if present. The entry is destroyed once the last
    /// outstanding handle is released.
    fn erase(&self, key: &[u8]);

    /// Returns a fresh monotone id. Clients sharing a cache prepend it to
    /// their keys to partition the key space.
    fn new_id(&self) -> u64;

    /// Evicts every entry not currently referenced by a client.
    fn prune(&self);

    /// Estimate of the summed charges of resident entries.
    fn total_charge(&self) -> usize;

    /// Adds a signed delta to the capacity. Shrinking does not evict until
    /// the next insert drives eviction.
    fn adjust_capacity(&self, delta: isize);
}
