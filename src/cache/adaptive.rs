//! Adaptive cache: a real cache paired with a ghost of recently evicted keys.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │ AdaptiveCache<V>                                              │
//!   │                                                               │
//!   │   real:  ShardedLruCache<V>      (capacity / 2)               │
//!   │   ghost: ShardedLruCache<usize>  (capacity / 2)               │
//!   │   adjustment: Mutex<i64>         threshold-gated accumulator  │
//!   │                                                               │
//!   │   insert ──► real, evictions recorded as ghost keys           │
//!   │   lookup ──► real hit │ ghost hit (charge signal) │ miss      │
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A ghost hit means the key was evicted recently enough that a larger real
//! cache would have held it; the sizing policy feeds that signal back
//! through [`AdaptiveCache::adjust_capacity`], which rebalances capacity
//! between the two sides in proportion to how full each currently is.
//!
//! `erase` and `prune` have no meaningful semantics across a real/ghost
//! pair and are deliberately absent from this type.

use parking_lot::Mutex;

use crate::cache::handle::Handle;
use crate::cache::sharded::{GhostCache, ShardedLruCache};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::AdaptiveMetricsSnapshot;
#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Deleter;

/// Accumulated adjustment magnitude that triggers an actual rebalance.
pub const ADJUST_THRESHOLD: i64 = 4096;

/// Outcome of an adaptive lookup.
///
/// The ghost-hit variant carries the charge the key had when it was
/// evicted; this is the signal the sizing policy consumes.
#[derive(Debug)]
pub enum AdaptiveLookup<V> {
    /// Present in the real cache; the handle pins the entry.
    Hit(Handle<V>),
    /// Absent, but evicted recently: the recorded charge is returned.
    GhostHit(usize),
    /// Absent from both the real and ghost caches.
    Miss,
}

impl<V> AdaptiveLookup<V> {
    /// Extracts the handle from a hit.
    pub fn into_handle(self) -> Option<Handle<V>> {
        match self {
            AdaptiveLookup::Hit(handle) => Some(handle),
            _ => None,
        }
    }

    /// The recorded charge of a ghost hit.
    pub fn ghost_charge(&self) -> Option<usize> {
        match self {
            AdaptiveLookup::GhostHit(charge) => Some(*charge),
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, AdaptiveLookup::Hit(_))
    }

    pub fn is_ghost_hit(&self) -> bool {
        matches!(self, AdaptiveLookup::GhostHit(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, AdaptiveLookup::Miss)
    }
}

struct AdjustmentState {
    accumulated: i64,
    #[cfg(feature = "metrics")]
    applied: u64,
}

/// Cache whose capacity tracks the workload via ghost-hit feedback.
///
/// # Example
///
/// ```
/// use shardlru::{AdaptiveCache, AdaptiveLookup};
///
/// let cache: AdaptiveCache<u64> = AdaptiveCache::new(4096);
/// let handle = cache.insert(b"k", 7, 16, Box::new(|_, _| {}));
/// cache.release(handle);
///
/// match cache.lookup(b"k") {
///     AdaptiveLookup::Hit(handle) => cache.release(handle),
///     AdaptiveLookup::GhostHit(charge) => println!("evicted at charge {charge}"),
///     AdaptiveLookup::Miss => println!("cold"),
/// }
/// ```
pub struct AdaptiveCache<V> {
    real: ShardedLruCache<V>,
    ghost: GhostCache,
    adjustment: Mutex<AdjustmentState>,
    #[cfg(feature = "metrics")]
    ghost_hits: AtomicU64,
}

impl<V: Send + Sync + 'static> AdaptiveCache<V> {
    /// Creates an adaptive cache; the real and ghost sides each start with
    /// half of `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            real: ShardedLruCache::new(capacity / 2),
            ghost: GhostCache::new(capacity / 2),
            adjustment: Mutex::new(AdjustmentState {
                accumulated: 0,
                #[cfg(feature = "metrics")]
                applied: 0,
            }),
            #[cfg(feature = "metrics")]
            ghost_hits: AtomicU64::new(0),
        }
    }

    /// Inserts into the real cache; keys it evicts are remembered by the
    /// ghost.
    pub fn insert(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V> {
        self.real
            .insert_with_ghost(key, value, charge, &self.ghost, deleter)
    }

    /// Probes the real cache, then the ghost.
    pub fn lookup(&self, key: &[u8]) -> AdaptiveLookup<V> {
        if let Some(handle) = self.real.lookup(key) {
            return AdaptiveLookup::Hit(handle);
        }
        match self.ghost.lookup(key) {
            Some(handle) => {
                let charge = *handle.value();
                self.ghost.release(handle);
                #[cfg(feature = "metrics")]
                self.ghost_hits.fetch_add(1, Ordering::Relaxed);
                AdaptiveLookup::GhostHit(charge)
            }
            None => AdaptiveLookup::Miss,
        }
    }

    /// Releases a handle obtained from [`insert`](Self::insert) or a
    /// [`AdaptiveLookup::Hit`].
    pub fn release(&self, handle: Handle<V>) {
        self.real.release(handle)
    }

    /// Reads the value behind a handle without locking.
    pub fn value<'a>(&self, handle: &'a Handle<V>) -> &'a V {
        handle.value()
    }

    pub fn new_id(&self) -> u64 {
        self.real.new_id()
    }

    /// Combined charge of the real and ghost sides.
    pub fn total_charge(&self) -> usize {
        self.real.total_charge() + self.ghost.total_charge()
    }

    pub fn total_real_charge(&self) -> usize {
        self.real.total_charge()
    }

    pub fn total_ghost_charge(&self) -> usize {
        self.ghost.total_charge()
    }

    /// Nominal capacity of the real side.
    pub fn capacity(&self) -> usize {
        self.real.capacity()
    }

    /// The real cache, for introspection.
    pub fn real(&self) -> &ShardedLruCache<V> {
        &self.real
    }

    /// The ghost cache, for introspection.
    pub fn ghost(&self) -> &GhostCache {
        &self.ghost
    }

    /// Accumulates `delta`; once the accumulated magnitude crosses
    /// [`ADJUST_THRESHOLD`], splits the accumulated delta between the ghost
    /// and real sides in proportion to their current charges (the fuller
    /// side receives more) and resets the accumulator.
    pub fn adjust_capacity(&self, delta: isize) {
        let pending = {
            let mut adjustment = self.adjustment.lock();
            adjustment.accumulated += delta as i64;
            if adjustment.accumulated.abs() > ADJUST_THRESHOLD {
                let pending = adjustment.accumulated;
                adjustment.accumulated = 0;
                #[cfg(feature = "metrics")]
                {
                    adjustment.applied += 1;
                }
                Some(pending)
            } else {
                None
            }
        };
        // The shard locks are taken only after the accumulator lock drops.
        let Some(pending) = pending else { return };

        let (real_delta, ghost_delta) =
            split_adjustment(pending, self.real.total_charge(), self.ghost.total_charge());
        self.ghost.adjust_capacity(ghost_delta);
        self.real.adjust_capacity(real_delta);
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> AdaptiveMetricsSnapshot {
        AdaptiveMetricsSnapshot {
            real: self.real.metrics_snapshot(),
            ghost: self.ghost.metrics_snapshot(),
            ghost_hits: self.ghost_hits.load(Ordering::Relaxed),
            adjustments_applied: self.adjustment.lock().applied,
        }
    }
}

impl<V> std::fmt::Debug for AdaptiveCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveCache")
            .field("real", &self.real)
            .field("ghost", &self.ghost)
            .finish_non_exhaustive()
    }
}

/// Splits `pending` into `(real, ghost)` deltas at the ratio
/// `ghost_charge : real_charge`, falling back to an equal split when the
/// real side is empty.
fn split_adjustment(pending: i64, real_charge: usize, ghost_charge: usize) -> (isize, isize) {
    if real_charge == 0 {
        let real = pending / 2;
        return (real as isize, (pending - real) as isize);
    }
    let ratio = ghost_charge as f64 / real_charge as f64;
    let ghost = (pending as f64 * ratio / (ratio + 1.0)) as i64;
    let real = (pending as f64 / (ratio + 1.0)) as i64;
    (real as isize, ghost as isize)
}
