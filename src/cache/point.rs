//! Point-lookup cache: paired adaptive caches for values and locators.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ PointCache<V, P>                                           │
//!   │                                                            │
//!   │   kv: AdaptiveCache<V>   key → materialized value          │
//!   │   kp: AdaptiveCache<P>   key → locator (e.g. file offset)  │
//!   │                                                            │
//!   │   adjust_capacity(Δ) splits Δ at the kv : kp charge ratio  │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two sides are distinct eviction domains with a shared budget: a
//! point lookup that hits `kv` is served outright, while a hit in `kp`
//! gives the engine a cheap path to the value. `adjust_capacity` moves
//! budget toward whichever side currently carries more charge; the
//! per-side methods bypass the ratio for explicit control.

use crate::cache::adaptive::{AdaptiveCache, AdaptiveLookup};
use crate::cache::handle::Handle;
use crate::traits::Deleter;

/// Paired key→value / key→locator caches over one budget.
///
/// # Example
///
/// ```
/// use shardlru::{new_point_cache, AdaptiveLookup};
///
/// let cache = new_point_cache::<Vec<u8>, u64>(1 << 20);
///
/// let handle = cache.insert_kv(b"k", b"value".to_vec(), 5, Box::new(|_, _| {}));
/// cache.release_kv(handle);
///
/// let handle = cache.insert_kp(b"k", 0x42u64, 8, Box::new(|_, _| {}));
/// cache.release_kp(handle);
///
/// if let AdaptiveLookup::Hit(handle) = cache.lookup_kp(b"k") {
///     assert_eq!(*handle.value(), 0x42);
///     cache.release_kp(handle);
/// }
/// ```
pub struct PointCache<V, P> {
    kv: AdaptiveCache<V>,
    kp: AdaptiveCache<P>,
}

impl<V, P> PointCache<V, P>
where
    V: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Creates a point cache with the budget split evenly between sides.
    pub fn new(capacity: usize) -> Self {
        Self::with_kv_fraction(capacity, 0.5)
    }

    /// Creates a point cache giving `fraction` of the budget to the kv
    /// side. The fraction must be validated by the caller (the builder's
    /// fallible constructor does this).
    pub(crate) fn with_kv_fraction(capacity: usize, fraction: f64) -> Self {
        let kv_capacity = (capacity as f64 * fraction) as usize;
        Self {
            kv: AdaptiveCache::new(kv_capacity),
            kp: AdaptiveCache::new(capacity - kv_capacity),
        }
    }

    pub fn insert_kv(&self, key: &[u8], value: V, charge: usize, deleter: Deleter<V>) -> Handle<V> {
        self.kv.insert(key, value, charge, deleter)
    }

    pub fn insert_kp(&self, key: &[u8], value: P, charge: usize, deleter: Deleter<P>) -> Handle<P> {
        self.kp.insert(key, value, charge, deleter)
    }

    pub fn lookup_kv(&self, key: &[u8]) -> AdaptiveLookup<V> {
        self.kv.lookup(key)
    }

    pub fn lookup_kp(&self, key: &[u8]) -> AdaptiveLookup<P> {
        self.kp.lookup(key)
    }

    pub fn value_kv<'a>(&self, handle: &'a Handle<V>) -> &'a V {
        handle.value()
    }

    pub fn value_kp<'a>(&self, handle: &'a Handle<P>) -> &'a P {
        handle.value()
    }

    pub fn release_kv(&self, handle: Handle<V>) {
        self.kv.release(handle)
    }

    pub fn release_kp(&self, handle: Handle<P>) {
        self.kp.release(handle)
    }

    pub fn total_charge(&self) -> usize {
        self.kv.total_charge() + self.kp.total_charge()
    }

    pub fn total_kv_charge(&self) -> usize {
        self.kv.total_charge()
    }

    pub fn total_kp_charge(&self) -> usize {
        self.kp.total_charge()
    }

    pub fn kv_capacity(&self) -> usize {
        self.kv.capacity()
    }

    pub fn kp_capacity(&self) -> usize {
        self.kp.capacity()
    }

    /// The kv side, for introspection.
    pub fn kv(&self) -> &AdaptiveCache<V> {
        &self.kv
    }

    /// The kp side, for introspection.
    pub fn kp(&self) -> &AdaptiveCache<P> {
        &self.kp
    }

    /// Splits `delta` between the sides in proportion to their current
    /// charges, so the busier side receives more. Falls back to an equal
    /// split while the kp side is empty.
    pub fn adjust_capacity(&self, delta: isize) {
        let kv_charge = self.total_kv_charge();
        let kp_charge = self.total_kp_charge();
        let (kv_delta, kp_delta) = if kp_charge == 0 {
            let kv_delta = delta / 2;
            (kv_delta, delta - kv_delta)
        } else {
            let ratio = kv_charge as f64 / kp_charge as f64;
            let kv_delta = (delta as f64 * ratio / (1.0 + ratio)) as isize;
            let kp_delta = (delta as f64 / (1.0 + ratio)) as isize;
            (kv_delta, kp_delta)
        };
        self.kv.adjust_capacity(kv_delta);
        self.kp.adjust_capacity(kp_delta);
    }

    /// Gives `delta` to the kv side directly, bypassing the ratio.
    pub fn adjust_kv_capacity(&self, delta: isize) {
        self.kv.adjust_capacity(delta)
    }

    /// Gives `delta` to the kp side directly, bypassing the ratio.
    pub fn adjust_kp_capacity(&self, delta: isize) {
        self.kp.adjust_capacity(delta)
    }
}

impl<V, P> std::fmt::Debug for PointCache<V, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointCache")
            .field("kv", &self.kv)
            .field("kp", &self.kp)
            .finish()
    }
}
