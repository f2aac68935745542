//! Builder for the cache family.
//!
//! Construction is infallible for the LRU and block caches; the point
//! cache's kv/kp budget fraction is user-configurable and validated by the
//! fallible constructor.
//!
//! ## Example
//!
//! ```rust
//! use shardlru::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(1 << 20).build_lru::<Vec<u8>>();
//! let handle = cache.insert(b"k", vec![1, 2, 3], 3, Box::new(|_, _| {}));
//! cache.release(handle);
//! ```

use crate::cache::block::BlockCache;
use crate::cache::point::PointCache;
use crate::cache::sharded::ShardedLruCache;
use crate::error::ConfigError;

/// Builder carrying capacity and layout knobs for the cache family.
pub struct CacheBuilder {
    capacity: usize,
    point_kv_fraction: f64,
}

impl CacheBuilder {
    /// Starts a builder for caches of the given total capacity.
    ///
    /// Capacity 0 is allowed and turns caching off: inserts only back
    /// their returned handles.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            point_kv_fraction: 0.5,
        }
    }

    /// Fraction of a point cache's budget given to the key→value side
    /// (default 0.5). Validated by [`try_build_point`](Self::try_build_point).
    pub fn point_kv_fraction(mut self, fraction: f64) -> Self {
        self.point_kv_fraction = fraction;
        self
    }

    /// Builds a sharded LRU cache.
    pub fn build_lru<V: Send + Sync + 'static>(self) -> ShardedLruCache<V> {
        ShardedLruCache::new(self.capacity)
    }

    /// Builds a block cache.
    pub fn build_block<V: Send + Sync + 'static>(self) -> BlockCache<V> {
        BlockCache::new(self.capacity)
    }

    /// Builds a point cache, validating the kv fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the fraction is not strictly between
    /// 0 and 1.
    pub fn try_build_point<V, P>(self) -> Result<PointCache<V, P>, ConfigError>
    where
        V: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        let fraction = self.point_kv_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(ConfigError::new(format!(
                "point kv fraction must be in (0, 1), got {fraction}"
            )));
        }
        Ok(PointCache::with_kv_fraction(self.capacity, fraction))
    }
}
