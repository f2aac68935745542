//! Single-lock LRU core: one shard of the sharded cache.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                    LruShard<V> = Mutex<ShardState>              │
//!   │                                                                 │
//!   │   HandleTable ────────┐        EntryArena<V>                    │
//!   │   (key,hash) → id     │        ┌──────┬────────────────────┐    │
//!   │                       └──────► │ id_0 │ key,value,refs, …  │    │
//!   │                                │ id_1 │                    │    │
//!   │   in_use: refs >= 2            │ id_2 │                    │    │
//!   │   head ─► [id_1] ◄─ tail       └──────┴────────────────────┘    │
//!   │                                                                 │
//!   │   lru: refs == 1 (evictable, oldest at tail)                    │
//!   │   head ─► [id_2] ◄──► [id_0] ◄─ tail                            │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries move between the two lists as their reference count crosses the
//! cache-only threshold:
//!
//! - `ref`: an entry on the LRU list acquiring its first client reference
//!   moves to the in-use list.
//! - `unref`: an entry losing its last client reference moves back to the
//!   LRU list (as newest); an entry losing its last reference overall runs
//!   its deleter and frees its slot.
//! - `finish_erase`: an entry already removed from the table leaves its
//!   list, stops charging usage, and drops the cache's reference. A client
//!   may still hold it; it then lives on in the arena, on no list, until
//!   the final release.
//!
//! Eviction runs synchronously inside `insert`, oldest-first, and only ever
//! touches the LRU list: pinned entries cannot be evicted, so usage may
//! temporarily exceed capacity while clients hold handles.
//!
//! The deleter runs under the shard lock. It must not call back into the
//! cache that owns it; the mutex is not reentrant.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::handle::Handle;
use crate::cache::sharded::GhostCache;
use crate::ds::arena::{Entry, EntryArena, EntryId};
use crate::ds::list::EntryList;
use crate::ds::table::HandleTable;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::ShardMetrics;
use crate::traits::Deleter;

/// One shard: a bounded LRU core behind a single mutex.
pub(crate) struct LruShard<V> {
    state: Mutex<ShardState<V>>,
}

struct ShardState<V> {
    capacity: usize,
    usage: usize,
    arena: EntryArena<V>,
    table: HandleTable,
    /// Entries held only by the cache (`refs == 1`), oldest at the tail.
    lru: EntryList,
    /// Entries with outstanding client handles (`refs >= 2`).
    in_use: EntryList,
    #[cfg(feature = "metrics")]
    metrics: ShardMetrics,
}

impl<V: Send + Sync + 'static> LruShard<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ShardState {
                capacity,
                usage: 0,
                arena: EntryArena::new(),
                table: HandleTable::new(),
                lru: EntryList::new(),
                in_use: EntryList::new(),
                #[cfg(feature = "metrics")]
                metrics: ShardMetrics::default(),
            }),
        }
    }

    pub(crate) fn insert(
        &self,
        key: &[u8],
        hash: u32,
        value: Arc<V>,
        charge: usize,
        deleter: Deleter<V>,
    ) -> Handle<V> {
        let mut state = self.state.lock();
        let id = state.index_new_entry(key, hash, Arc::clone(&value), charge, deleter);
        state.evict_to_capacity(|_, _| {});
        Handle::new(id, hash, value)
    }

    /// As [`insert`](Self::insert), additionally recording each evicted key
    /// in `ghost` with the evicted charge as payload. The ghost cache takes
    /// its own shard locks; it must not be the cache this shard belongs to.
    pub(crate) fn insert_with_ghost(
        &self,
        key: &[u8],
        hash: u32,
        value: Arc<V>,
        charge: usize,
        ghost: &GhostCache,
        deleter: Deleter<V>,
    ) -> Handle<V> {
        let mut state = self.state.lock();
        let id = state.index_new_entry(key, hash, Arc::clone(&value), charge, deleter);
        state.evict_to_capacity(|evicted_key, evicted_charge| {
            let handle = ghost.insert(evicted_key, evicted_charge, 1, Box::new(|_, _| {}));
            ghost.release(handle);
        });
        Handle::new(id, hash, value)
    }

    pub(crate) fn lookup(&self, key: &[u8], hash: u32) -> Option<Handle<V>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.table.find(&state.arena, key, hash) {
            Some(id) => {
                #[cfg(feature = "metrics")]
                {
                    state.metrics.lookup_hits += 1;
                }
                state.ref_entry(id);
                let value = Arc::clone(&state.arena[id].value);
                Some(Handle::new(id, hash, value))
            }
            None => {
                #[cfg(feature = "metrics")]
                {
                    state.metrics.lookup_misses += 1;
                }
                None
            }
        }
    }

    pub(crate) fn release(&self, handle: Handle<V>) {
        let mut state = self.state.lock();
        let id = handle.id();
        assert!(
            state.arena.contains(id),
            "released a handle unknown to this cache"
        );
        debug_assert_eq!(state.arena[id].hash, handle.hash());
        state.unref(id);
    }

    pub(crate) fn erase(&self, key: &[u8], hash: u32) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(id) = state.table.remove(&mut state.arena, key, hash) {
            #[cfg(feature = "metrics")]
            {
                state.metrics.erases += 1;
            }
            state.finish_erase(id);
        }
    }

    pub(crate) fn prune(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        while let Some(id) = state.lru.oldest() {
            let removed = state.table.remove_entry(&mut state.arena, id);
            debug_assert!(removed);
            #[cfg(feature = "metrics")]
            {
                state.metrics.pruned += 1;
            }
            state.finish_erase(id);
        }
    }

    pub(crate) fn total_charge(&self) -> usize {
        self.state.lock().usage
    }

    pub(crate) fn adjust_capacity(&self, delta: isize) {
        let mut state = self.state.lock();
        state.capacity = state.capacity.saturating_add_signed(delta);
        // No eviction here: a shrink trims lazily on the next insert.
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        self.state.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let state = self.state.lock();
        CacheMetricsSnapshot::from_shard(&state.metrics, state.usage, state.capacity)
    }
}

impl<V> ShardState<V> {
    /// Allocates the entry and, if this shard caches at all, indexes it and
    /// charges usage. Returns the new entry's id with the handle reference
    /// already counted.
    fn index_new_entry(
        &mut self,
        key: &[u8],
        hash: u32,
        value: Arc<V>,
        charge: usize,
        deleter: Deleter<V>,
    ) -> EntryId {
        let id = self.arena.insert(Entry::new(key, hash, value, charge, deleter));
        if self.capacity > 0 {
            {
                let entry = &mut self.arena[id];
                entry.refs += 1; // the cache's reference
                entry.in_cache = true;
            }
            self.in_use.push_front(&mut self.arena, id);
            self.usage += charge;
            if let Some(old) = self.table.insert(&mut self.arena, id) {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.updates += 1;
                }
                self.finish_erase(old);
            }
        }
        // capacity == 0 turns caching off; the entry only backs the handle.
        #[cfg(feature = "metrics")]
        {
            self.metrics.inserts += 1;
        }
        id
    }

    /// Evicts oldest-first until usage fits capacity or nothing evictable
    /// remains, reporting each victim's key and charge to `record`.
    fn evict_to_capacity<F: FnMut(&[u8], usize)>(&mut self, mut record: F) {
        while self.usage > self.capacity {
            let Some(oldest) = self.lru.oldest() else { break };
            debug_assert_eq!(self.arena[oldest].refs, 1);
            {
                let entry = &self.arena[oldest];
                record(entry.key(), entry.charge);
            }
            let removed = self.table.remove_entry(&mut self.arena, oldest);
            debug_assert!(removed);
            #[cfg(feature = "metrics")]
            {
                self.metrics.evictions += 1;
            }
            self.finish_erase(oldest);
        }
    }

    /// Registers a new client reference, promoting the entry off the LRU
    /// list if this is its first.
    fn ref_entry(&mut self, id: EntryId) {
        let (refs, in_cache) = {
            let entry = &self.arena[id];
            (entry.refs, entry.in_cache)
        };
        if in_cache && refs == 1 {
            self.lru.unlink(&mut self.arena, id);
            self.in_use.push_front(&mut self.arena, id);
        }
        self.arena[id].refs += 1;
    }

    /// Drops one reference. On the last one the deleter runs and the slot
    /// is freed; on the last *client* reference the entry demotes to the
    /// LRU list as its newest member.
    fn unref(&mut self, id: EntryId) {
        let (refs, in_cache) = {
            let entry = &self.arena[id];
            (entry.refs, entry.in_cache)
        };
        debug_assert!(refs > 0);
        if refs == 1 {
            debug_assert!(!in_cache);
            let entry = self.arena.remove(id).expect("live entry");
            entry.into_deleter();
        } else {
            self.arena[id].refs = refs - 1;
            if in_cache && refs == 2 {
                self.in_use.unlink(&mut self.arena, id);
                self.lru.push_front(&mut self.arena, id);
            }
        }
    }

    /// Completes removal of an entry that has already left the hash table:
    /// unlink from its list, stop charging usage, drop the cache reference.
    fn finish_erase(&mut self, id: EntryId) {
        let (refs, charge) = {
            let entry = &self.arena[id];
            debug_assert!(entry.in_cache);
            (entry.refs, entry.charge)
        };
        if refs >= 2 {
            self.in_use.unlink(&mut self.arena, id);
        } else {
            self.lru.unlink(&mut self.arena, id);
        }
        self.arena[id].in_cache = false;
        self.usage -= charge;
        self.unref(id);
    }

    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut in_cache_charge = 0usize;
        let mut in_cache_count = 0usize;
        for (id, entry) in self.arena.iter() {
            if entry.refs == 0 {
                return Err(InvariantError::new(format!("{id:?} has zero refs")));
            }
            if entry.in_cache {
                in_cache_charge += entry.charge;
                in_cache_count += 1;
                if self.table.find(&self.arena, entry.key(), entry.hash) != Some(id) {
                    return Err(InvariantError::new(format!("{id:?} in cache but not indexed")));
                }
            } else if entry.prev.is_some() || entry.next.is_some() {
                return Err(InvariantError::new(format!("erased {id:?} still linked")));
            }
        }
        if in_cache_charge != self.usage {
            return Err(InvariantError::new(format!(
                "usage {} does not match summed charges {}",
                self.usage, in_cache_charge
            )));
        }
        if self.table.len() != in_cache_count {
            return Err(InvariantError::new("table does not index exactly the in-cache entries"));
        }
        if self.lru.len() + self.in_use.len() != in_cache_count {
            return Err(InvariantError::new("list membership does not cover in-cache entries"));
        }
        for id in self.lru.ids(&self.arena) {
            let entry = &self.arena[id];
            if !(entry.in_cache && entry.refs == 1) {
                return Err(InvariantError::new(format!("{id:?} on lru list with refs != 1")));
            }
        }
        for id in self.in_use.ids(&self.arena) {
            let entry = &self.arena[id];
            if !(entry.in_cache && entry.refs >= 2) {
                return Err(InvariantError::new(format!("{id:?} on in-use list with refs < 2")));
            }
        }
        self.arena.debug_validate_invariants();
        self.lru.debug_validate_invariants(&self.arena);
        self.in_use.debug_validate_invariants(&self.arena);
        self.table.debug_validate_invariants(&self.arena);
        Ok(())
    }
}

impl<V> Drop for ShardState<V> {
    fn drop(&mut self) {
        // A non-empty in-use list or an arena entry outside the LRU list
        // means a client still holds a handle.
        assert!(
            self.in_use.is_empty(),
            "cache dropped with outstanding handles"
        );
        while let Some(id) = self.lru.oldest() {
            self.lru.unlink(&mut self.arena, id);
            let entry = self.arena.remove(id).expect("live entry");
            debug_assert!(entry.in_cache && entry.refs == 1);
            entry.into_deleter();
        }
        assert!(
            self.arena.is_empty(),
            "cache dropped with outstanding handles"
        );
    }
}
