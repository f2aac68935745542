//! Open-chained hash table over arena entries.
//!
//! Buckets hold the head `EntryId` of a chain threaded through
//! [`Entry::next_hash`](crate::ds::arena::Entry); the table owns no entry
//! storage of its own. The bucket count is a power of two and doubles once
//! the element count exceeds it, keeping the average chain length at or
//! below one.
//!
//! ```text
//!   buckets: [Some(id_3)] [None] [Some(id_0)] [None]
//!                 │                    │
//!                 ▼                    ▼
//!              entry_3 ─next_hash─► entry_7    entry_0
//! ```
//!
//! Bucket index is `hash & (len - 1)`. There is no interior locking; the
//! enclosing shard serializes all access.

use crate::ds::arena::{EntryArena, EntryId};

const INITIAL_BUCKETS: usize = 4;

/// Hash index mapping `(key, hash)` to the `EntryId` of the in-cache entry.
#[derive(Debug)]
pub(crate) struct HandleTable {
    buckets: Vec<Option<EntryId>>,
    elems: usize,
}

impl HandleTable {
    pub(crate) fn new() -> Self {
        Self {
            buckets: vec![None; INITIAL_BUCKETS],
            elems: 0,
        }
    }

    /// Number of entries currently indexed.
    pub(crate) fn len(&self) -> usize {
        self.elems
    }

    fn bucket_of(&self, hash: u32) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Finds the entry matching `(key, hash)`, if indexed.
    pub(crate) fn find<V>(
        &self,
        arena: &EntryArena<V>,
        key: &[u8],
        hash: u32,
    ) -> Option<EntryId> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(id) = cur {
            let entry = &arena[id];
            if entry.hash == hash && entry.key() == key {
                return Some(id);
            }
            cur = entry.next_hash;
        }
        None
    }

    /// Indexes `id`, returning the displaced entry if one with the same key
    /// was already present. The displaced entry is unlinked from its chain
    /// but otherwise untouched.
    pub(crate) fn insert<V>(&mut self, arena: &mut EntryArena<V>, id: EntryId) -> Option<EntryId> {
        let hash = arena[id].hash;
        let bucket = self.bucket_of(hash);

        let mut pred: Option<EntryId> = None;
        let mut cur = self.buckets[bucket];
        while let Some(old) = cur {
            let next = arena[old].next_hash;
            if arena[old].hash == hash && arena[old].key == arena[id].key {
                // Splice the new entry into the old one's chain position.
                arena[id].next_hash = next;
                match pred {
                    Some(pred) => arena[pred].next_hash = Some(id),
                    None => self.buckets[bucket] = Some(id),
                }
                arena[old].next_hash = None;
                return Some(old);
            }
            pred = Some(old);
            cur = next;
        }

        arena[id].next_hash = self.buckets[bucket];
        self.buckets[bucket] = Some(id);
        self.elems += 1;
        if self.elems > self.buckets.len() {
            self.grow(arena);
        }
        None
    }

    /// Unindexes the entry matching `(key, hash)` and returns its id.
    pub(crate) fn remove<V>(
        &mut self,
        arena: &mut EntryArena<V>,
        key: &[u8],
        hash: u32,
    ) -> Option<EntryId> {
        let bucket = self.bucket_of(hash);
        let mut pred: Option<EntryId> = None;
        let mut cur = self.buckets[bucket];
        while let Some(id) = cur {
            let next = arena[id].next_hash;
            if arena[id].hash == hash && arena[id].key() == key {
                self.splice_out(arena, bucket, pred, id, next);
                return Some(id);
            }
            pred = Some(id);
            cur = next;
        }
        None
    }

    /// Unindexes a specific entry by id. Returns `false` if it was not
    /// indexed (which would indicate a broken invariant in the caller).
    pub(crate) fn remove_entry<V>(&mut self, arena: &mut EntryArena<V>, id: EntryId) -> bool {
        let bucket = self.bucket_of(arena[id].hash);
        let mut pred: Option<EntryId> = None;
        let mut cur = self.buckets[bucket];
        while let Some(candidate) = cur {
            let next = arena[candidate].next_hash;
            if candidate == id {
                self.splice_out(arena, bucket, pred, id, next);
                return true;
            }
            pred = Some(candidate);
            cur = next;
        }
        false
    }

    fn splice_out<V>(
        &mut self,
        arena: &mut EntryArena<V>,
        bucket: usize,
        pred: Option<EntryId>,
        id: EntryId,
        next: Option<EntryId>,
    ) {
        match pred {
            Some(pred) => arena[pred].next_hash = next,
            None => self.buckets[bucket] = next,
        }
        arena[id].next_hash = None;
        self.elems -= 1;
    }

    fn grow<V>(&mut self, arena: &mut EntryArena<V>) {
        let new_len = self.buckets.len() * 2;
        let old = std::mem::replace(&mut self.buckets, vec![None; new_len]);
        for head in old {
            let mut cur = head;
            while let Some(id) = cur {
                let next = arena[id].next_hash;
                let bucket = self.bucket_of(arena[id].hash);
                arena[id].next_hash = self.buckets[bucket];
                self.buckets[bucket] = Some(id);
                cur = next;
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants<V>(&self, arena: &EntryArena<V>) {
        assert!(self.buckets.len().is_power_of_two());
        let mut chained = 0;
        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(id) = cur {
                assert_eq!(self.bucket_of(arena[id].hash), bucket);
                chained += 1;
                assert!(chained <= self.elems, "cycle detected in hash chain");
                cur = arena[id].next_hash;
            }
        }
        assert_eq!(chained, self.elems);
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::ds::arena::Entry;
    use crate::ds::hash::hash_bytes;
    use proptest::prelude::*;
    use rustc_hash::FxHashMap;
    use std::sync::Arc;

    proptest! {
        /// The table agrees with a reference map under random insert/remove.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_map(
            ops in prop::collection::vec((any::<u8>(), 0u8..16), 1..300)
        ) {
            let mut arena: EntryArena<u64> = EntryArena::new();
            let mut table = HandleTable::new();
            let mut reference: FxHashMap<Vec<u8>, EntryId> = FxHashMap::default();

            for (op, key_byte) in ops {
                let key = vec![key_byte];
                let hash = hash_bytes(&key);
                if op % 2 == 0 {
                    let id = arena.insert(Entry::new(
                        &key,
                        hash,
                        Arc::new(0),
                        1,
                        Box::new(|_, _| {}),
                    ));
                    let displaced = table.insert(&mut arena, id);
                    let expected = reference.insert(key, id);
                    prop_assert_eq!(displaced, expected);
                    if let Some(old) = displaced {
                        arena.remove(old);
                    }
                } else {
                    let removed = table.remove(&mut arena, &key, hash);
                    let expected = reference.remove(&key);
                    prop_assert_eq!(removed, expected);
                    if let Some(id) = removed {
                        arena.remove(id);
                    }
                }
                table.debug_validate_invariants(&arena);
            }

            prop_assert_eq!(table.len(), reference.len());
            for (key, id) in reference {
                prop_assert_eq!(table.find(&arena, &key, hash_bytes(&key)), Some(id));
            }
        }
    }
}
