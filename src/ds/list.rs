//! Intrusive doubly-linked list over an [`EntryArena`].
//!
//! The list owns no nodes: `prev`/`next` links are fields of the entries
//! themselves, so a single arena serves several lists and an entry moves
//! between them in O(1) without reallocation. A shard keeps two of these:
//! the LRU list (entries held only by the cache) and the in-use list
//! (entries with outstanding client handles).
//!
//! ```text
//!   head ──► [newest] ◄──► [..] ◄──► [oldest] ◄── tail
//! ```
//!
//! An entry must be on at most one list at a time; `unlink` must be called
//! on the list the entry is actually on.

use crate::ds::arena::{EntryArena, EntryId};

/// Head of an intrusive list whose links live in arena entries.
///
/// `head` is the newest entry, `tail` the oldest.
#[derive(Debug, Default)]
pub(crate) struct EntryList {
    head: Option<EntryId>,
    tail: Option<EntryId>,
    len: usize,
}

impl EntryList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The oldest entry (eviction candidate), if any.
    pub(crate) fn oldest(&self) -> Option<EntryId> {
        self.tail
    }

    /// The newest entry, if any.
    #[cfg(test)]
    pub(crate) fn newest(&self) -> Option<EntryId> {
        self.head
    }

    /// Links `id` in as the newest entry.
    ///
    /// The entry must currently be detached (`prev`/`next` clear).
    pub(crate) fn push_front<V>(&mut self, arena: &mut EntryArena<V>, id: EntryId) {
        let old_head = self.head;
        {
            let entry = &mut arena[id];
            debug_assert!(entry.prev.is_none() && entry.next.is_none());
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(head) => arena[head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Detaches `id` from this list, clearing its links.
    pub(crate) fn unlink<V>(&mut self, arena: &mut EntryArena<V>, id: EntryId) {
        let (prev, next) = {
            let entry = &arena[id];
            (entry.prev, entry.next)
        };
        match prev {
            Some(prev) => arena[prev].next = next,
            None => {
                debug_assert_eq!(self.head, Some(id));
                self.head = next;
            }
        }
        match next {
            Some(next) => arena[next].prev = prev,
            None => {
                debug_assert_eq!(self.tail, Some(id));
                self.tail = prev;
            }
        }
        let entry = &mut arena[id];
        entry.prev = None;
        entry.next = None;
        self.len -= 1;
    }

    /// Collects the ids from newest to oldest. Debug/test use only.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn ids<V>(&self, arena: &EntryArena<V>) -> Vec<EntryId> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.head;
        while let Some(id) = cur {
            out.push(id);
            cur = arena[id].next;
            if out.len() > self.len {
                panic!("cycle detected in entry list");
            }
        }
        out
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants<V>(&self, arena: &EntryArena<V>) {
        let ids = self.ids(arena);
        assert_eq!(ids.len(), self.len);
        assert_eq!(self.head, ids.first().copied());
        assert_eq!(self.tail, ids.last().copied());
        for window in ids.windows(2) {
            assert_eq!(arena[window[0]].next, Some(window[1]));
            assert_eq!(arena[window[1]].prev, Some(window[0]));
        }
        if let Some(&first) = ids.first() {
            assert!(arena[first].prev.is_none());
        }
        if let Some(&last) = ids.last() {
            assert!(arena[last].next.is_none());
        }
    }
}
