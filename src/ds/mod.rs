//! Internal data structures backing the cache shards.
//!
//! The arena, list, and table share one design: entries live in
//! [`arena::EntryArena`] and everything else links them by `EntryId`.
//! Only the hashing helpers are part of the public surface.

pub(crate) mod arena;
pub mod hash;
pub(crate) mod list;
pub(crate) mod table;

pub use hash::{hash_bytes, hash_bytes_seeded};
