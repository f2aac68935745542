//! Byte-slice hashing for key indexing and shard routing.
//!
//! The sharded cache routes a key by the top four bits of its 32-bit hash,
//! so dispersion in the high bits matters as much as in the low bits used
//! for bucket selection. The 64-bit `FxHasher` digest is folded with an
//! xor of its halves so both ends of the `u32` see the full mix.
//!
//! The mapping is deterministic: the same `(bytes, seed)` pair always
//! produces the same hash, which in turn always routes to the same shard.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Hashes `data` with the default seed of 0.
///
/// # Example
///
/// ```
/// use shardlru::ds::hash::hash_bytes;
///
/// let h = hash_bytes(b"user:123");
/// assert_eq!(h, hash_bytes(b"user:123"));
/// assert_ne!(h, hash_bytes(b"user:124"));
/// ```
pub fn hash_bytes(data: &[u8]) -> u32 {
    hash_bytes_seeded(data, 0)
}

/// Hashes `data` with an explicit seed. Different seeds produce different
/// distributions over the same keys.
pub fn hash_bytes_seeded(data: &[u8], seed: u64) -> u32 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write(data);
    let digest = hasher.finish();
    (digest as u32) ^ ((digest >> 32) as u32)
}
