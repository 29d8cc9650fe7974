//! Key hashing for the hash trie.
//!
//! The hasher is chosen by feature flag: `fxhash` selects `rustc-hash`,
//! `ahash` selects `ahash` with fixed seeds, and the default is the
//! standard library's SipHash. Every choice is deterministic within a
//! process so equal keys always land in the same slot.

use std::hash::{Hash, Hasher};

/// Number of hash bits consumed per trie level.
pub(crate) const BITS_PER_LEVEL: usize = 5;

/// Children per trie node.
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Mask selecting one level's worth of bits.
pub(crate) const MASK: usize = BRANCHING_FACTOR - 1;

#[cfg(feature = "fxhash")]
fn new_hasher() -> rustc_hash::FxHasher {
    rustc_hash::FxHasher::default()
}

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
fn new_hasher() -> ahash::AHasher {
    use std::hash::BuildHasher;
    ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
    .build_hasher()
}

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
fn new_hasher() -> std::collections::hash_map::DefaultHasher {
    std::collections::hash_map::DefaultHasher::new()
}

/// Computes the 64-bit trie hash of a key.
#[inline]
pub(crate) fn compute_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = new_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the slot index for `depth` from a hash.
#[inline]
pub(crate) const fn hash_index(hash: u64, depth: usize) -> usize {
    if depth * BITS_PER_LEVEL >= 64 {
        0
    } else {
        ((hash >> (depth * BITS_PER_LEVEL)) as usize) & MASK
    }
}

/// Bit selecting `index` within a node bitmap.
#[inline]
pub(crate) const fn bit_for(index: usize) -> u32 {
    1 << index
}

/// Position of `bit` in the compressed children array.
#[inline]
pub(crate) const fn compressed_index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}
