//! Value equality and hashing shared by every collection.
//!
//! Collections implement `PartialEq`/`Eq` structurally: indexed collections
//! compare positionally, keyed collections compare key/value pairs and sets
//! compare membership. Comparisons first check whether the two sides share
//! nodes and skip shared subtrees. [`hash_code`] is consistent with that
//! equality: unordered collections combine element hashes with a
//! commutative sum so iteration order never leaks into the hash.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Returns `true` when `left` and `right` are the same value.
///
/// Identical references are equal without inspecting their contents.
///
/// # Examples
///
/// ```rust
/// use immutables::{List, is};
///
/// let original = List::from([1, 2, 3]);
/// let rebuilt = List::from([1, 2]).push(3);
/// assert!(is(&original, &rebuilt));
/// assert!(!is(&original, &original.pop()));
/// ```
pub fn is<T: PartialEq + ?Sized>(left: &T, right: &T) -> bool {
    std::ptr::eq(left, right) || left == right
}

/// Hashes a value to 32 bits, consistently with [`is`].
///
/// # Examples
///
/// ```rust
/// use immutables::{Set, hash_code};
///
/// let forward: Set<i32> = (0..50).collect();
/// let backward: Set<i32> = (0..50).rev().collect();
/// assert_eq!(hash_code(&forward), hash_code(&backward));
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn hash_code<T: Hash + ?Sized>(value: &T) -> u32 {
    let hash = stable_hash(value);
    (hash ^ (hash >> 32)) as u32
}

fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Combines element hashes so the result does not depend on their order.
pub(crate) fn unordered_hash<I>(items: I) -> u64
where
    I: IntoIterator,
    I::Item: Hash,
{
    items
        .into_iter()
        .fold(0_u64, |total, item| total.wrapping_add(stable_hash(&item)))
}
