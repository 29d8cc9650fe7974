//! Insertion-ordered persistent map.
//!
//! An [`OrderedMap`] pairs a hash trie from key to position with a [`List`]
//! ledger of entries. Updating an existing key rewrites its ledger slot in
//! place, so the key keeps its position. Removing a key leaves a hole in the
//! ledger; the ledger is compacted once holes outnumber live entries.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use static_assertions::assert_not_impl_any;
use tracing::{debug, trace};

use super::list::{self, List};
use super::map::Map;
use super::owner::{Edit, OwnerId};
use crate::error::{CollectionError, Result};

/// Ledger length below which holes are never compacted.
const COMPACTION_THRESHOLD: usize = 32;

/// A persistent map that iterates in insertion order.
///
/// # Examples
///
/// ```rust
/// use immutables::OrderedMap;
///
/// let map = OrderedMap::new()
///     .insert("x", 1)
///     .insert("y", 2)
///     .remove("x")
///     .insert("x", 3);
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["y", "x"]);
/// ```
pub struct OrderedMap<K, V> {
    index: Map<K, usize>,
    entries: List<Option<(K, V)>>,
}

impl<K, V> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            index: Map::new(),
            entries: List::new(),
        }
    }

    /// Number of live entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            ledger: self.entries.iter(),
            remaining: self.len(),
        }
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// The oldest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// The newest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.iter().next_back()
    }
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    /// Looks up the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Looks up the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let position = *self.index.get(key)?;
        self.entries
            .get(position)
            .and_then(Option::as_ref)
            .map(|(key, value)| (key, value))
    }

    /// Returns the value under `key`, or `not_set` when absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, not_set: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(not_set)
    }

    /// Looks up `key`, failing with `KeyNotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::KeyNotFound`](crate::CollectionError::KeyNotFound)
    /// if `key` is not present.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.get(key)
            .ok_or_else(|| CollectionError::key_not_found(key))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Position of `key` among the live entries.
    pub fn position_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        Some(
            (0..slot)
                .filter(|position| matches!(self.entries.get(*position), Some(Some(_))))
                .count(),
        )
    }
}

// =============================================================================
// Core Edits
// =============================================================================

impl<K: Clone + Hash + Eq, V: Clone> OrderedMap<K, V> {
    pub(crate) fn insert_in(&mut self, edit: Edit, key: K, value: V) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries.write(edit, slot, Some((key, value)));
        } else {
            let slot = self.entries.len();
            self.index.insert_in(edit, key.clone(), slot);
            self.entries.push_in(edit, Some((key, value)));
        }
    }

    pub(crate) fn remove_in<Q>(&mut self, edit: Edit, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.index.get(key) else {
            return false;
        };
        self.index.remove_in(edit, key);
        if self.index.is_empty() {
            self.entries = List::new();
            return true;
        }
        if slot + 1 == self.entries.len() {
            self.entries.pop_in(edit);
            while matches!(self.entries.last(), Some(None)) {
                self.entries.pop_in(edit);
            }
        } else {
            self.entries.write(edit, slot, None);
        }
        self.compact_in(edit);
        true
    }

    fn compact_in(&mut self, edit: Edit) {
        let ledger = self.entries.len();
        if ledger < COMPACTION_THRESHOLD || ledger < self.len() * 2 {
            return;
        }
        debug!(ledger, live = self.len(), "compacting ordered map ledger");
        let live: Vec<(K, V)> = self.entries.iter().flatten().cloned().collect();
        let mut entries = List::new();
        let mut index = Map::new();
        for (slot, (key, value)) in live.into_iter().enumerate() {
            index.insert_in(edit, key.clone(), slot);
            entries.push_in(edit, Some((key, value)));
        }
        self.index = index;
        self.entries = entries;
    }

    fn from_entries(entries: Vec<(K, V)>) -> Self {
        let edit = Some(OwnerId::fresh());
        let mut map = Self::new();
        for (key, value) in entries {
            map.insert_in(edit, key, value);
        }
        map
    }
}

// =============================================================================
// Persistent Operations
// =============================================================================

impl<K: Clone + Hash + Eq, V: Clone> OrderedMap<K, V> {
    /// Creates a map holding one entry.
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a map with `key` bound to `value`. An existing key keeps its
    /// position; a new key is appended.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut next = self.clone();
        next.insert_in(None, key, value);
        next
    }

    /// Returns a map without `key`. Absent keys return `self` unchanged.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut next = self.clone();
        next.remove_in(None, key);
        next
    }

    /// Replaces the value under `key` with `updater(current)`, starting from
    /// `not_set` when absent.
    #[must_use]
    pub fn update<F>(&self, key: K, not_set: V, updater: F) -> Self
    where
        F: FnOnce(V) -> V,
    {
        let current = self.get(&key).cloned().unwrap_or(not_set);
        self.insert(key, updater(current))
    }

    /// Generalized update: `None` from `updater` removes the entry.
    #[must_use]
    pub fn update_with<F>(&self, key: K, updater: F) -> Self
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        match updater(self.get(&key)) {
            Some(value) => self.insert(key, value),
            None => self.remove(&key),
        }
    }

    /// Merges `other` into `self`; keys from `other` win and new keys are
    /// appended in `other`'s order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.with_mutations(|map| {
            for (key, value) in other {
                map.insert(key.clone(), value.clone());
            }
        })
    }

    /// Merges `other` into `self`, resolving shared keys with
    /// `merger(existing, incoming, key)`.
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, mut merger: F) -> Self
    where
        F: FnMut(&V, &V, &K) -> V,
    {
        self.with_mutations(|map| {
            for (key, incoming) in other {
                let value = match map.get(key) {
                    Some(existing) => merger(existing, incoming, key),
                    None => incoming.clone(),
                };
                map.insert(key.clone(), value);
            }
        })
    }

    /// Maps every value, keeping keys and order.
    pub fn map<U, F>(&self, mut function: F) -> OrderedMap<K, U>
    where
        U: Clone,
        F: FnMut(&V, &K) -> U,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), function(value, key)))
            .collect()
    }

    /// Maps every key, keeping values and order.
    pub fn map_keys<L, F>(&self, mut function: F) -> OrderedMap<L, V>
    where
        L: Clone + Hash + Eq,
        F: FnMut(&K, &V) -> L,
    {
        self.iter()
            .map(|(key, value)| (function(key, value), value.clone()))
            .collect()
    }

    /// Keeps the entries accepted by `predicate`, preserving order.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.iter()
            .filter(|(key, value)| predicate(value, key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Swaps keys and values.
    pub fn flip(&self) -> OrderedMap<V, K>
    where
        V: Hash + Eq,
    {
        self.iter()
            .map(|(key, value)| (value.clone(), key.clone()))
            .collect()
    }

    /// Entries in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self::from_entries(
            self.iter()
                .rev()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Entries stably sorted by `compare` over `(key, value)` pairs.
    #[must_use]
    pub fn sort_by<F>(&self, mut compare: F) -> Self
    where
        F: FnMut((&K, &V), (&K, &V)) -> Ordering,
    {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_by(|left, right| compare(*left, *right));
        Self::from_entries(
            entries
                .into_iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Entries stably sorted by their values.
    #[must_use]
    pub fn sort(&self) -> Self
    where
        V: Ord,
    {
        self.sort_by(|(_, left), (_, right)| left.cmp(right))
    }

    /// Entries as an unordered [`Map`].
    pub fn to_map(&self) -> Map<K, V> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Opens a transient view stamped with a fresh owner.
    #[must_use]
    pub fn as_mutable(&self) -> TransientOrderedMap<K, V> {
        TransientOrderedMap::new(self.clone())
    }

    /// Applies a batch of edits through a transient and freezes the result.
    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientOrderedMap<K, V>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientOrderedMap
// =============================================================================

/// A mutable batch view over an [`OrderedMap`].
pub struct TransientOrderedMap<K, V> {
    map: OrderedMap<K, V>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientOrderedMap<i32, i32>: Send, Sync);

impl<K: Clone + Hash + Eq, V: Clone> TransientOrderedMap<K, V> {
    fn new(map: OrderedMap<K, V>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = map.len(), "opened transient ordered map");
        Self {
            map,
            owner,
            _marker: PhantomData,
        }
    }

    /// Current number of entries.
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no entries remain.
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Reads the current value under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    /// Binds `key` to `value`.
    pub fn insert(&mut self, key: K, value: V) -> &mut Self {
        self.map.insert_in(Some(self.owner), key, value);
        self
    }

    /// Removes `key` if present.
    pub fn remove<Q>(&mut self, key: &Q) -> &mut Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove_in(Some(self.owner), key);
        self
    }

    /// Replaces the value under `key` with `updater(current)`.
    pub fn update<F>(&mut self, key: K, not_set: V, updater: F) -> &mut Self
    where
        F: FnOnce(V) -> V,
    {
        let current = self.map.get(&key).cloned().unwrap_or(not_set);
        self.insert(key, updater(current))
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> &mut Self {
        self.map = OrderedMap::new();
        self
    }

    /// Freezes the batch into a persistent map. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> OrderedMap<K, V> {
        trace!(
            owner = self.owner.get(),
            size = self.map.len(),
            "froze transient ordered map"
        );
        self.map
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over an [`OrderedMap`] in insertion order.
pub struct Iter<'a, K, V> {
    ledger: list::Iter<'a, Option<(K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.ledger.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (key, value) = self.ledger.by_ref().rev().flatten().next()?;
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::iter::Flatten<list::IntoIter<Option<(K, V)>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter().flatten()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let edit = Some(OwnerId::fresh());
        for (key, value) in iter {
            self.insert_in(edit, key, value);
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if self.entries.shares_structure(&other.entries) {
            return true;
        }
        self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Hash, V: Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self {
            entry.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "OrderedMap {{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for OrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(super::map::EntriesVisitor::new())
    }
}
