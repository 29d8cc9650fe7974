//! Lazy sequences of key/value entries.

use std::fmt;
use std::hash::Hash;

use super::{Seq, SeqIter, SeqKind};
use crate::persistent::{Map, OrderedMap};

/// A lazy sequence of `(key, value)` entries.
///
/// ```rust
/// use immutables::{KeyedSeq, Map};
///
/// let prices = Map::from([("apple", 3), ("pear", 5)]);
/// let doubled = KeyedSeq::from(prices).map(|price, _| price * 2).to_map();
/// assert_eq!(doubled.get("pear"), Some(&10));
/// ```
pub struct KeyedSeq<K, V> {
    entries: Seq<(K, V)>,
}

impl<K, V> Clone for KeyedSeq<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K: Clone + 'static, V: Clone + 'static> KeyedSeq<K, V> {
    /// Views an entry sequence as keyed.
    pub const fn new(entries: Seq<(K, V)>) -> Self {
        Self { entries }
    }

    pub fn size(&self) -> Option<usize> {
        self.entries.size()
    }

    pub fn count(&self) -> usize {
        self.entries.count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> SeqIter<(K, V)> {
        self.entries.iter()
    }

    /// Maps values, keeping keys.
    pub fn map<U, F>(&self, function: F) -> KeyedSeq<K, U>
    where
        U: Clone + 'static,
        F: Fn(V, &K) -> U + 'static,
    {
        KeyedSeq::new(self.entries.map(move |(key, value)| {
            let mapped = function(value, &key);
            (key, mapped)
        }))
    }

    /// Maps keys, keeping values.
    pub fn map_keys<L, F>(&self, function: F) -> KeyedSeq<L, V>
    where
        L: Clone + 'static,
        F: Fn(K, &V) -> L + 'static,
    {
        KeyedSeq::new(self.entries.map(move |(key, value)| {
            let mapped = function(key, &value);
            (mapped, value)
        }))
    }

    pub fn map_entries<L, U, F>(&self, function: F) -> KeyedSeq<L, U>
    where
        L: Clone + 'static,
        U: Clone + 'static,
        F: Fn((K, V)) -> (L, U) + 'static,
    {
        KeyedSeq::new(self.entries.map(function))
    }

    /// Swaps keys and values.
    pub fn flip(&self) -> KeyedSeq<V, K> {
        KeyedSeq::new(self.entries.map(|(key, value)| (value, key)))
    }

    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&V, &K) -> bool + 'static,
    {
        Self::new(self.entries.filter(move |(key, value)| predicate(value, key)))
    }

    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        Self::new(self.entries.take(count))
    }

    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        Self::new(self.entries.skip(count))
    }

    #[must_use]
    pub fn reverse(&self) -> Self {
        Self::new(self.entries.reverse())
    }

    #[must_use]
    pub fn cache_result(&self) -> Self {
        Self::new(self.entries.cache_result())
    }

    pub fn key_seq(&self) -> Seq<K> {
        self.entries.map(|(key, _)| key)
    }

    pub fn value_seq(&self) -> Seq<V> {
        self.entries.map(|(_, value)| value)
    }

    pub fn entry_seq(&self) -> Seq<(K, V)> {
        self.entries.clone()
    }

    /// The value of the first entry whose key equals `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        K: PartialEq,
    {
        self.entries
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// The key of the first entry holding `value`.
    pub fn key_of(&self, value: &V) -> Option<K>
    where
        V: PartialEq,
    {
        self.find_key(|candidate, _| candidate == value)
    }

    pub fn find_key<F>(&self, mut predicate: F) -> Option<K>
    where
        F: FnMut(&V, &K) -> bool,
    {
        self.entries
            .find(|(key, value)| predicate(value, key))
            .map(|(key, _)| key)
    }

    /// Entries as a [`Map`]; later entries win on duplicate keys.
    pub fn to_map(&self) -> Map<K, V>
    where
        K: Hash + Eq,
    {
        self.entries.iter().collect()
    }

    pub fn to_ordered_map(&self) -> OrderedMap<K, V>
    where
        K: Hash + Eq,
    {
        self.entries.iter().collect()
    }
}

impl<K: Clone + Hash + Eq + 'static, V: Clone + 'static> From<Map<K, V>> for KeyedSeq<K, V> {
    fn from(map: Map<K, V>) -> Self {
        let size = map.len();
        Self::new(Seq::from_collection(map, size, SeqKind::Indexed))
    }
}

impl<K: Clone + Hash + Eq + 'static, V: Clone + 'static> From<OrderedMap<K, V>>
    for KeyedSeq<K, V>
{
    fn from(map: OrderedMap<K, V>) -> Self {
        let size = map.len();
        Self::new(Seq::from_collection(map, size, SeqKind::Indexed))
    }
}

impl<K: Clone + 'static, V: Clone + 'static> From<Seq<(K, V)>> for KeyedSeq<K, V> {
    fn from(entries: Seq<(K, V)>) -> Self {
        Self::new(entries)
    }
}

impl<K: Clone + 'static, V: Clone + 'static> IntoIterator for KeyedSeq<K, V> {
    type Item = (K, V);
    type IntoIter = SeqIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> fmt::Debug for KeyedSeq<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("KeyedSeq")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}
