//! Capability traits shared by the concrete collections.
//!
//! [`Collection`] carries the operations every collection supports, each
//! returning the implementing type. [`IndexedCollection`],
//! [`KeyedCollection`] and [`SetCollection`] add the operations that only
//! make sense for positional, keyed or membership-based collections.
//!
//! These operations are eager. For lazy pipelines convert with
//! [`Collection::to_seq`].
//!
//! ```rust
//! use immutables::List;
//! use immutables::prelude::*;
//!
//! let list = List::from([5, 1, 4, 2, 3]);
//! assert_eq!(list.filter(|x| x % 2 == 1).sort(), List::from([1, 3, 5]));
//! assert_eq!(list.take_last(2), List::from([2, 3]));
//! ```

use std::cmp::Ordering;
use std::hash::Hash;

use crate::persistent::{List, Map, OrderedMap, OrderedSet, Set, Stack};
use crate::seq::{KeyedSeq, Seq, SeqKind, group_items};

// =============================================================================
// Collection
// =============================================================================

/// Operations common to every collection.
pub trait Collection: Clone + Sized + 'static {
    /// What iteration yields: an element, or a `(key, value)` entry.
    type Item: Clone + 'static;

    /// Number of items.
    fn size(&self) -> usize;

    /// Owned items in iteration order.
    fn items(&self) -> impl Iterator<Item = Self::Item> + '_;

    /// Builds a collection of this type from items.
    fn from_items<I: IntoIterator<Item = Self::Item>>(items: I) -> Self;

    /// A lazy sequence over the items.
    fn to_seq(&self) -> Seq<Self::Item>;

    #[must_use]
    fn filter<F: FnMut(&Self::Item) -> bool>(&self, predicate: F) -> Self {
        Self::from_items(self.items().filter(predicate))
    }

    #[must_use]
    fn filter_not<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Self {
        Self::from_items(self.items().filter(|item| !predicate(item)))
    }

    #[must_use]
    fn take(&self, count: usize) -> Self {
        Self::from_items(self.items().take(count))
    }

    #[must_use]
    fn skip(&self, count: usize) -> Self {
        Self::from_items(self.items().skip(count))
    }

    #[must_use]
    fn take_last(&self, count: usize) -> Self {
        self.skip(self.size().saturating_sub(count))
    }

    #[must_use]
    fn skip_last(&self, count: usize) -> Self {
        self.take(self.size().saturating_sub(count))
    }

    #[must_use]
    fn take_while<F: FnMut(&Self::Item) -> bool>(&self, predicate: F) -> Self {
        Self::from_items(self.items().take_while(predicate))
    }

    #[must_use]
    fn skip_while<F: FnMut(&Self::Item) -> bool>(&self, predicate: F) -> Self {
        Self::from_items(self.items().skip_while(predicate))
    }

    #[must_use]
    fn take_until<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Self {
        self.take_while(|item| !predicate(item))
    }

    #[must_use]
    fn skip_until<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Self {
        self.skip_while(|item| !predicate(item))
    }

    #[must_use]
    fn rest(&self) -> Self {
        self.skip(1)
    }

    #[must_use]
    fn but_last(&self) -> Self {
        self.skip_last(1)
    }

    #[must_use]
    fn reverse(&self) -> Self {
        let mut items: Vec<Self::Item> = self.items().collect();
        items.reverse();
        Self::from_items(items)
    }

    /// Stable sort by the items' natural order.
    #[must_use]
    fn sort(&self) -> Self
    where
        Self::Item: Ord,
    {
        self.sort_by(Ord::cmp)
    }

    #[must_use]
    fn sort_by<F: FnMut(&Self::Item, &Self::Item) -> Ordering>(&self, compare: F) -> Self {
        let mut items: Vec<Self::Item> = self.items().collect();
        items.sort_by(compare);
        Self::from_items(items)
    }

    #[must_use]
    fn sort_by_key<K: Ord, F: FnMut(&Self::Item) -> K>(&self, key: F) -> Self {
        let mut items: Vec<Self::Item> = self.items().collect();
        items.sort_by_key(key);
        Self::from_items(items)
    }

    /// Calls `function` on each item until it returns `false`. Returns the
    /// number of items visited.
    fn for_each<F: FnMut(Self::Item) -> bool>(&self, mut function: F) -> usize {
        let mut visited = 0;
        for item in self.items() {
            visited += 1;
            if !function(item) {
                break;
            }
        }
        visited
    }

    fn reduce<A, F: FnMut(A, Self::Item) -> A>(&self, initial: A, function: F) -> A {
        self.items().fold(initial, function)
    }

    fn count_where<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> usize {
        self.items().filter(|item| predicate(item)).count()
    }

    fn find<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Option<Self::Item> {
        self.items().find(|item| predicate(item))
    }

    fn find_last<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Option<Self::Item> {
        self.items().filter(|item| predicate(item)).last()
    }

    fn every<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> bool {
        self.items().all(|item| predicate(&item))
    }

    fn some<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> bool {
        self.items().any(|item| predicate(&item))
    }

    fn includes(&self, value: &Self::Item) -> bool
    where
        Self::Item: PartialEq,
    {
        self.items().any(|item| item == *value)
    }

    /// The greatest item under `compare`; the first one wins ties.
    fn max_by<F: FnMut(&Self::Item, &Self::Item) -> Ordering>(
        &self,
        mut compare: F,
    ) -> Option<Self::Item> {
        self.items().reduce(|best, item| {
            if compare(&item, &best) == Ordering::Greater {
                item
            } else {
                best
            }
        })
    }

    /// The least item under `compare`; the first one wins ties.
    fn min_by<F: FnMut(&Self::Item, &Self::Item) -> Ordering>(
        &self,
        mut compare: F,
    ) -> Option<Self::Item> {
        self.items().reduce(|best, item| {
            if compare(&item, &best) == Ordering::Less {
                item
            } else {
                best
            }
        })
    }

    fn max(&self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        self.max_by(Ord::cmp)
    }

    fn min(&self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        self.min_by(Ord::cmp)
    }

    /// Splits the items into collections of this type, keyed by `grouper`
    /// in first-seen order.
    fn group_by<G, F>(&self, grouper: F) -> OrderedMap<G, Self>
    where
        G: Clone + Hash + Eq,
        F: FnMut(&Self::Item) -> G,
    {
        group_items(self.items(), grouper)
            .into_iter()
            .map(|(group, members)| (group, Self::from_items(members)))
            .collect()
    }

    fn count_by<G, F>(&self, mut grouper: F) -> Map<G, usize>
    where
        G: Clone + Hash + Eq,
        F: FnMut(&Self::Item) -> G,
    {
        Map::new().with_mutations(|counts| {
            for item in self.items() {
                counts.update(grouper(&item), 0, |count| count + 1);
            }
        })
    }

    fn to_vec(&self) -> Vec<Self::Item> {
        self.items().collect()
    }

    fn to_list(&self) -> List<Self::Item> {
        self.items().collect()
    }

    /// The items as a stack, first item on top.
    fn to_stack(&self) -> Stack<Self::Item> {
        self.items().collect()
    }

    fn to_set(&self) -> Set<Self::Item>
    where
        Self::Item: Hash + Eq,
    {
        self.items().collect()
    }

    fn to_ordered_set(&self) -> OrderedSet<Self::Item>
    where
        Self::Item: Hash + Eq,
    {
        self.items().collect()
    }
}

// =============================================================================
// Capability Traits
// =============================================================================

/// Collections addressed by position.
pub trait IndexedCollection: Collection {
    fn index_of(&self, value: &Self::Item) -> Option<usize>
    where
        Self::Item: PartialEq,
    {
        self.items().position(|item| item == *value)
    }

    fn last_index_of(&self, value: &Self::Item) -> Option<usize>
    where
        Self::Item: PartialEq,
    {
        self.find_last_index(|item| item == value)
    }

    fn find_index<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Option<usize> {
        self.items().position(|item| predicate(&item))
    }

    fn find_last_index<F: FnMut(&Self::Item) -> bool>(&self, mut predicate: F) -> Option<usize> {
        self.items()
            .enumerate()
            .filter(|(_, item)| predicate(item))
            .map(|(index, _)| index)
            .last()
    }

    /// Replaces `remove_count` items at `index` with `values`. An `index`
    /// past the end appends.
    #[must_use]
    fn splice<I: IntoIterator<Item = Self::Item>>(
        &self,
        index: usize,
        remove_count: usize,
        values: I,
    ) -> Self {
        let resume = index.saturating_add(remove_count);
        Self::from_items(
            self.items()
                .take(index)
                .chain(values)
                .chain(self.items().skip(resume)),
        )
    }

    /// Places `separator` between neighbouring items.
    #[must_use]
    fn interpose(&self, separator: Self::Item) -> Self {
        Self::from_items(self.to_seq().interpose(separator))
    }

    /// Alternates items of `self` and `others`, stopping as soon as any
    /// of them runs out.
    #[must_use]
    fn interleave(&self, others: &[Self]) -> Self {
        let others: Vec<Seq<Self::Item>> = others.iter().map(Collection::to_seq).collect();
        Self::from_items(self.to_seq().interleave(&others))
    }
}

/// Collections of `(key, value)` entries.
pub trait KeyedCollection<K, V>: Collection<Item = (K, V)>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn key_seq(&self) -> Seq<K> {
        self.to_seq().map(|(key, _)| key)
    }

    fn value_seq(&self) -> Seq<V> {
        self.to_seq().map(|(_, value)| value)
    }

    fn to_keyed_seq(&self) -> KeyedSeq<K, V> {
        KeyedSeq::new(self.to_seq())
    }

    /// The key of the first entry holding `value`.
    fn key_of(&self, value: &V) -> Option<K>
    where
        V: PartialEq,
    {
        self.find_key(|candidate, _| candidate == value)
    }

    /// The key of the last entry holding `value`.
    fn last_key_of(&self, value: &V) -> Option<K>
    where
        V: PartialEq,
    {
        self.find_last_key(|candidate, _| candidate == value)
    }

    fn find_key<F: FnMut(&V, &K) -> bool>(&self, predicate: F) -> Option<K> {
        self.find_entry(predicate).map(|(key, _)| key)
    }

    fn find_last_key<F: FnMut(&V, &K) -> bool>(&self, predicate: F) -> Option<K> {
        self.find_last_entry(predicate).map(|(key, _)| key)
    }

    /// The first entry for which `predicate(value, key)` holds.
    fn find_entry<F: FnMut(&V, &K) -> bool>(&self, mut predicate: F) -> Option<(K, V)> {
        self.items().find(|(key, value)| predicate(value, key))
    }

    fn find_last_entry<F: FnMut(&V, &K) -> bool>(&self, mut predicate: F) -> Option<(K, V)> {
        self.items().filter(|(key, value)| predicate(value, key)).last()
    }
}

/// Collections of unique members.
pub trait SetCollection: Collection {
    /// Returns `true` if `value` is a member.
    fn has(&self, value: &Self::Item) -> bool;

    fn is_subset_of<C: SetCollection<Item = Self::Item>>(&self, other: &C) -> bool {
        self.size() <= other.size() && self.items().all(|member| other.has(&member))
    }

    fn is_superset_of<C: SetCollection<Item = Self::Item>>(&self, other: &C) -> bool {
        other.is_subset_of(self)
    }
}

// =============================================================================
// Implementations
// =============================================================================

impl<T: Clone + 'static> Collection for List<T> {
    type Item = T;

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().cloned()
    }

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<T> {
        Seq::from(self.clone())
    }

    fn reverse(&self) -> Self {
        self.iter().rev().cloned().collect()
    }

    fn take_last(&self, count: usize) -> Self {
        let begin = self.len().saturating_sub(count);
        self.slice(isize::try_from(begin).unwrap_or(isize::MAX), None)
    }
}

impl<T: Clone + 'static> IndexedCollection for List<T> {}

impl<T: Clone + 'static> Collection for Stack<T> {
    type Item = T;

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().cloned()
    }

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<T> {
        Seq::from(self.clone())
    }
}

impl<T: Clone + 'static> IndexedCollection for Stack<T> {}

impl<K, V> Collection for Map<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
    type Item = (K, V);

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.iter().map(|(key, value)| (key.clone(), value.clone()))
    }

    fn from_items<I: IntoIterator<Item = (K, V)>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<(K, V)> {
        Seq::from_collection(self.clone(), self.len(), SeqKind::Indexed)
    }
}

impl<K, V> KeyedCollection<K, V> for Map<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
}

impl<K, V> Collection for OrderedMap<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
    type Item = (K, V);

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.iter().map(|(key, value)| (key.clone(), value.clone()))
    }

    fn from_items<I: IntoIterator<Item = (K, V)>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<(K, V)> {
        Seq::from_collection(self.clone(), self.len(), SeqKind::Indexed)
    }
}

impl<K, V> KeyedCollection<K, V> for OrderedMap<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
}

impl<T: Clone + Hash + Eq + 'static> Collection for Set<T> {
    type Item = T;

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().cloned()
    }

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<T> {
        Seq::from(self.clone())
    }
}

impl<T: Clone + Hash + Eq + 'static> SetCollection for Set<T> {
    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }
}

impl<T: Clone + Hash + Eq + 'static> Collection for OrderedSet<T> {
    type Item = T;

    fn size(&self) -> usize {
        self.len()
    }

    fn items(&self) -> impl Iterator<Item = T> + '_ {
        self.iter().cloned()
    }

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn to_seq(&self) -> Seq<T> {
        Seq::from(self.clone())
    }
}

impl<T: Clone + Hash + Eq + 'static> SetCollection for OrderedSet<T> {
    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_filter_keeps_collection_type() {
        let set = Set::from([1, 2, 3, 4]);
        let evens: Set<i32> = Collection::filter(&set, |x| x % 2 == 0);
        assert_eq!(evens, Set::from([2, 4]));
    }

    #[rstest]
    fn test_take_last_on_list() {
        let list: List<i32> = (0..100).collect();
        assert_eq!(list.take_last(3).to_vec(), vec![97, 98, 99]);
        assert_eq!(list.take_last(500).len(), 100);
        assert!(list.take_last(0).is_empty());
    }

    #[rstest]
    fn test_group_by_returns_same_collection_type() {
        let list = List::from(["apple", "avocado", "banana"]);
        let groups = list.group_by(|word| word.chars().next());
        assert_eq!(groups.get(&Some('a')), Some(&List::from(["apple", "avocado"])));
        assert_eq!(groups.len(), 2);
    }

    #[rstest]
    fn test_count_by() {
        let counts = List::from([1, 2, 3, 4, 5]).count_by(|x| x % 2 == 0);
        assert_eq!(counts.get(&true), Some(&2));
        assert_eq!(counts.get(&false), Some(&3));
    }

    #[rstest]
    fn test_splice_and_interpose() {
        let list = List::from([1, 2, 3, 4]);
        assert_eq!(list.splice(1, 2, [9]), List::from([1, 9, 4]));
        assert_eq!(list.splice(10, 0, [5]), List::from([1, 2, 3, 4, 5]));
        assert_eq!(List::from([1, 2]).interpose(0), List::from([1, 0, 2]));
    }

    #[rstest]
    fn test_interleave_lists() {
        let left = List::from([1, 3, 5]);
        let right = List::from([2, 4]);
        assert_eq!(left.interleave(&[right]), List::from([1, 2, 3, 4]));
    }

    #[rstest]
    fn test_index_lookups() {
        let list = List::from(['a', 'b', 'a']);
        assert_eq!(list.index_of(&'a'), Some(0));
        assert_eq!(list.last_index_of(&'a'), Some(2));
        assert_eq!(list.find_last_index(|c| *c == 'b'), Some(1));
        assert_eq!(list.index_of(&'z'), None);
    }

    #[rstest]
    fn test_keyed_lookups() {
        let map = OrderedMap::from([("a", 1), ("b", 2), ("c", 1)]);
        assert_eq!(map.key_of(&1), Some("a"));
        assert_eq!(map.last_key_of(&1), Some("c"));
        assert_eq!(map.key_seq().to_vec(), vec!["a", "b", "c"]);
    }

    #[rstest]
    #[case(1, Some(("a", 1)), Some(("c", 1)))]
    #[case(2, Some(("b", 2)), Some(("b", 2)))]
    #[case(7, None, None)]
    fn test_find_entry(
        #[case] wanted: i32,
        #[case] first: Option<(&'static str, i32)>,
        #[case] last: Option<(&'static str, i32)>,
    ) {
        let map = OrderedMap::from([("a", 1), ("b", 2), ("c", 1)]);
        assert_eq!(map.find_entry(|value, _| *value == wanted), first);
        assert_eq!(map.find_last_entry(|value, _| *value == wanted), last);
    }

    #[rstest]
    fn test_find_entry_sees_keys() {
        let map = Map::from([("x", 10), ("y", 20)]);
        assert_eq!(map.find_entry(|_, key| *key == "y"), Some(("y", 20)));
        assert_eq!(map.find_last_entry(|value, _| *value > 100), None);
    }

    #[rstest]
    fn test_set_relations_across_types() {
        let small = Set::from([1, 2]);
        let ordered = OrderedSet::from([3, 2, 1]);
        assert!(small.is_subset_of(&ordered));
        assert!(ordered.is_superset_of(&small));
    }

    #[rstest]
    fn test_stack_sort_and_reverse() {
        let stack = Stack::from([2, 3, 1]);
        assert_eq!(stack.sort().to_vec(), vec![1, 2, 3]);
        assert_eq!(Collection::reverse(&stack).to_vec(), vec![1, 3, 2]);
    }
}
