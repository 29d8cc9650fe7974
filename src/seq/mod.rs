//! Lazy sequences.
//!
//! A [`Seq`] is a pipeline of stages over a source. Composing a stage is
//! O(1) and runs nothing; items are pulled through the whole chain only
//! when a terminal operation (`to_vec`, `count`, `for_each`, iteration,
//! ...) consumes the sequence. Unbounded sources such as [`repeat`] and
//! [`range_from`] are safe to compose as long as something downstream
//! bounds them.
//!
//! ```rust
//! use immutables::{Seq, repeat};
//!
//! let squares = Seq::of([1, 2, 3, 4, 5, 6])
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * x);
//! assert_eq!(squares.to_vec(), vec![4, 16, 36]);
//!
//! let bounded = repeat(7).map(|x| x + 1).take(3);
//! assert_eq!(bounded.count(), 3);
//! ```
//!
//! Each node reports its size when it is known without iterating. `map`,
//! `reverse`, `sort`, `zip`, `take`, `skip`, `concat` and `interpose`
//! carry sizes through; `filter`, the `*_while` stages and flattening
//! erase them, so `count` on such a sequence walks it.

mod keyed;
mod source;
mod stage;

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use crate::persistent::{List, Map, OrderedMap, OrderedSet, Set, Stack};
use stage::{
    ConcatStage, DeepFlattenStage, FilterStage, FlattenStage, InterleaveStage, InterposeStage,
    MapIndexedStage, MapStage, ReverseStage, SkipLastStage, SkipStage, SkipWhileStage,
    SliceStage, SortStage, TakeLastStage, TakeStage, TakeWhileStage, ZipStage,
};

pub use keyed::KeyedSeq;
pub use source::{range, range_by, range_from, repeat, repeat_n};
use source::SliceSource;

// =============================================================================
// Node Protocol
// =============================================================================

pub(crate) type Items<T> = Box<dyn Iterator<Item = T>>;
pub(crate) type Node<T> = Rc<dyn SeqNode<T>>;

/// One node of a pipeline.
pub(crate) trait SeqNode<T> {
    /// A fresh iterator over the node's items.
    fn iterate(self: Rc<Self>) -> Items<T>;

    /// The items back to front. Realizes the node unless overridden.
    fn iterate_reversed(self: Rc<Self>) -> Items<T>
    where
        T: 'static,
    {
        let mut items: Vec<T> = self.iterate().collect();
        items.reverse();
        Box::new(items.into_iter())
    }

    /// Number of items, when known without iterating.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Whether `iterate` can be called again with the same result.
    fn restartable(&self) -> bool {
        true
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        self.iterate().nth(index)
    }
}

/// Items that may themselves contain items of the same type, for
/// [`Seq::flatten_depth`].
pub trait Nested: Sized {
    /// The nested items, or `None` when `self` is a leaf.
    fn children(&self) -> Option<Vec<Self>>;
}

/// Whether a sequence came from an indexed collection or a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    Indexed,
    Set,
}

// =============================================================================
// Seq
// =============================================================================

/// A lazily evaluated sequence.
pub struct Seq<T> {
    node: Node<T>,
    kind: SeqKind,
}

impl<T> Clone for Seq<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
            kind: self.kind,
        }
    }
}

impl<T: Clone + 'static> Seq<T> {
    pub(crate) fn from_node<N: SeqNode<T> + 'static>(node: N, kind: SeqKind) -> Self {
        Self {
            node: Rc::new(node),
            kind,
        }
    }

    fn stage<U: 'static, N: SeqNode<U> + 'static>(&self, node: N) -> Seq<U> {
        Seq {
            node: Rc::new(node),
            kind: self.kind,
        }
    }

    fn indexed_stage<U: 'static, N: SeqNode<U> + 'static>(node: N) -> Seq<U> {
        Seq {
            node: Rc::new(node),
            kind: SeqKind::Indexed,
        }
    }

    /// An empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Where the items came from.
    pub const fn kind(&self) -> SeqKind {
        self.kind
    }

    /// Number of items, when known without iterating.
    pub fn size(&self) -> Option<usize> {
        self.node.size()
    }

    /// Returns `false` for sequences over a single-pass source.
    pub fn is_restartable(&self) -> bool {
        self.node.restartable()
    }

    /// Iterates the items.
    pub fn iter(&self) -> SeqIter<T> {
        SeqIter {
            items: Rc::clone(&self.node).iterate(),
        }
    }

    fn iter_reversed(&self) -> Items<T> {
        Rc::clone(&self.node).iterate_reversed()
    }

    // =========================================================================
    // Stages
    // =========================================================================

    pub fn map<U, F>(&self, function: F) -> Seq<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        self.stage(MapStage {
            source: Rc::clone(&self.node),
            function: Rc::new(function),
        })
    }

    /// Maps every item together with its position.
    pub fn map_indexed<U, F>(&self, function: F) -> Seq<U>
    where
        U: Clone + 'static,
        F: Fn(usize, T) -> U + 'static,
    {
        Self::indexed_stage(MapIndexedStage {
            source: Rc::clone(&self.node),
            function: Rc::new(function),
        })
    }

    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.stage(FilterStage {
            source: Rc::clone(&self.node),
            predicate: Rc::new(predicate),
        })
    }

    /// Keeps the items `predicate` rejects.
    #[must_use]
    pub fn filter_not<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter(move |item| !predicate(item))
    }

    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        self.stage(TakeStage {
            source: Rc::clone(&self.node),
            count,
        })
    }

    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        self.stage(SkipStage {
            source: Rc::clone(&self.node),
            count,
        })
    }

    #[must_use]
    pub fn take_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.stage(TakeWhileStage {
            source: Rc::clone(&self.node),
            predicate: Rc::new(predicate),
        })
    }

    #[must_use]
    pub fn skip_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.stage(SkipWhileStage {
            source: Rc::clone(&self.node),
            predicate: Rc::new(predicate),
        })
    }

    /// Items before the first one accepted by `predicate`.
    #[must_use]
    pub fn take_until<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.take_while(move |item| !predicate(item))
    }

    /// Items from the first one accepted by `predicate` on.
    #[must_use]
    pub fn skip_until<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.skip_while(move |item| !predicate(item))
    }

    /// The last `count` items. Realizes the upstream when its size is
    /// unknown.
    #[must_use]
    pub fn take_last(&self, count: usize) -> Self {
        self.stage(TakeLastStage {
            source: Rc::clone(&self.node),
            count,
        })
    }

    /// Everything but the last `count` items.
    #[must_use]
    pub fn skip_last(&self, count: usize) -> Self {
        self.stage(SkipLastStage {
            source: Rc::clone(&self.node),
            count,
        })
    }

    /// Everything but the first item.
    #[must_use]
    pub fn rest(&self) -> Self {
        self.skip(1)
    }

    /// Everything but the last item.
    #[must_use]
    pub fn but_last(&self) -> Self {
        self.skip_last(1)
    }

    /// Items in `[begin, end)`. Negative bounds count from the end.
    #[must_use]
    pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        self.stage(SliceStage {
            source: Rc::clone(&self.node),
            begin,
            end,
        })
    }

    /// Pairs items positionally, stopping at the shorter input.
    pub fn zip<U: Clone + 'static>(&self, other: &Seq<U>) -> Seq<(T, U)> {
        Self::indexed_stage(ZipStage {
            left: Rc::clone(&self.node),
            right: Rc::clone(&other.node),
        })
    }

    pub fn zip_with<U, R, F>(&self, other: &Seq<U>, function: F) -> Seq<R>
    where
        U: Clone + 'static,
        R: Clone + 'static,
        F: Fn(T, U) -> R + 'static,
    {
        self.zip(other).map(move |(left, right)| function(left, right))
    }

    /// Flattens one level of iterable items.
    pub fn flatten<U>(&self) -> Seq<U>
    where
        T: IntoIterator<Item = U>,
        T::IntoIter: 'static,
        U: Clone + 'static,
    {
        Self::indexed_stage(FlattenStage {
            source: Rc::clone(&self.node),
        })
    }

    /// Flattens nested items up to `depth` levels, or fully with `None`.
    #[must_use]
    pub fn flatten_depth(&self, depth: Option<usize>) -> Self
    where
        T: Nested,
    {
        Self::indexed_stage(DeepFlattenStage {
            source: Rc::clone(&self.node),
            depth,
        })
    }

    pub fn flat_map<U, I, F>(&self, function: F) -> Seq<U>
    where
        U: Clone + 'static,
        I: IntoIterator<Item = U> + Clone + 'static,
        I::IntoIter: 'static,
        F: Fn(T) -> I + 'static,
    {
        self.map(function).flatten()
    }

    /// Items of `self` followed by the items of each of `others`.
    #[must_use]
    pub fn concat(&self, others: &[Self]) -> Self {
        let parts = std::iter::once(self)
            .chain(others)
            .map(|seq| Rc::clone(&seq.node))
            .collect();
        self.stage(ConcatStage { parts })
    }

    /// Places `separator` between neighbouring items.
    #[must_use]
    pub fn interpose(&self, separator: T) -> Self {
        Self::indexed_stage(InterposeStage {
            source: Rc::clone(&self.node),
            separator,
        })
    }

    /// Alternates items from `self` and `others`, stopping as soon as any
    /// input runs out.
    #[must_use]
    pub fn interleave(&self, others: &[Self]) -> Self {
        let parts = std::iter::once(self)
            .chain(others)
            .map(|seq| Rc::clone(&seq.node))
            .collect();
        Self::indexed_stage(InterleaveStage { parts })
    }

    #[must_use]
    pub fn reverse(&self) -> Self {
        self.stage(ReverseStage {
            source: Rc::clone(&self.node),
        })
    }

    /// Stable sort; realizes the upstream when iterated.
    #[must_use]
    pub fn sort(&self) -> Self
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    #[must_use]
    pub fn sort_by<F>(&self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.stage(SortStage {
            source: Rc::clone(&self.node),
            compare: Rc::new(compare),
        })
    }

    #[must_use]
    pub fn sort_by_key<K, F>(&self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        self.sort_by(move |left, right| key(left).cmp(&key(right)))
    }

    /// Sorts eagerly with a fallible comparator.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `compare`.
    pub fn try_sort_by<E, F>(&self, mut compare: F) -> Result<Self, E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        let mut items = self.to_vec();
        let mut failure = None;
        items.sort_by(|left, right| match compare(left, right) {
            Ok(ordering) => ordering,
            Err(error) => {
                failure.get_or_insert(error);
                Ordering::Equal
            }
        });
        match failure {
            Some(error) => Err(error),
            None => Ok(Self::from_node(
                SliceSource {
                    items: items.into(),
                },
                self.kind,
            )),
        }
    }

    /// Realizes the sequence once into a buffer owned by the returned
    /// sequence, which is indexed and restartable.
    #[must_use]
    pub fn cache_result(&self) -> Self {
        let items: Rc<[T]> = self.iter().collect();
        trace!(count = items.len(), "cached sequence result");
        Self::from_node(SliceSource { items }, self.kind)
    }

    // =========================================================================
    // Terminal Operations
    // =========================================================================

    /// Calls `function` on each item until it returns `false`. Returns the
    /// number of items visited.
    pub fn for_each<F>(&self, mut function: F) -> usize
    where
        F: FnMut(T) -> bool,
    {
        let mut visited = 0;
        for item in self.iter() {
            visited += 1;
            if !function(item) {
                break;
            }
        }
        visited
    }

    /// Calls `function` on each item, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `function`.
    pub fn try_for_each<E, F>(&self, function: F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<(), E>,
    {
        self.iter().try_for_each(function)
    }

    pub fn reduce<A, F>(&self, initial: A, function: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        self.iter().fold(initial, function)
    }

    /// Folds from the last item to the first.
    pub fn reduce_right<A, F>(&self, initial: A, function: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        self.iter_reversed().fold(initial, function)
    }

    /// # Errors
    ///
    /// Returns the first error produced by `function`.
    pub fn try_reduce<A, E, F>(&self, initial: A, function: F) -> Result<A, E>
    where
        F: FnMut(A, T) -> Result<A, E>,
    {
        self.iter().try_fold(initial, function)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    #[must_use]
    pub fn to_list(&self) -> List<T> {
        self.iter().collect()
    }

    /// The items as a stack, first item on top.
    #[must_use]
    pub fn to_stack(&self) -> Stack<T> {
        self.iter().collect()
    }

    pub fn to_set(&self) -> Set<T>
    where
        T: Hash + Eq,
    {
        self.iter().collect()
    }

    pub fn to_ordered_set(&self) -> OrderedSet<T>
    where
        T: Hash + Eq,
    {
        self.iter().collect()
    }

    /// Number of items; walks the sequence when the size is unknown.
    pub fn count(&self) -> usize {
        self.size().unwrap_or_else(|| self.iter().count())
    }

    /// Number of items accepted by `predicate`.
    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().filter(|item| predicate(item)).count()
    }

    pub fn is_empty(&self) -> bool {
        match self.size() {
            Some(size) => size == 0,
            None => self.iter().next().is_none(),
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        Rc::clone(&self.node).get(index)
    }

    pub fn first(&self) -> Option<T> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<T> {
        self.iter_reversed().next()
    }

    pub fn find<F>(&self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().find(|item| predicate(item))
    }

    pub fn find_last<F>(&self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter_reversed().find(|item| predicate(item))
    }

    pub fn find_index<F>(&self, mut predicate: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(|item| predicate(&item))
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|item| item == *value)
    }

    pub fn includes(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == *value)
    }

    /// `true` if every item satisfies `predicate`.
    pub fn every<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().all(|item| predicate(&item))
    }

    /// `true` if some item satisfies `predicate`.
    pub fn some<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().any(|item| predicate(&item))
    }

    /// The greatest item; the first one wins ties.
    pub fn max(&self) -> Option<T>
    where
        T: Ord,
    {
        self.max_by(T::cmp)
    }

    /// The least item; the first one wins ties.
    pub fn min(&self) -> Option<T>
    where
        T: Ord,
    {
        self.min_by(T::cmp)
    }

    pub fn max_by<F>(&self, mut compare: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.iter().reduce(|best, item| {
            if compare(&item, &best) == Ordering::Greater {
                item
            } else {
                best
            }
        })
    }

    pub fn min_by<F>(&self, mut compare: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.iter().reduce(|best, item| {
            if compare(&item, &best) == Ordering::Less {
                item
            } else {
                best
            }
        })
    }

    /// Joins the items' `Display` output with `separator`.
    pub fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        let mut output = String::new();
        for (index, item) in self.iter().enumerate() {
            if index > 0 {
                output.push_str(separator);
            }
            output.push_str(&item.to_string());
        }
        output
    }

    /// Groups items by `grouper`. Groups appear in the order their first
    /// member was seen; members keep their relative order.
    pub fn group_by<G, F>(&self, grouper: F) -> OrderedMap<G, List<T>>
    where
        G: Clone + Hash + Eq,
        F: FnMut(&T) -> G,
    {
        group_items(self.iter(), grouper)
            .into_iter()
            .map(|(group, members)| (group, List::from(members)))
            .collect()
    }

    /// Counts items per group.
    pub fn count_by<G, F>(&self, mut grouper: F) -> Map<G, usize>
    where
        G: Clone + Hash + Eq,
        F: FnMut(&T) -> G,
    {
        Map::new().with_mutations(|counts| {
            for item in self.iter() {
                counts.update(grouper(&item), 0, |count| count + 1);
            }
        })
    }

    /// Value equality. Two set-kind sequences compare by membership; any
    /// other pair compares positionally.
    pub fn equals(&self, other: &Self) -> bool
    where
        T: Hash + Eq,
    {
        if Rc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        if let (Some(left), Some(right)) = (self.size(), other.size()) {
            if left != right {
                return false;
            }
        }
        if self.kind == SeqKind::Set && other.kind == SeqKind::Set {
            self.to_set() == other.to_set()
        } else {
            self.iter().eq(other.iter())
        }
    }
}

/// Buckets items by key, keeping first-seen group order.
pub(crate) fn group_items<T, G, I, F>(items: I, mut grouper: F) -> Vec<(G, Vec<T>)>
where
    G: Clone + Hash + Eq,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> G,
{
    let mut positions: Map<G, usize> = Map::new();
    let mut groups: Vec<(G, Vec<T>)> = Vec::new();
    for item in items {
        let group = grouper(&item);
        if let Some(&position) = positions.get(&group) {
            groups[position].1.push(item);
        } else {
            positions = positions.insert(group.clone(), groups.len());
            groups.push((group, vec![item]));
        }
    }
    groups
}

// =============================================================================
// Iteration
// =============================================================================

/// Owning iterator over a [`Seq`].
pub struct SeqIter<T> {
    items: Items<T>,
}

impl<T> Iterator for SeqIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T: Clone + 'static> IntoIterator for Seq<T> {
    type Item = T;
    type IntoIter = SeqIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + 'static> IntoIterator for &Seq<T> {
    type Item = T;
    type IntoIter = SeqIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + 'static> Default for Seq<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + 'static> fmt::Debug for Seq<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Seq")
            .field("kind", &self.kind)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    #[rstest]
    fn test_stages_are_lazy_until_consumed() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let seq = Seq::of([1, 2, 3, 4]).map(move |x| {
            counter.set(counter.get() + 1);
            x * 10
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(seq.first(), Some(10));
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    fn test_size_propagation() {
        let seq = Seq::of([1, 2, 3, 4, 5]);
        assert_eq!(seq.map(|x| x + 1).size(), Some(5));
        assert_eq!(seq.take(2).size(), Some(2));
        assert_eq!(seq.skip(7).size(), Some(0));
        assert_eq!(seq.filter(|x| *x > 2).size(), None);
        assert_eq!(seq.interpose(0).size(), Some(9));
        assert_eq!(seq.concat(&[seq.clone()]).size(), Some(10));
        assert_eq!(seq.filter(|x| *x > 2).count(), 3);
    }

    #[rstest]
    fn test_take_last_and_skip_last_without_size() {
        let seq = Seq::of(1..=6).filter(|x| x % 2 == 1);
        assert_eq!(seq.take_last(2).to_vec(), vec![3, 5]);
        assert_eq!(seq.skip_last(1).to_vec(), vec![1, 3]);
        assert_eq!(seq.but_last().rest().to_vec(), vec![3]);
    }

    #[rstest]
    #[case(1, Some(3), vec![2, 3])]
    #[case(-2, None, vec![4, 5])]
    #[case(0, Some(-3), vec![1, 2])]
    #[case(4, Some(2), vec![])]
    fn test_slice(#[case] begin: isize, #[case] end: Option<isize>, #[case] expected: Vec<i32>) {
        let sized = Seq::of([1, 2, 3, 4, 5]);
        let unsized_seq = sized.filter(|_| true);
        assert_eq!(sized.slice(begin, end).to_vec(), expected);
        assert_eq!(unsized_seq.slice(begin, end).to_vec(), expected);
    }

    #[rstest]
    fn test_interleave_stops_at_shortest() {
        let letters = Seq::of(['a', 'b', 'c']);
        let others = Seq::of(['x', 'y']);
        assert_eq!(letters.interleave(&[others]).to_vec(), vec!['a', 'x', 'b', 'y']);
    }

    #[rstest]
    fn test_reverse_uses_random_access() {
        let seq = Seq::of([1, 2, 3]).reverse();
        assert_eq!(seq.get(0), Some(3));
        assert_eq!(seq.last(), Some(1));
        assert_eq!(seq.reverse().to_vec(), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_reverse_realizes_stages_without_random_access() {
        let odd = Seq::of(1..=6).filter(|x| x % 2 == 1);
        assert_eq!(odd.reverse().to_vec(), vec![5, 3, 1]);
        assert_eq!(odd.last(), Some(5));
        assert_eq!(Seq::once(vec!['a', 'b']).last(), Some('b'));
        assert_eq!(Seq::from(Stack::from([1, 2, 3])).reverse().to_vec(), vec![3, 2, 1]);
    }

    #[rstest]
    fn test_sort_is_stable() {
        let words = Seq::of(["bb", "a", "cc", "d"]).sort_by_key(|word| word.len());
        assert_eq!(words.to_vec(), vec!["a", "d", "bb", "cc"]);
    }

    #[rstest]
    fn test_try_sort_by_propagates_error() {
        let result = Seq::of([3, 1, 2]).try_sort_by(|left, right| {
            if *left == 2 || *right == 2 {
                Err("two")
            } else {
                Ok(left.cmp(right))
            }
        });
        assert_eq!(result.map(|seq| seq.to_vec()), Err("two"));
    }

    #[rstest]
    fn test_for_each_stops_early() {
        let mut seen = Vec::new();
        let visited = Seq::of([1, 2, 3, 4]).for_each(|x| {
            seen.push(x);
            x < 2
        });
        assert_eq!(visited, 2);
        assert_eq!(seen, vec![1, 2]);
    }

    #[rstest]
    fn test_max_prefers_first_of_ties() {
        let pairs = Seq::of([(1, 'a'), (3, 'b'), (3, 'c')]);
        assert_eq!(pairs.max_by(|l, r| l.0.cmp(&r.0)), Some((3, 'b')));
        assert_eq!(pairs.min_by(|l, r| l.0.cmp(&r.0)), Some((1, 'a')));
    }

    #[rstest]
    fn test_group_by_keeps_first_seen_order() {
        let groups = Seq::of([1, 2, 3, 4, 5, 6]).group_by(|x| x % 3);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 0]);
        assert_eq!(groups.get(&0).map(List::to_vec), Some(vec![3, 6]));
    }

    #[rstest]
    fn test_cache_result_makes_once_restartable() {
        let cached = Seq::once(vec![1, 2]).cache_result();
        assert!(cached.is_restartable());
        assert_eq!(cached.to_vec(), vec![1, 2]);
        assert_eq!(cached.to_vec(), vec![1, 2]);
    }

    #[rstest]
    fn test_equals_by_kind() {
        let left = Seq::from(Set::from([1, 2, 3]));
        let right = Seq::from(Set::from([3, 2, 1]));
        assert!(left.equals(&right));
        assert!(!Seq::of([1, 2]).equals(&Seq::of([2, 1])));
    }

    #[rstest]
    fn test_join() {
        assert_eq!(Seq::of([1, 2, 3]).join(", "), "1, 2, 3");
    }
}
