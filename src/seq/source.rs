//! Sequence sources: collections, buffers, one-shot iterators and
//! generators.

use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use super::{Items, Seq, SeqKind, SeqNode};
use crate::persistent::{List, OrderedSet, Set, Stack};

// =============================================================================
// Buffered Sources
// =============================================================================

/// A realized buffer, shared by every clone of the sequence.
pub(crate) struct SliceSource<T> {
    pub(crate) items: Rc<[T]>,
}

impl<T: Clone + 'static> SeqNode<T> for SliceSource<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let items = Rc::clone(&self.items);
        Box::new((0..items.len()).map(move |index| items[index].clone()))
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        let items = Rc::clone(&self.items);
        Box::new((0..items.len()).rev().map(move |index| items[index].clone()))
    }

    fn size(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        self.items.get(index).cloned()
    }
}

pub(crate) struct ListSource<T> {
    pub(crate) list: List<T>,
}

impl<T: Clone + 'static> SeqNode<T> for ListSource<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(self.list.clone().into_iter())
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        Box::new(self.list.clone().into_iter().rev())
    }

    fn size(&self) -> Option<usize> {
        Some(self.list.len())
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        self.list.get(index).cloned()
    }
}

/// Any persistent collection whose owned iterator yields the items.
pub(crate) struct CollectionSource<C> {
    pub(crate) collection: C,
    pub(crate) size: usize,
}

impl<C, T> SeqNode<T> for CollectionSource<C>
where
    C: Clone + IntoIterator<Item = T> + 'static,
    C::IntoIter: 'static,
    T: 'static,
{
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(self.collection.clone().into_iter())
    }

    fn size(&self) -> Option<usize> {
        Some(self.size)
    }
}

/// Wraps a single-pass iterator. The first iteration drains it; later
/// iterations are empty.
pub(crate) struct OnceSource<T> {
    items: Cell<Option<Items<T>>>,
}

impl<T: 'static> SeqNode<T> for OnceSource<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        self.items.take().unwrap_or_else(|| {
            debug!("one-shot sequence source read again after it was drained");
            Box::new(std::iter::empty())
        })
    }

    fn restartable(&self) -> bool {
        false
    }
}

// =============================================================================
// Generators
// =============================================================================

/// The step is widened so that a magnitude of `2^63` stays exact.
pub(crate) struct RangeSource {
    start: i64,
    step: i128,
    size: Option<usize>,
}

impl RangeSource {
    #[allow(clippy::cast_possible_truncation)]
    const fn value_at(&self, index: usize) -> i64 {
        (self.start as i128 + self.step * index as i128) as i64
    }
}

impl SeqNode<i64> for RangeSource {
    fn iterate(self: Rc<Self>) -> Items<i64> {
        let size = self.size;
        match size {
            Some(size) => Box::new((0..size).map(move |index| self.value_at(index))),
            None => {
                let step = self.step;
                Box::new(std::iter::successors(Some(self.start), move |value| {
                    i64::try_from(i128::from(*value) + step).ok()
                }))
            }
        }
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<i64> {
        let size = self.size;
        match size {
            Some(size) => Box::new((0..size).rev().map(move |index| self.value_at(index))),
            None => unbounded_reversed(),
        }
    }

    fn size(&self) -> Option<usize> {
        self.size
    }

    fn get(self: Rc<Self>, index: usize) -> Option<i64> {
        match self.size {
            Some(size) if index >= size => None,
            _ => Some(self.value_at(index)),
        }
    }
}

pub(crate) struct RepeatSource<T> {
    value: T,
    times: Option<usize>,
}

impl<T: Clone + 'static> SeqNode<T> for RepeatSource<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let items = std::iter::repeat(self.value.clone());
        match self.times {
            Some(times) => Box::new(items.take(times)),
            None => Box::new(items),
        }
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        match self.times {
            Some(_) => self.iterate(),
            None => unbounded_reversed(),
        }
    }

    fn size(&self) -> Option<usize> {
        self.times
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        match self.times {
            Some(times) if index >= times => None,
            _ => Some(self.value.clone()),
        }
    }
}

/// An endless generator has no back end to start from, so reading one
/// backwards yields nothing.
fn unbounded_reversed<T: 'static>() -> Items<T> {
    debug!("reversed read of an unbounded sequence yields nothing");
    Box::new(std::iter::empty())
}

/// Integers from `start` towards `end` (exclusive), counting down when
/// `end < start`.
///
/// # Examples
///
/// ```rust
/// use immutables::range;
///
/// let squares = range(0, 5).map(|x| x * x).to_vec();
/// assert_eq!(squares, vec![0, 1, 4, 9, 16]);
/// assert_eq!(range(3, 0).to_vec(), vec![3, 2, 1]);
/// ```
#[must_use]
pub fn range(start: i64, end: i64) -> Seq<i64> {
    range_by(start, end, 1)
}

/// Integers from `start` towards `end` (exclusive) in increments of
/// `|step|`. The direction follows `start` and `end`; a zero step is
/// treated as one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn range_by(start: i64, end: i64, step: i64) -> Seq<i64> {
    let magnitude = i128::from(step.unsigned_abs().max(1));
    let distance = (i128::from(end) - i128::from(start)).abs();
    let size = ((distance + magnitude - 1) / magnitude) as usize;
    let step = if end < start { -magnitude } else { magnitude };
    Seq::from_node(
        RangeSource {
            start,
            step,
            size: Some(size),
        },
        SeqKind::Indexed,
    )
}

/// Unbounded integers counting up from `start`, ending at `i64::MAX`.
///
/// The sequence has no known size, so reading it backwards (`reverse`,
/// `last`, `find_last`) yields nothing, the same as [`repeat`].
///
/// ```rust
/// use immutables::range_from;
///
/// assert_eq!(range_from(7).take(2).to_vec(), vec![7, 8]);
/// assert_eq!(range_from(7).last(), None);
/// ```
#[must_use]
pub fn range_from(start: i64) -> Seq<i64> {
    Seq::from_node(
        RangeSource {
            start,
            step: 1,
            size: None,
        },
        SeqKind::Indexed,
    )
}

/// `value` repeated without end. Like [`range_from`], it reads as empty
/// backwards.
///
/// ```rust
/// use immutables::repeat;
///
/// let first = repeat("x").map(|x| x.len()).take(3).to_vec();
/// assert_eq!(first, vec![1, 1, 1]);
/// ```
pub fn repeat<T: Clone + 'static>(value: T) -> Seq<T> {
    Seq::from_node(RepeatSource { value, times: None }, SeqKind::Indexed)
}

/// `value` repeated `times` times.
pub fn repeat_n<T: Clone + 'static>(value: T, times: usize) -> Seq<T> {
    Seq::from_node(
        RepeatSource {
            value,
            times: Some(times),
        },
        SeqKind::Indexed,
    )
}

// =============================================================================
// Conversions
// =============================================================================

impl<T: Clone + 'static> Seq<T> {
    /// A sequence over the given values.
    pub fn of<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }

    /// A sequence over a vector's values.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_node(
            SliceSource {
                items: values.into(),
            },
            SeqKind::Indexed,
        )
    }

    /// A sequence over a single-pass iterator. It can be read once; call
    /// [`cache_result`](Self::cache_result) to read it repeatedly.
    pub fn once<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_node(
            OnceSource {
                items: Cell::new(Some(Box::new(values.into_iter()))),
            },
            SeqKind::Indexed,
        )
    }

    pub(crate) fn from_collection<C>(collection: C, size: usize, kind: SeqKind) -> Self
    where
        C: Clone + IntoIterator<Item = T> + 'static,
        C::IntoIter: 'static,
    {
        Self::from_node(CollectionSource { collection, size }, kind)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Seq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Seq<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Clone + 'static> From<List<T>> for Seq<T> {
    fn from(list: List<T>) -> Self {
        Self::from_node(ListSource { list }, SeqKind::Indexed)
    }
}

impl<T: Clone + 'static> From<Stack<T>> for Seq<T> {
    fn from(stack: Stack<T>) -> Self {
        let size = stack.len();
        Self::from_collection(stack, size, SeqKind::Indexed)
    }
}

impl<T: Clone + Hash + Eq + 'static> From<Set<T>> for Seq<T> {
    fn from(set: Set<T>) -> Self {
        let size = set.len();
        Self::from_collection(set, size, SeqKind::Set)
    }
}

impl<T: Clone + Hash + Eq + 'static> From<OrderedSet<T>> for Seq<T> {
    fn from(set: OrderedSet<T>) -> Self {
        let size = set.len();
        Self::from_collection(set, size, SeqKind::Set)
    }
}
