//! Pipeline stages.
//!
//! Each stage wraps the node it was composed on and does no work until a
//! terminal operation asks for an iterator.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{Items, Nested, Node, SeqNode};
use crate::persistent::list::resolve_slice;

pub(crate) type Mapper<S, T> = Rc<dyn Fn(S) -> T>;
pub(crate) type Predicate<T> = Rc<dyn Fn(&T) -> bool>;
pub(crate) type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

// =============================================================================
// Element-wise Stages
// =============================================================================

pub(crate) struct MapStage<S, T> {
    pub(crate) source: Node<S>,
    pub(crate) function: Mapper<S, T>,
}

impl<S: 'static, T: 'static> SeqNode<T> for MapStage<S, T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let function = Rc::clone(&self.function);
        Box::new(Rc::clone(&self.source).iterate().map(move |item| function(item)))
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        let function = Rc::clone(&self.function);
        Box::new(
            Rc::clone(&self.source)
                .iterate_reversed()
                .map(move |item| function(item)),
        )
    }

    fn size(&self) -> Option<usize> {
        self.source.size()
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        Rc::clone(&self.source)
            .get(index)
            .map(|item| (self.function)(item))
    }
}

pub(crate) struct MapIndexedStage<S, T> {
    pub(crate) source: Node<S>,
    pub(crate) function: Rc<dyn Fn(usize, S) -> T>,
}

impl<S: 'static, T: 'static> SeqNode<T> for MapIndexedStage<S, T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let function = Rc::clone(&self.function);
        Box::new(
            Rc::clone(&self.source)
                .iterate()
                .enumerate()
                .map(move |(index, item)| function(index, item)),
        )
    }

    fn size(&self) -> Option<usize> {
        self.source.size()
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        Rc::clone(&self.source)
            .get(index)
            .map(|item| (self.function)(index, item))
    }
}

pub(crate) struct FilterStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) predicate: Predicate<T>,
}

impl<T: 'static> SeqNode<T> for FilterStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let predicate = Rc::clone(&self.predicate);
        Box::new(
            Rc::clone(&self.source)
                .iterate()
                .filter(move |item| predicate(item)),
        )
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        let predicate = Rc::clone(&self.predicate);
        Box::new(
            Rc::clone(&self.source)
                .iterate_reversed()
                .filter(move |item| predicate(item)),
        )
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

// =============================================================================
// Windowing Stages
// =============================================================================

pub(crate) struct TakeStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) count: usize,
}

impl<T: 'static> SeqNode<T> for TakeStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(Rc::clone(&self.source).iterate().take(self.count))
    }

    fn size(&self) -> Option<usize> {
        self.source.size().map(|size| size.min(self.count))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        if index < self.count {
            Rc::clone(&self.source).get(index)
        } else {
            None
        }
    }
}

pub(crate) struct SkipStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) count: usize,
}

impl<T: 'static> SeqNode<T> for SkipStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(Rc::clone(&self.source).iterate().skip(self.count))
    }

    fn size(&self) -> Option<usize> {
        self.source
            .size()
            .map(|size| size.saturating_sub(self.count))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        Rc::clone(&self.source).get(index.checked_add(self.count)?)
    }
}

pub(crate) struct TakeWhileStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) predicate: Predicate<T>,
}

impl<T: 'static> SeqNode<T> for TakeWhileStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let predicate = Rc::clone(&self.predicate);
        Box::new(
            Rc::clone(&self.source)
                .iterate()
                .take_while(move |item| predicate(item)),
        )
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct SkipWhileStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) predicate: Predicate<T>,
}

impl<T: 'static> SeqNode<T> for SkipWhileStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let predicate = Rc::clone(&self.predicate);
        Box::new(
            Rc::clone(&self.source)
                .iterate()
                .skip_while(move |item| predicate(item)),
        )
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct TakeLastStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) count: usize,
}

impl<T: 'static> SeqNode<T> for TakeLastStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let count = self.count;
        let items = Rc::clone(&self.source).iterate();
        if let Some(size) = self.source.size() {
            return Box::new(items.skip(size.saturating_sub(count)));
        }
        let mut window = VecDeque::with_capacity(count.min(1024));
        for item in items {
            if count == 0 {
                break;
            }
            if window.len() == count {
                window.pop_front();
            }
            window.push_back(item);
        }
        Box::new(window.into_iter())
    }

    fn size(&self) -> Option<usize> {
        self.source.size().map(|size| size.min(self.count))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct SkipLastStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) count: usize,
}

impl<T: 'static> SeqNode<T> for SkipLastStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let count = self.count;
        let mut items = Rc::clone(&self.source).iterate();
        let mut lag = VecDeque::with_capacity(count.min(1024) + 1);
        Box::new(std::iter::from_fn(move || {
            while lag.len() <= count {
                lag.push_back(items.next()?);
            }
            lag.pop_front()
        }))
    }

    fn size(&self) -> Option<usize> {
        self.source
            .size()
            .map(|size| size.saturating_sub(self.count))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct SliceStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) begin: isize,
    pub(crate) end: Option<isize>,
}

impl<T: 'static> SeqNode<T> for SliceStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let items = Rc::clone(&self.source).iterate();
        if let Some(size) = self.source.size() {
            let (begin, end) = resolve_slice(size, self.begin, self.end);
            return Box::new(items.skip(begin).take(end.saturating_sub(begin)));
        }
        if self.begin >= 0 && self.end.is_none_or(|end| end >= 0) {
            let begin = self.begin.unsigned_abs();
            let items = items.skip(begin);
            return match self.end {
                Some(end) => Box::new(items.take(end.unsigned_abs().saturating_sub(begin))),
                None => Box::new(items),
            };
        }
        let realized: Vec<T> = items.collect();
        let (begin, end) = resolve_slice(realized.len(), self.begin, self.end);
        Box::new(
            realized
                .into_iter()
                .skip(begin)
                .take(end.saturating_sub(begin)),
        )
    }

    fn size(&self) -> Option<usize> {
        let (begin, end) = resolve_slice(self.source.size()?, self.begin, self.end);
        Some(end.saturating_sub(begin))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

// =============================================================================
// Combining Stages
// =============================================================================

pub(crate) struct ZipStage<A, B> {
    pub(crate) left: Node<A>,
    pub(crate) right: Node<B>,
}

impl<A: 'static, B: 'static> SeqNode<(A, B)> for ZipStage<A, B> {
    fn iterate(self: Rc<Self>) -> Items<(A, B)> {
        Box::new(
            Rc::clone(&self.left)
                .iterate()
                .zip(Rc::clone(&self.right).iterate()),
        )
    }

    fn size(&self) -> Option<usize> {
        Some(self.left.size()?.min(self.right.size()?))
    }

    fn restartable(&self) -> bool {
        self.left.restartable() && self.right.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<(A, B)> {
        let left = Rc::clone(&self.left).get(index)?;
        let right = Rc::clone(&self.right).get(index)?;
        Some((left, right))
    }
}

pub(crate) struct ConcatStage<T> {
    pub(crate) parts: Vec<Node<T>>,
}

impl<T: 'static> SeqNode<T> for ConcatStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(self.parts.clone().into_iter().flat_map(|part| part.iterate()))
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        Box::new(
            self.parts
                .clone()
                .into_iter()
                .rev()
                .flat_map(|part| part.iterate_reversed()),
        )
    }

    fn size(&self) -> Option<usize> {
        self.parts
            .iter()
            .try_fold(0_usize, |total, part| total.checked_add(part.size()?))
    }

    fn restartable(&self) -> bool {
        self.parts.iter().all(|part| part.restartable())
    }
}

pub(crate) struct InterposeStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) separator: T,
}

struct Interpose<T> {
    items: Items<T>,
    separator: T,
    pending: Option<T>,
    started: bool,
}

impl<T: Clone> Iterator for Interpose<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        let item = self.items.next()?;
        if self.started {
            self.pending = Some(item);
            Some(self.separator.clone())
        } else {
            self.started = true;
            Some(item)
        }
    }
}

impl<T: Clone + 'static> SeqNode<T> for InterposeStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(Interpose {
            items: Rc::clone(&self.source).iterate(),
            separator: self.separator.clone(),
            pending: None,
            started: false,
        })
    }

    fn size(&self) -> Option<usize> {
        self.source
            .size()
            .map(|size| size.saturating_mul(2).saturating_sub(1))
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct InterleaveStage<T> {
    pub(crate) parts: Vec<Node<T>>,
}

/// Round-robin over several iterators. A round is only released once
/// every input produced an item, so the output stops at the shortest.
struct Interleave<T> {
    inputs: Vec<Items<T>>,
    round: VecDeque<T>,
    exhausted: bool,
}

impl<T> Iterator for Interleave<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.round.is_empty() && !self.exhausted {
            for input in &mut self.inputs {
                if let Some(item) = input.next() {
                    self.round.push_back(item);
                } else {
                    self.exhausted = true;
                    self.round.clear();
                    break;
                }
            }
        }
        self.round.pop_front()
    }
}

impl<T: 'static> SeqNode<T> for InterleaveStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(Interleave {
            inputs: self
                .parts
                .iter()
                .map(|part| Rc::clone(part).iterate())
                .collect(),
            round: VecDeque::with_capacity(self.parts.len()),
            exhausted: self.parts.is_empty(),
        })
    }

    fn size(&self) -> Option<usize> {
        let shortest = self
            .parts
            .iter()
            .map(|part| part.size())
            .try_fold(usize::MAX, |shortest, size| Some(shortest.min(size?)))?;
        if self.parts.is_empty() {
            Some(0)
        } else {
            Some(shortest.saturating_mul(self.parts.len()))
        }
    }

    fn restartable(&self) -> bool {
        self.parts.iter().all(|part| part.restartable())
    }
}

// =============================================================================
// Flattening Stages
// =============================================================================

pub(crate) struct FlattenStage<S> {
    pub(crate) source: Node<S>,
}

impl<S, T> SeqNode<T> for FlattenStage<S>
where
    S: IntoIterator<Item = T> + 'static,
    S::IntoIter: 'static,
    T: 'static,
{
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(Rc::clone(&self.source).iterate().flatten())
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

pub(crate) struct DeepFlattenStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) depth: Option<usize>,
}

struct DeepFlatten<T> {
    stack: Vec<(Items<T>, usize)>,
    limit: Option<usize>,
}

impl<T: Nested + 'static> Iterator for DeepFlatten<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let (items, depth) = self.stack.last_mut()?;
            let depth = *depth;
            let Some(item) = items.next() else {
                self.stack.pop();
                continue;
            };
            if self.limit.is_none_or(|limit| depth < limit) {
                if let Some(children) = item.children() {
                    self.stack.push((Box::new(children.into_iter()), depth + 1));
                    continue;
                }
            }
            return Some(item);
        }
    }
}

impl<T: Nested + 'static> SeqNode<T> for DeepFlattenStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Box::new(DeepFlatten {
            stack: vec![(Rc::clone(&self.source).iterate(), 0)],
            limit: self.depth,
        })
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}

// =============================================================================
// Reordering Stages
// =============================================================================

pub(crate) struct ReverseStage<T> {
    pub(crate) source: Node<T>,
}

impl<T: 'static> SeqNode<T> for ReverseStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        Rc::clone(&self.source).iterate_reversed()
    }

    fn iterate_reversed(self: Rc<Self>) -> Items<T> {
        Rc::clone(&self.source).iterate()
    }

    fn size(&self) -> Option<usize> {
        self.source.size()
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }

    fn get(self: Rc<Self>, index: usize) -> Option<T> {
        match self.source.size() {
            Some(size) => Rc::clone(&self.source).get(size.checked_sub(index + 1)?),
            None => self.iterate().nth(index),
        }
    }
}

pub(crate) struct SortStage<T> {
    pub(crate) source: Node<T>,
    pub(crate) compare: Comparator<T>,
}

impl<T: 'static> SeqNode<T> for SortStage<T> {
    fn iterate(self: Rc<Self>) -> Items<T> {
        let mut items: Vec<T> = Rc::clone(&self.source).iterate().collect();
        items.sort_by(|left, right| (self.compare)(left, right));
        Box::new(items.into_iter())
    }

    fn size(&self) -> Option<usize> {
        self.source.size()
    }

    fn restartable(&self) -> bool {
        self.source.restartable()
    }
}
