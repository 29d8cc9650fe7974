//! Persistent vector trie backing [`List`].
//!
//! The trie has a branching factor of 32 and stores the last (up to) 32
//! elements in a separate tail leaf so appends rarely touch the tree. A
//! list addresses its elements through an `origin`/`capacity` window over
//! the trie: element `i` lives at trie index `origin + i`. Front operations
//! move `origin`, growing the root to the left when it would go negative,
//! which keeps `unshift`/`shift` at O(log32 N) and lets `slice` share the
//! original trie.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use arrayvec::ArrayVec;
use static_assertions::assert_not_impl_any;
use tracing::trace;

use super::ReferenceCounter;
use super::hashing::{BITS_PER_LEVEL, BRANCHING_FACTOR, MASK};
use super::owner::{Edit, OwnerId, Owned, make_editable};
use crate::error::{CollectionError, Result};

// =============================================================================
// Node Definition
// =============================================================================

type Slots<X> = ArrayVec<Option<X>, BRANCHING_FACTOR>;

#[derive(Clone)]
enum Content<T> {
    Branch(Slots<ReferenceCounter<Node<T>>>),
    Leaf(Slots<T>),
}

/// A trie node. Slots outside a list's live window are `None`.
#[derive(Clone)]
struct Node<T> {
    owner: Edit,
    content: Content<T>,
}

impl<T: Clone> Owned for Node<T> {
    fn owner(&self) -> Edit {
        self.owner
    }

    fn set_owner(&mut self, owner: Edit) {
        self.owner = owner;
    }
}

impl<T> Node<T> {
    fn empty(level: usize, owner: Edit) -> Self {
        let content = if level == 0 {
            Content::Leaf(ArrayVec::new())
        } else {
            Content::Branch(ArrayVec::new())
        };
        Self { owner, content }
    }

    fn branch(children: Slots<ReferenceCounter<Self>>, owner: Edit) -> Self {
        Self {
            owner,
            content: Content::Branch(children),
        }
    }

    fn len(&self) -> usize {
        match &self.content {
            Content::Branch(slots) => slots.len(),
            Content::Leaf(slots) => slots.len(),
        }
    }

    fn child(&self, index: usize) -> Option<&ReferenceCounter<Self>> {
        match &self.content {
            Content::Branch(slots) => slots.get(index).and_then(Option::as_ref),
            Content::Leaf(_) => None,
        }
    }

    fn value(&self, index: usize) -> Option<&T> {
        match &self.content {
            Content::Leaf(slots) => slots.get(index).and_then(Option::as_ref),
            Content::Branch(_) => None,
        }
    }
}

/// Returns the slot at `index`, padding the array with empty slots.
fn slot_at<X>(slots: &mut Slots<X>, index: usize) -> &mut Option<X> {
    while slots.len() <= index {
        slots.push(None);
    }
    &mut slots[index]
}

/// Trie index of the first element held in the tail.
#[inline]
const fn tail_offset(capacity: usize) -> usize {
    if capacity < BRANCHING_FACTOR {
        0
    } else {
        ((capacity - 1) >> BITS_PER_LEVEL) << BITS_PER_LEVEL
    }
}

/// Walks from `root` at `level` down to the leaf holding trie index `index`.
fn descend<T>(
    root: Option<&ReferenceCounter<Node<T>>>,
    level: usize,
    index: usize,
) -> Option<&ReferenceCounter<Node<T>>> {
    if index >= 1 << (level + BITS_PER_LEVEL) {
        return None;
    }
    let mut node = root?;
    let mut level = level;
    while level > 0 {
        node = node.child((index >> level) & MASK)?;
        level -= BITS_PER_LEVEL;
    }
    Some(node)
}

fn write_value<T: Clone>(
    node: &mut ReferenceCounter<Node<T>>,
    edit: Edit,
    level: usize,
    index: usize,
    value: T,
) {
    let editable = make_editable(node, edit);
    match &mut editable.content {
        Content::Leaf(slots) => *slot_at(slots, index & MASK) = Some(value),
        Content::Branch(slots) => {
            let child = slot_at(slots, (index >> level) & MASK).get_or_insert_with(|| {
                ReferenceCounter::new(Node::empty(level - BITS_PER_LEVEL, edit))
            });
            write_value(child, edit, level - BITS_PER_LEVEL, index, value);
        }
    }
}

/// Hangs a full tail leaf into the tree at trie index `index`.
fn place_leaf<T: Clone>(
    node: &mut ReferenceCounter<Node<T>>,
    edit: Edit,
    level: usize,
    index: usize,
    leaf: ReferenceCounter<Node<T>>,
) {
    let editable = make_editable(node, edit);
    let Content::Branch(slots) = &mut editable.content else {
        return;
    };
    let slot = slot_at(slots, (index >> level) & MASK);
    if level == BITS_PER_LEVEL {
        *slot = Some(leaf);
        return;
    }
    let child = slot.get_or_insert_with(|| {
        ReferenceCounter::new(Node::empty(level - BITS_PER_LEVEL, edit))
    });
    place_leaf(child, edit, level - BITS_PER_LEVEL, index, leaf);
}

/// Clears every slot before trie index `index` in the subtree at `level`.
fn remove_before<T: Clone>(
    node: &mut ReferenceCounter<Node<T>>,
    edit: Edit,
    level: usize,
    index: usize,
) {
    let length = node.len();
    if index & ((1 << (level + BITS_PER_LEVEL)) - 1) == 0 || length == 0 {
        return;
    }
    let origin_index = (index >> level) & MASK;
    if origin_index >= length {
        *node = ReferenceCounter::new(Node::empty(level, edit));
        return;
    }
    if origin_index == 0 && node.child(0).is_none() {
        return;
    }
    let editable = make_editable(node, edit);
    match &mut editable.content {
        Content::Branch(slots) => {
            slots
                .iter_mut()
                .take(origin_index)
                .for_each(|slot| *slot = None);
            if let Some(Some(child)) = slots.get_mut(origin_index) {
                remove_before(child, edit, level - BITS_PER_LEVEL, index);
            }
        }
        Content::Leaf(slots) => slots
            .iter_mut()
            .take(origin_index)
            .for_each(|slot| *slot = None),
    }
}

/// Drops every slot at or after trie index `index` in the subtree at `level`.
fn remove_after<T: Clone>(
    node: &mut ReferenceCounter<Node<T>>,
    edit: Edit,
    level: usize,
    index: usize,
) {
    let length = node.len();
    let span = if level == 0 {
        BRANCHING_FACTOR
    } else {
        1 << (level + BITS_PER_LEVEL)
    };
    if index == span || length == 0 {
        return;
    }
    if index == 0 {
        *node = ReferenceCounter::new(Node::empty(level, edit));
        return;
    }
    let size_index = ((index - 1) >> level) & MASK;
    if size_index >= length || (level == 0 && size_index + 1 == length) {
        return;
    }
    let editable = make_editable(node, edit);
    match &mut editable.content {
        Content::Branch(slots) => {
            slots.truncate(size_index + 1);
            if let Some(Some(child)) = slots.get_mut(size_index) {
                remove_after(child, edit, level - BITS_PER_LEVEL, index);
            }
        }
        Content::Leaf(slots) => slots.truncate(size_index + 1),
    }
}

// =============================================================================
// List Definition
// =============================================================================

/// A persistent indexed sequence built on a 32-way vector trie.
///
/// # Time Complexity
///
/// | Operation          | Complexity                      |
/// |--------------------|---------------------------------|
/// | `get`              | O(log32 N)                      |
/// | `set` / `update`   | O(log32 N)                      |
/// | `push` / `pop`     | amortized O(1) / O(log32 N)     |
/// | `unshift`/`shift`  | O(log32 N)                      |
/// | `slice`            | O(log32 N), shares the trie     |
/// | `insert`/`remove`  | O(N), the suffix is rebuilt     |
///
/// Front operations are slower than back operations: only the back end has
/// a tail buffer.
///
/// # Examples
///
/// ```rust
/// use immutables::List;
///
/// let list = List::from([1, 2, 3]);
/// let updated = list.set(1, 99).unwrap();
/// assert_eq!(updated.to_vec(), vec![1, 99, 3]);
/// assert_eq!(list.to_vec(), vec![1, 2, 3]);
/// ```
pub struct List<T> {
    origin: usize,
    capacity: usize,
    /// Root level in bits; the root covers `1 << (shift + 5)` trie indices.
    shift: usize,
    root: Option<ReferenceCounter<Node<T>>>,
    tail: Option<ReferenceCounter<Node<T>>>,
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        Self {
            origin: self.origin,
            capacity: self.capacity,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> List<T> {
    /// Creates an empty list.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            origin: 0,
            capacity: 0,
            shift: BITS_PER_LEVEL,
            root: None,
            tail: None,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.capacity - self.origin
    }

    /// Returns `true` if the list holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.capacity == self.origin
    }

    fn node_for(&self, raw: usize) -> Option<&ReferenceCounter<Node<T>>> {
        if raw >= tail_offset(self.capacity) {
            self.tail.as_ref()
        } else {
            descend(self.root.as_ref(), self.shift, raw)
        }
    }

    /// Returns the element at `index`, or `None` when it is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutables::List;
    ///
    /// let list = List::from(["a", "b"]);
    /// assert_eq!(list.get(1), Some(&"b"));
    /// assert_eq!(list.get(2), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let raw = index + self.origin;
        self.node_for(raw)?.value(raw & MASK)
    }

    /// Returns the element at `index`, or `not_set` when it is out of range.
    #[must_use]
    pub fn get_or<'a>(&'a self, index: usize, not_set: &'a T) -> &'a T {
        self.get(index).unwrap_or(not_set)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index >= len()`.
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.get(index).ok_or(CollectionError::OutOfRange {
            index,
            size: self.len(),
        })
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns `true` if some element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|element| element == value)
    }

    /// Iterates the elements by reference, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: 0,
            back: self.len(),
            front_leaf: None,
            back_leaf: None,
        }
    }

    /// Returns `true` when both lists are views of the very same trie.
    pub(crate) fn shares_structure(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.capacity == other.capacity
            && self.shift == other.shift
            && same_node(self.root.as_ref(), other.root.as_ref())
            && same_node(self.tail.as_ref(), other.tail.as_ref())
    }
}

fn same_node<N>(left: Option<&ReferenceCounter<N>>, right: Option<&ReferenceCounter<N>>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
        _ => false,
    }
}

// =============================================================================
// Structural Core
// =============================================================================

impl<T: Clone> List<T> {
    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Moves the live window to `[begin, end)` measured in current logical
    /// indices. `begin` may be negative (room for unshift) and `end` may
    /// exceed the length (room for push); new slots are left empty.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn set_bounds(&mut self, edit: Edit, begin: isize, end: isize) {
        let mut old_origin = self.origin as isize;
        let mut old_capacity = self.capacity as isize;
        let mut new_origin = old_origin + begin;
        let mut new_capacity = old_origin + end;
        if new_origin == old_origin && new_capacity == old_capacity {
            return;
        }
        if new_origin >= new_capacity {
            self.reset();
            return;
        }

        let mut level = self.shift;
        let mut root = self.root.take();

        // Grow the root leftwards until the new origin is addressable.
        let mut offset_shift: isize = 0;
        while new_origin + offset_shift < 0 {
            let mut children = ArrayVec::new();
            if let Some(previous) = root.take().filter(|node| node.len() > 0) {
                children.push(None);
                children.push(Some(previous));
            }
            root = Some(ReferenceCounter::new(Node::branch(children, edit)));
            level += BITS_PER_LEVEL;
            offset_shift += 1 << level;
        }
        if offset_shift != 0 {
            new_origin += offset_shift;
            old_origin += offset_shift;
            new_capacity += offset_shift;
            old_capacity += offset_shift;
        }

        let old_tail_offset = tail_offset(old_capacity as usize);
        let new_tail_offset = tail_offset(new_capacity as usize);

        // Grow the root upwards until the new tail offset is addressable.
        while new_tail_offset >= 1 << (level + BITS_PER_LEVEL) {
            let mut children = ArrayVec::new();
            if let Some(previous) = root.take().filter(|node| node.len() > 0) {
                children.push(Some(previous));
            }
            root = Some(ReferenceCounter::new(Node::branch(children, edit)));
            level += BITS_PER_LEVEL;
        }

        let old_tail = self.tail.take();
        let mut new_tail = match new_tail_offset.cmp(&old_tail_offset) {
            Ordering::Less => descend(root.as_ref(), level, new_capacity as usize - 1).cloned(),
            Ordering::Greater => Some(ReferenceCounter::new(Node::empty(0, edit))),
            Ordering::Equal => old_tail.clone(),
        };

        if new_tail_offset > old_tail_offset && new_origin < old_capacity {
            if let Some(tail) = old_tail.filter(|node| node.len() > 0) {
                let target =
                    root.get_or_insert_with(|| ReferenceCounter::new(Node::empty(level, edit)));
                place_leaf(target, edit, level, old_tail_offset, tail);
            }
        }

        if new_capacity < old_capacity {
            if let Some(tail) = new_tail.as_mut() {
                remove_after(tail, edit, 0, new_capacity as usize);
            }
        }

        if new_origin as usize >= new_tail_offset {
            // Everything left lives in the tail.
            new_origin -= new_tail_offset as isize;
            new_capacity -= new_tail_offset as isize;
            level = BITS_PER_LEVEL;
            root = None;
            if let Some(tail) = new_tail.as_mut() {
                remove_before(tail, edit, 0, new_origin as usize);
            }
        } else if new_origin > old_origin || new_tail_offset < old_tail_offset {
            let origin = new_origin as usize;
            let mut offset = 0_usize;

            // Descend while the origin and the tail share one child.
            while level > BITS_PER_LEVEL {
                let Some(node) = root.clone() else {
                    break;
                };
                let begin_index = (origin >> level) & MASK;
                if begin_index != (new_tail_offset >> level) & MASK {
                    break;
                }
                offset += begin_index << level;
                level -= BITS_PER_LEVEL;
                root = node.child(begin_index).cloned();
            }

            if new_origin > old_origin {
                if let Some(node) = root.as_mut() {
                    remove_before(node, edit, level, origin - offset);
                }
            }
            if new_tail_offset < old_tail_offset {
                if let Some(node) = root.as_mut() {
                    remove_after(node, edit, level, new_tail_offset - offset);
                }
            }
            new_origin -= offset as isize;
            new_capacity -= offset as isize;
        }

        self.origin = new_origin as usize;
        self.capacity = new_capacity as usize;
        self.shift = level;
        self.root = root;
        self.tail = new_tail;
    }

    /// Stores `value` at logical `index`, which must be inside the window.
    pub(crate) fn write(&mut self, edit: Edit, index: usize, value: T) {
        let raw = index + self.origin;
        if raw >= tail_offset(self.capacity) {
            let tail = self
                .tail
                .get_or_insert_with(|| ReferenceCounter::new(Node::empty(0, edit)));
            write_value(tail, edit, 0, raw, value);
        } else {
            let shift = self.shift;
            let root = self
                .root
                .get_or_insert_with(|| ReferenceCounter::new(Node::empty(shift, edit)));
            write_value(root, edit, shift, raw, value);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn push_in(&mut self, edit: Edit, value: T) {
        let size = self.len();
        self.set_bounds(edit, 0, size as isize + 1);
        self.write(edit, size, value);
    }

    #[allow(clippy::cast_possible_wrap)]
    fn push_all_in<I: IntoIterator<Item = T>>(&mut self, edit: Edit, values: I) {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        let size = self.len();
        self.set_bounds(edit, 0, (size + values.len()) as isize);
        for (offset, value) in values.into_iter().enumerate() {
            self.write(edit, size + offset, value);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn pop_in(&mut self, edit: Edit) {
        if !self.is_empty() {
            self.set_bounds(edit, 0, self.len() as isize - 1);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn unshift_all_in(&mut self, edit: Edit, values: Vec<T>) {
        if values.is_empty() {
            return;
        }
        self.set_bounds(edit, -(values.len() as isize), self.len() as isize);
        for (index, value) in values.into_iter().enumerate() {
            self.write(edit, index, value);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn shift_in(&mut self, edit: Edit) {
        if !self.is_empty() {
            self.set_bounds(edit, 1, self.len() as isize);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn truncate_in(&mut self, edit: Edit, size: usize) {
        if size < self.len() {
            self.set_bounds(edit, 0, size as isize);
        }
    }

    pub(crate) fn set_in(&mut self, edit: Edit, index: usize, value: T) -> Result<()> {
        match index.cmp(&self.len()) {
            Ordering::Less => self.write(edit, index, value),
            Ordering::Equal => self.push_in(edit, value),
            Ordering::Greater => {
                return Err(CollectionError::OutOfRange {
                    index,
                    size: self.len(),
                });
            }
        }
        Ok(())
    }

    /// Replaces `remove_count` elements at `index` with `values`, rebuilding
    /// the suffix after `index`.
    fn splice_in<I: IntoIterator<Item = T>>(
        &mut self,
        edit: Edit,
        index: usize,
        remove_count: usize,
        values: I,
    ) {
        let index = index.min(self.len());
        let resume = index.saturating_add(remove_count).min(self.len());
        let suffix: Vec<T> = (resume..self.len())
            .filter_map(|position| self.get(position).cloned())
            .collect();
        self.truncate_in(edit, index);
        if index == 0 {
            self.reset();
        }
        self.push_all_in(edit, values);
        self.push_all_in(edit, suffix);
    }
}

// =============================================================================
// Persistent Operations
// =============================================================================

impl<T: Clone> List<T> {
    /// Creates a list holding a single element.
    #[must_use]
    pub fn singleton(value: T) -> Self {
        let mut list = Self::new();
        list.push_in(None, value);
        list
    }

    /// Returns a list with `value` stored at `index`.
    ///
    /// `index == len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index > len()`.
    pub fn set(&self, index: usize, value: T) -> Result<Self> {
        let mut list = self.clone();
        list.set_in(None, index, value)?;
        Ok(list)
    }

    /// Returns a list with the element at `index` replaced by
    /// `updater(&old)`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index >= len()`.
    pub fn update<F>(&self, index: usize, updater: F) -> Result<Self>
    where
        F: FnOnce(&T) -> T,
    {
        let value = updater(self.try_get(index)?);
        self.set(index, value)
    }

    /// Returns a list with `value` appended.
    #[must_use]
    pub fn push(&self, value: T) -> Self {
        let mut list = self.clone();
        list.push_in(None, value);
        list
    }

    /// Returns a list with every value of `values` appended in order.
    #[must_use]
    pub fn push_all<I: IntoIterator<Item = T>>(&self, values: I) -> Self {
        let mut list = self.clone();
        list.push_all_in(None, values);
        list
    }

    /// Returns the list without its last element. An empty list stays empty.
    #[must_use]
    pub fn pop(&self) -> Self {
        let mut list = self.clone();
        list.pop_in(None);
        list
    }

    /// Returns a list with `value` prepended.
    #[must_use]
    pub fn unshift(&self, value: T) -> Self {
        self.unshift_all([value])
    }

    /// Returns a list with `values` prepended, keeping their order.
    #[must_use]
    pub fn unshift_all<I: IntoIterator<Item = T>>(&self, values: I) -> Self {
        let mut list = self.clone();
        list.unshift_all_in(None, values.into_iter().collect());
        list
    }

    /// Returns the list without its first element. An empty list stays empty.
    #[must_use]
    pub fn shift(&self) -> Self {
        let mut list = self.clone();
        list.shift_in(None);
        list
    }

    /// Returns a list with `value` inserted before `index`.
    ///
    /// Runs in O(N): every element after `index` is rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index > len()`.
    pub fn insert(&self, index: usize, value: T) -> Result<Self> {
        if index > self.len() {
            return Err(CollectionError::OutOfRange {
                index,
                size: self.len(),
            });
        }
        if index == 0 {
            return Ok(self.unshift(value));
        }
        if index == self.len() {
            return Ok(self.push(value));
        }
        let mut list = self.clone();
        list.splice_in(None, index, 0, [value]);
        Ok(list)
    }

    /// Returns a list without the element at `index`.
    ///
    /// Runs in O(N) unless `index` is the first or last position.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index >= len()`.
    pub fn remove(&self, index: usize) -> Result<Self> {
        if index >= self.len() {
            return Err(CollectionError::OutOfRange {
                index,
                size: self.len(),
            });
        }
        if index == 0 {
            return Ok(self.shift());
        }
        if index + 1 == self.len() {
            return Ok(self.pop());
        }
        let mut list = self.clone();
        list.splice_in(None, index, 1, []);
        Ok(list)
    }

    /// Returns the elements in `[begin, end)`, sharing the trie with `self`.
    ///
    /// Negative bounds count from the end; out-of-range bounds are clamped.
    /// `None` as `end` means the end of the list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutables::List;
    ///
    /// let list: List<i32> = (0..10).collect();
    /// assert_eq!(list.slice(2, Some(5)).to_vec(), vec![2, 3, 4]);
    /// assert_eq!(list.slice(-3, None).to_vec(), vec![7, 8, 9]);
    /// assert_eq!(list.slice(8, Some(100)).to_vec(), vec![8, 9]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        let (begin, end) = resolve_slice(self.len(), begin, end);
        if begin >= end {
            return Self::new();
        }
        let mut list = self.clone();
        list.set_bounds(None, begin as isize, end as isize);
        list
    }

    /// Returns an empty list.
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Returns a list of exactly `size` elements, truncating or padding with
    /// clones of `fill`.
    #[must_use]
    pub fn resize(&self, size: usize, fill: T) -> Self {
        let mut list = self.clone();
        if size < list.len() {
            list.truncate_in(None, size);
        } else {
            let missing = size - list.len();
            list.push_all_in(None, std::iter::repeat_n(fill, missing));
        }
        list
    }

    /// Returns `self` followed by the elements of `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.push_all(other.iter().cloned())
    }

    /// Maps every element.
    pub fn map<U, F>(&self, function: F) -> List<U>
    where
        U: Clone,
        F: FnMut(&T) -> U,
    {
        self.iter().map(function).collect()
    }

    /// Maps every element to an iterable and concatenates the results.
    pub fn flat_map<U, I, F>(&self, function: F) -> List<U>
    where
        U: Clone,
        I: IntoIterator<Item = U>,
        F: FnMut(&T) -> I,
    {
        self.iter().flat_map(function).collect()
    }

    /// Pairs elements positionally, stopping at the shorter list.
    pub fn zip<U: Clone>(&self, other: &List<U>) -> List<(T, U)> {
        self.iter()
            .zip(other.iter())
            .map(|(left, right)| (left.clone(), right.clone()))
            .collect()
    }

    /// Combines elements positionally, stopping at the shorter list.
    pub fn zip_with<U, R, F>(&self, other: &List<U>, mut function: F) -> List<R>
    where
        R: Clone,
        F: FnMut(&T, &U) -> R,
    {
        self.iter()
            .zip(other.iter())
            .map(|(left, right)| function(left, right))
            .collect()
    }

    /// Collects the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    // =========================================================================
    // Transient Entry Points
    // =========================================================================

    /// Opens a transient view stamped with a fresh owner.
    #[must_use]
    pub fn as_mutable(&self) -> TransientList<T> {
        TransientList::new(self.clone())
    }

    /// Applies a batch of edits through a transient and freezes the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutables::List;
    ///
    /// let list = List::from([1]);
    /// let batched = list.with_mutations(|transient| {
    ///     transient.push(2).push(3).unshift(0);
    /// });
    /// assert_eq!(batched.to_vec(), vec![0, 1, 2, 3]);
    /// assert_eq!(list.to_vec(), vec![1]);
    /// ```
    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientList<T>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }

    /// Like [`with_mutations`](Self::with_mutations) for fallible batches.
    /// Nothing is published when the batch fails.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `mutation`.
    pub fn try_with_mutations<E, F>(&self, mutation: F) -> std::result::Result<Self, E>
    where
        F: FnOnce(&mut TransientList<T>) -> std::result::Result<(), E>,
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient)?;
        Ok(transient.as_immutable())
    }
}

/// Resolves possibly negative slice bounds against `size`.
pub(crate) fn resolve_slice(size: usize, begin: isize, end: Option<isize>) -> (usize, usize) {
    let resolve = |bound: isize| {
        if bound < 0 {
            size.saturating_sub(bound.unsigned_abs())
        } else {
            bound.unsigned_abs().min(size)
        }
    };
    (resolve(begin), end.map_or(size, resolve))
}

// =============================================================================
// TransientList
// =============================================================================

/// A mutable batch view over a [`List`].
///
/// Nodes created or copied by this batch are stamped with its owner id and
/// edited in place afterwards. The view is confined to one thread and
/// consumed by [`as_immutable`](Self::as_immutable).
pub struct TransientList<T> {
    list: List<T>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientList<i32>: Send, Sync);

impl<T: Clone> TransientList<T> {
    fn new(list: List<T>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = list.len(), "opened transient list");
        Self {
            list,
            owner,
            _marker: PhantomData,
        }
    }

    const fn edit(&self) -> Edit {
        Some(self.owner)
    }

    /// The owner id stamped on nodes this batch writes.
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Current number of elements.
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no elements remain.
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Reads the element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.list.get(index)
    }

    /// Stores `value` at `index`; `index == len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index > len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<&mut Self> {
        let edit = self.edit();
        self.list.set_in(edit, index, value)?;
        Ok(self)
    }

    /// Replaces the element at `index` with `updater(&old)`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index >= len()`.
    pub fn update<F>(&mut self, index: usize, updater: F) -> Result<&mut Self>
    where
        F: FnOnce(&T) -> T,
    {
        let value = updater(self.list.try_get(index)?);
        self.set(index, value)
    }

    /// Appends `value`.
    pub fn push(&mut self, value: T) -> &mut Self {
        let edit = self.edit();
        self.list.push_in(edit, value);
        self
    }

    /// Appends every value of `values`.
    pub fn push_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> &mut Self {
        let edit = self.edit();
        self.list.push_all_in(edit, values);
        self
    }

    /// Drops the last element.
    pub fn pop(&mut self) -> &mut Self {
        let edit = self.edit();
        self.list.pop_in(edit);
        self
    }

    /// Prepends `value`.
    pub fn unshift(&mut self, value: T) -> &mut Self {
        let edit = self.edit();
        self.list.unshift_all_in(edit, vec![value]);
        self
    }

    /// Drops the first element.
    pub fn shift(&mut self) -> &mut Self {
        let edit = self.edit();
        self.list.shift_in(edit);
        self
    }

    /// Inserts `value` before `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut Self> {
        if index > self.len() {
            return Err(CollectionError::OutOfRange {
                index,
                size: self.len(),
            });
        }
        let edit = self.edit();
        self.list.splice_in(edit, index, 0, [value]);
        Ok(self)
    }

    /// Removes the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] when `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<&mut Self> {
        if index >= self.len() {
            return Err(CollectionError::OutOfRange {
                index,
                size: self.len(),
            });
        }
        let edit = self.edit();
        self.list.splice_in(edit, index, 1, []);
        Ok(self)
    }

    /// Truncates or pads to exactly `size` elements.
    pub fn resize(&mut self, size: usize, fill: T) -> &mut Self {
        let edit = self.edit();
        if size < self.len() {
            self.list.truncate_in(edit, size);
        } else {
            let missing = size - self.len();
            self.list.push_all_in(edit, std::iter::repeat_n(fill, missing));
        }
        self
    }

    /// Removes every element.
    pub fn clear(&mut self) -> &mut Self {
        self.list.reset();
        self
    }

    /// Freezes the batch into a persistent list. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> List<T> {
        trace!(
            owner = self.owner.get(),
            size = self.list.len(),
            "froze transient list"
        );
        self.list
    }
}

impl<T: fmt::Debug> fmt::Debug for TransientList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransientList")
            .field("owner", &self.owner)
            .field("elements", &self.list)
            .finish()
    }
}

// =============================================================================
// Iterators
// =============================================================================

type LeafCache<'a, T> = Option<(usize, &'a Node<T>)>;

fn cached_value<'a, T>(
    list: &'a List<T>,
    cache: &mut LeafCache<'a, T>,
    raw: usize,
) -> Option<&'a T> {
    let block = raw >> BITS_PER_LEVEL;
    let node = match *cache {
        Some((cached_block, node)) if cached_block == block => node,
        _ => {
            let node: &'a Node<T> = list.node_for(raw)?;
            *cache = Some((block, node));
            node
        }
    };
    node.value(raw & MASK)
}

/// Borrowing iterator over a [`List`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: usize,
    back: usize,
    front_leaf: LeafCache<'a, T>,
    back_leaf: LeafCache<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let raw = self.list.origin + self.front;
        self.front += 1;
        cached_value(self.list, &mut self.front_leaf, raw)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, count: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(count).min(self.back);
        self.next()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let raw = self.list.origin + self.back;
        cached_value(self.list, &mut self.back_leaf, raw)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

type OwnedLeaf<T> = Option<(usize, ReferenceCounter<Node<T>>)>;

fn owned_value<T: Clone>(list: &List<T>, cache: &mut OwnedLeaf<T>, raw: usize) -> Option<T> {
    let block = raw >> BITS_PER_LEVEL;
    if cache.as_ref().is_none_or(|(cached, _)| *cached != block) {
        *cache = list.node_for(raw).map(|node| (block, node.clone()));
    }
    cache
        .as_ref()
        .and_then(|(_, node)| node.value(raw & MASK).cloned())
}

/// Owning iterator over a [`List`]; yields clones of the shared elements.
pub struct IntoIter<T> {
    list: List<T>,
    front: usize,
    back: usize,
    front_leaf: OwnedLeaf<T>,
    back_leaf: OwnedLeaf<T>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let raw = self.list.origin + self.front;
        self.front += 1;
        owned_value(&self.list, &mut self.front_leaf, raw)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let raw = self.list.origin + self.back;
        owned_value(&self.list, &mut self.back_leaf, raw)
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}
impl<T: Clone> FusedIterator for IntoIter<T> {}

impl<T: Clone> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let back = self.len();
        IntoIter {
            list: self,
            front: 0,
            back,
            front_leaf: None,
            back_leaf: None,
        }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        let owner = OwnerId::fresh();
        for value in iter {
            list.push_in(Some(owner), value);
        }
        list
    }
}

impl<T: Clone> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_all_in(None, iter);
    }
}

impl<T: Clone> From<Vec<T>> for List<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for List<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> From<&[T]> for List<T> {
    fn from(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if self.shares_structure(other) {
            return true;
        }
        self.iter()
            .zip(other.iter())
            .all(|(left, right)| std::ptr::eq(left, right) || left == right)
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: Hash> Hash for List<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: PartialOrd> PartialOrd for List<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for List<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for List<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "List [")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for List<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for List<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
