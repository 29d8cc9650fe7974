//! Persistent LIFO stack.
//!
//! A [`Stack`] is a [`List`] read from the back: the top of the stack is
//! the last element of the list, so push and pop both work on the list's
//! tail leaf. Indexing and iteration start at the top.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FusedIterator, Rev};
use std::marker::PhantomData;

use static_assertions::assert_not_impl_any;
use tracing::trace;

use super::list::{self, List};
use super::owner::OwnerId;
use crate::error::{CollectionError, Result};

/// A persistent stack.
///
/// # Examples
///
/// ```rust
/// use immutables::Stack;
///
/// let stack = Stack::from([1, 2, 3]);
/// assert_eq!(stack.peek(), Some(&1));
/// let pushed = stack.push(0);
/// assert_eq!(pushed.peek(), Some(&0));
/// assert_eq!(stack.len(), 3);
/// ```
pub struct Stack<T> {
    list: List<T>,
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { list: List::new() }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The top element.
    pub fn peek(&self) -> Option<&T> {
        self.list.last()
    }

    /// The element `index` positions below the top.
    pub fn get(&self, index: usize) -> Option<&T> {
        let position = self.len().checked_sub(index + 1)?;
        self.list.get(position)
    }

    /// Like [`get`](Self::get), failing with `OutOfRange`.
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

    /// Iterates from the top down.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.list.iter().rev(),
        }
    }
}

impl<T: Clone> Stack<T> {
    /// Returns a stack with `value` on top.
    #[must_use]
    pub fn push(&self, value: T) -> Self {
        Self {
            list: self.list.push(value),
        }
    }

    /// Returns a stack with `values` on top; the first value ends up on top.
    #[must_use]
    pub fn push_all<I: IntoIterator<Item = T>>(&self, values: I) -> Self {
        let mut values: Vec<T> = values.into_iter().collect();
        values.reverse();
        Self {
            list: self.list.push_all(values),
        }
    }

    /// Returns the stack without its top element.
    #[must_use]
    pub fn pop(&self) -> Self {
        Self {
            list: self.list.pop(),
        }
    }

    /// Alias of [`push`](Self::push).
    #[must_use]
    pub fn unshift(&self, value: T) -> Self {
        self.push(value)
    }

    /// Alias of [`pop`](Self::pop).
    #[must_use]
    pub fn shift(&self) -> Self {
        self.pop()
    }

    /// Returns an empty stack.
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Elements from the top down, as a [`List`].
    pub fn to_list(&self) -> List<T> {
        self.iter().cloned().collect()
    }

    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            list: self.list.iter().rev().cloned().collect(),
        }
    }

    pub fn map<U: Clone, F: FnMut(&T) -> U>(&self, function: F) -> Stack<U> {
        Stack {
            list: self.list.map(function),
        }
    }

    #[must_use]
    pub fn as_mutable(&self) -> TransientStack<T> {
        TransientStack::new(self.clone())
    }

    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientStack<T>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientStack
// =============================================================================

/// A mutable batch view over a [`Stack`].
pub struct TransientStack<T> {
    list: List<T>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientStack<i32>: Send, Sync);

impl<T: Clone> TransientStack<T> {
    fn new(stack: Stack<T>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = stack.len(), "opened transient stack");
        Self {
            list: stack.list,
            owner,
            _marker: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.list.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn peek(&self) -> Option<&T> {
        self.list.last()
    }

    pub fn push(&mut self, value: T) -> &mut Self {
        self.list.push_in(Some(self.owner), value);
        self
    }

    pub fn push_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> &mut Self {
        let values: Vec<T> = values.into_iter().collect();
        for value in values.into_iter().rev() {
            self.list.push_in(Some(self.owner), value);
        }
        self
    }

    pub fn pop(&mut self) -> &mut Self {
        self.list.pop_in(Some(self.owner));
        self
    }

    /// Freezes the batch into a persistent stack. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> Stack<T> {
        trace!(
            owner = self.owner.get(),
            size = self.list.len(),
            "froze transient stack"
        );
        Stack { list: self.list }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Top-down iterator over a [`Stack`].
pub struct Iter<'a, T> {
    inner: Rev<list::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for Stack<T> {
    type Item = T;
    type IntoIter = Rev<list::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter().rev()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for Stack<T> {
    /// The first item becomes the top of the stack.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new().push_all(iter)
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for Stack<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> From<List<T>> for Stack<T> {
    /// The first element of the list becomes the top of the stack.
    fn from(list: List<T>) -> Self {
        list.into_iter().collect()
    }
}

impl<T: PartialEq> PartialEq for Stack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

impl<T: Eq> Eq for Stack<T> {}

impl<T: Hash> Hash for Stack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Stack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Stack [")?;
        for (position, value) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{value}")?;
        }
        write!(formatter, "]")
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Stack<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Stack<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(|values| values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_first_item_is_top() {
        let stack = Stack::from(["a", "b", "c"]);
        assert_eq!(stack.peek(), Some(&"a"));
        assert_eq!(stack.get(2), Some(&"c"));
        assert_eq!(stack.get(3), None);
        let order: Vec<_> = stack.iter().copied().collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[rstest]
    fn test_push_all_puts_first_value_on_top() {
        let stack = Stack::from([3]).push_all([1, 2]);
        let order: Vec<_> = stack.into_iter().collect();
        assert_eq!(order, [1, 2, 3]);
    }

    #[rstest]
    fn test_pop_leaves_original_intact() {
        let stack = Stack::from([1, 2]);
        let popped = stack.pop();
        assert_eq!(popped.peek(), Some(&2));
        assert_eq!(stack.peek(), Some(&1));
        assert_eq!(Stack::<i32>::new().pop().len(), 0);
    }

    #[rstest]
    fn test_try_get_out_of_range() {
        let stack = Stack::from([1]);
        assert_eq!(
            stack.try_get(4),
            Err(CollectionError::OutOfRange { index: 4, size: 1 })
        );
    }

    #[rstest]
    fn test_transient_push_and_pop() {
        let stack = Stack::from([1]).with_mutations(|stack| {
            stack.push(2).push_all([4, 3]).pop();
        });
        let order: Vec<_> = stack.iter().copied().collect();
        assert_eq!(order, [3, 2, 1]);
    }

    #[rstest]
    fn test_display() {
        assert_eq!(Stack::from([1, 2]).to_string(), "Stack [1, 2]");
    }
}
