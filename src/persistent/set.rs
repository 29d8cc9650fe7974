//! Persistent hash set built on the [`Map`] trie.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use static_assertions::assert_not_impl_any;
use tracing::trace;

use super::map::{self, Map};
use super::owner::OwnerId;

/// A persistent unordered set of unique values.
///
/// # Examples
///
/// ```rust
/// use immutables::Set;
///
/// let left: Set<i32> = [1, 2, 3].into_iter().collect();
/// let right: Set<i32> = [2, 3, 4].into_iter().collect();
/// let both = left.intersect(&right);
/// assert_eq!(both.len(), 2);
/// assert!(both.contains(&2) && both.contains(&3));
/// ```
pub struct Set<T> {
    map: Map<T, ()>,
}

impl<T> Clone for Set<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T> Set<T> {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { map: Map::new() }
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates members by reference in trie order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.iter(),
        }
    }
}

impl<T: Hash + Eq> Set<T> {
    /// Returns `true` if `value` is a member.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// Returns the stored member equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_key_value(value).map(|(member, ())| member)
    }

    /// Returns `true` if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|member| other.contains(member))
    }

    /// Returns `true` if every member of `other` is in `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if the sets have no member in common.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !small.iter().any(|member| large.contains(member))
    }
}

impl<T: Clone + Hash + Eq> Set<T> {
    /// Creates a set with one member.
    #[must_use]
    pub fn singleton(value: T) -> Self {
        Self::new().insert(value)
    }

    /// Creates a set from the keys of a map.
    #[must_use]
    pub fn from_keys<V>(map: &Map<T, V>) -> Self {
        map.keys().cloned().collect()
    }

    /// Returns a set including `value`. Adding an existing member returns a
    /// set sharing the whole trie with `self`.
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        if self.contains(&value) {
            return self.clone();
        }
        Self {
            map: self.map.insert(value, ()),
        }
    }

    /// Returns a set without `value`.
    #[must_use]
    pub fn remove<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            map: self.map.remove(value),
        }
    }

    /// Members of either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (base, extra) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        if extra.is_empty() {
            return base.clone();
        }
        base.with_mutations(|set| {
            for member in extra {
                set.insert(member.clone());
            }
        })
    }

    /// Members of both sets.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            map: self.map.intersect(&other.map),
        }
    }

    /// Members of `self` that are not in `other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        Self {
            map: self.map.subtract(&other.map),
        }
    }

    /// Maps every member; members that map to equal values merge.
    pub fn map<U, F>(&self, function: F) -> Set<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> U,
    {
        self.iter().map(function).collect()
    }

    /// Maps every member to an iterable and unions the results.
    pub fn flat_map<U, I, F>(&self, function: F) -> Set<U>
    where
        U: Clone + Hash + Eq,
        I: IntoIterator<Item = U>,
        F: FnMut(&T) -> I,
    {
        self.iter().flat_map(function).collect()
    }

    /// Opens a transient view stamped with a fresh owner.
    #[must_use]
    pub fn as_mutable(&self) -> TransientSet<T> {
        TransientSet::new(self.clone())
    }

    /// Applies a batch of edits through a transient and freezes the result.
    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientSet<T>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientSet
// =============================================================================

/// A mutable batch view over a [`Set`].
pub struct TransientSet<T> {
    map: Map<T, ()>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientSet<i32>: Send, Sync);

impl<T: Clone + Hash + Eq> TransientSet<T> {
    fn new(set: Set<T>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = set.len(), "opened transient set");
        Self {
            map: set.map,
            owner,
            _marker: PhantomData,
        }
    }

    /// Current number of members.
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no members remain.
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `value` is a member.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// Adds `value`.
    pub fn insert(&mut self, value: T) -> &mut Self {
        if !self.map.contains_key(&value) {
            self.map.insert_in(Some(self.owner), value, ());
        }
        self
    }

    /// Removes `value` if present.
    pub fn remove<Q>(&mut self, value: &Q) -> &mut Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove_in(Some(self.owner), value);
        self
    }

    /// Removes every member.
    pub fn clear(&mut self) -> &mut Self {
        self.map = Map::new();
        self
    }

    /// Freezes the batch into a persistent set. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> Set<T> {
        trace!(
            owner = self.owner.get(),
            size = self.map.len(),
            "froze transient set"
        );
        Set { map: self.map }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over a [`Set`].
pub struct Iter<'a, T> {
    inner: map::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(member, ())| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`Set`].
pub struct IntoIter<T> {
    inner: map::IntoIter<T, ()>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(member, ())| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}
impl<T: Clone> FusedIterator for IntoIter<T> {}

impl<T: Clone> IntoIterator for Set<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|member| (member, ())).collect(),
        }
    }
}

impl<T: Clone + Hash + Eq, const N: usize> From<[T; N]> for Set<T> {
    fn from(members: [T; N]) -> Self {
        members.into_iter().collect()
    }
}

impl<T: Eq> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq> Eq for Set<T> {}

impl<T: Hash> Hash for Set<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        crate::equality::unordered_hash(self.iter()).hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Set<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Set {{")?;
        for (index, member) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{member}")?;
        }
        write!(formatter, "}}")
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Set<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Set<T>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(|members| members.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insert_existing_member_shares_trie() {
        let set = Set::from([1, 2, 3]);
        let same = set.insert(2);
        assert!(set.map.shares_structure(&same.map));
    }

    #[rstest]
    fn test_union_prefers_larger_base() {
        let large: Set<i32> = (0..100).collect();
        let small = Set::from([5, 200]);
        let union = small.union(&large);
        assert_eq!(union.len(), 101);
        assert!(union.contains(&200));
    }

    #[rstest]
    fn test_subtract_and_disjoint() {
        let left = Set::from([1, 2, 3, 4]);
        let right = Set::from([3, 4, 5]);
        let difference = left.subtract(&right);
        assert_eq!(difference, Set::from([1, 2]));
        assert!(difference.is_disjoint(&right));
        assert!(!left.is_disjoint(&right));
    }

    #[rstest]
    fn test_subset_relations() {
        let small = Set::from(["a"]);
        let large = Set::from(["a", "b"]);
        assert!(small.is_subset(&large));
        assert!(large.is_superset(&small));
        assert!(!large.is_subset(&small));
    }

    #[rstest]
    fn test_from_keys() {
        let map = Map::from([("x", 1), ("y", 2)]);
        let keys = Set::from_keys(&map);
        assert_eq!(keys, Set::from(["x", "y"]));
    }
}
