//! Insertion-ordered persistent set built on [`OrderedMap`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use static_assertions::assert_not_impl_any;
use tracing::trace;

use super::ordered_map::{self, OrderedMap};
use super::owner::OwnerId;
use super::set::Set;

/// A persistent set that iterates in insertion order.
pub struct OrderedSet<T> {
    map: OrderedMap<T, ()>,
}

impl<T> Clone for OrderedSet<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T> OrderedSet<T> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: OrderedMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates members in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.iter(),
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&T> {
        self.iter().next_back()
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// The stored member equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_key_value(value).map(|(member, ())| member)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|member| other.contains(member))
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }
}

impl<T: Clone + Hash + Eq> OrderedSet<T> {
    /// Returns a set including `value`; a new member goes last.
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        if self.contains(&value) {
            return self.clone();
        }
        Self {
            map: self.map.insert(value, ()),
        }
    }

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

    /// Members of either set: `self`'s order, then new members of `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.with_mutations(|set| {
            for member in other {
                set.insert(member.clone());
            }
        })
    }

    /// Members of both sets, in `self`'s order.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        self.iter()
            .filter(|member| other.contains(*member))
            .cloned()
            .collect()
    }

    /// Members of `self` that are not in `other`, in `self`'s order.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        self.with_mutations(|set| {
            for member in other {
                set.remove(member);
            }
        })
    }

    pub fn map<U, F>(&self, function: F) -> OrderedSet<U>
    where
        U: Clone + Hash + Eq,
        F: FnMut(&T) -> U,
    {
        self.iter().map(function).collect()
    }

    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        self.iter()
            .filter(|member| predicate(member))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            map: self.map.reverse(),
        }
    }

    /// Members as an unordered [`Set`].
    pub fn to_set(&self) -> Set<T> {
        self.iter().cloned().collect()
    }

    #[must_use]
    pub fn as_mutable(&self) -> TransientOrderedSet<T> {
        TransientOrderedSet::new(self.clone())
    }

    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientOrderedSet<T>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientOrderedSet
// =============================================================================

/// A mutable batch view over an [`OrderedSet`].
pub struct TransientOrderedSet<T> {
    map: OrderedMap<T, ()>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientOrderedSet<i32>: Send, Sync);

impl<T: Clone + Hash + Eq> TransientOrderedSet<T> {
    fn new(set: OrderedSet<T>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = set.len(), "opened transient ordered set");
        Self {
            map: set.map,
            owner,
            _marker: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.map.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    pub fn insert(&mut self, value: T) -> &mut Self {
        if !self.map.contains_key(&value) {
            self.map.insert_in(Some(self.owner), value, ());
        }
        self
    }

    pub fn remove<Q>(&mut self, value: &Q) -> &mut Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove_in(Some(self.owner), value);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.map = OrderedMap::new();
        self
    }

    /// Freezes the batch into a persistent set. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> OrderedSet<T> {
        trace!(
            owner = self.owner.get(),
            size = self.map.len(),
            "froze transient ordered set"
        );
        OrderedSet { map: self.map }
    }
}

// =============================================================================
// Iterators
// =============================================================================

pub struct Iter<'a, T> {
    inner: ordered_map::Iter<'a, T, ()>,
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

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(member, ())| member)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::iter::Map<<OrderedMap<T, ()> as IntoIterator>::IntoIter, fn((T, ())) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        let member: fn((T, ())) -> T = |(member, ())| member;
        self.map.into_iter().map(member)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|member| (member, ())).collect(),
        }
    }
}

impl<T: Clone + Hash + Eq, const N: usize> From<[T; N]> for OrderedSet<T> {
    fn from(members: [T; N]) -> Self {
        members.into_iter().collect()
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq> Eq for OrderedSet<T> {}

impl<T: Hash> Hash for OrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for member in self {
            member.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for OrderedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "OrderedSet {{")?;
        for (position, member) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{member}")?;
        }
        write!(formatter, "}}")
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for OrderedSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for OrderedSet<T>
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
    fn test_union_appends_new_members() {
        let left = OrderedSet::from([3, 1]);
        let right = OrderedSet::from([2, 1, 4]);
        let members: Vec<_> = left.union(&right).into_iter().collect();
        assert_eq!(members, [3, 1, 2, 4]);
    }

    #[rstest]
    fn test_intersect_keeps_left_order() {
        let left = OrderedSet::from(["c", "b", "a"]);
        let right = OrderedSet::from(["a", "c"]);
        let members: Vec<_> = left.intersect(&right).iter().copied().collect();
        assert_eq!(members, ["c", "a"]);
    }

    #[rstest]
    fn test_readding_removed_member_moves_it_last() {
        let set = OrderedSet::from([1, 2, 3]).remove(&1).insert(1);
        assert_eq!(set.first(), Some(&2));
        assert_eq!(set.last(), Some(&1));
    }

    #[rstest]
    fn test_equality_depends_on_order() {
        let forward = OrderedSet::from([1, 2]);
        let backward = OrderedSet::from([2, 1]);
        assert_ne!(forward, backward);
        assert_eq!(forward.to_set(), backward.to_set());
    }
}
