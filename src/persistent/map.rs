//! Hash array mapped trie backing [`Map`] and [`Set`](super::Set).
//!
//! Each level consumes five bits of the key's 64-bit hash. A bitmap node
//! keeps only its occupied children, in slot order, so a node with three
//! children stores three. Keys whose full hashes are equal share a
//! collision node and are told apart by `Eq`. Removal lifts single entries
//! back into their parent, so the shape of the trie depends only on the set
//! of keys it holds.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use smallvec::{SmallVec, smallvec};
use static_assertions::assert_not_impl_any;
use tracing::trace;

use super::ReferenceCounter;
use super::hashing::{bit_for, compressed_index, compute_hash, hash_index};
use super::owner::{Edit, OwnerId, Owned, make_editable};
use crate::error::{CollectionError, Result};

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

#[derive(Clone)]
enum Child<K, V> {
    Entry(Entry<K, V>),
    Node(ReferenceCounter<Node<K, V>>),
}

#[derive(Clone)]
enum Kind<K, V> {
    Bitmap {
        bitmap: u32,
        children: Vec<Child<K, V>>,
    },
    Collision {
        hash: u64,
        entries: SmallVec<[(K, V); 2]>,
    },
}

#[derive(Clone)]
struct Node<K, V> {
    owner: Edit,
    kind: Kind<K, V>,
}

impl<K: Clone, V: Clone> Owned for Node<K, V> {
    fn owner(&self) -> Edit {
        self.owner
    }

    fn set_owner(&mut self, owner: Edit) {
        self.owner = owner;
    }
}

impl<K, V> Node<K, V> {
    const fn bitmap(bitmap: u32, children: Vec<Child<K, V>>, owner: Edit) -> Self {
        Self {
            owner,
            kind: Kind::Bitmap { bitmap, children },
        }
    }

    fn collision_hash(&self) -> Option<u64> {
        match &self.kind {
            Kind::Collision { hash, .. } => Some(*hash),
            Kind::Bitmap { .. } => None,
        }
    }
}

/// What a parent should do with a child node after a removal below it.
enum Collapse<K, V> {
    Keep,
    Drop,
    Lift(Entry<K, V>),
    /// A collision node left alone in a bitmap node moves up to the first
    /// level where its hash prefix is unique, where a fresh insert puts it.
    LiftNode(ReferenceCounter<Node<K, V>>),
}

impl<K: Clone, V: Clone> Node<K, V> {
    fn collapse(&self) -> Collapse<K, V> {
        match &self.kind {
            Kind::Bitmap { children, .. } => match children.as_slice() {
                [] => Collapse::Drop,
                [Child::Entry(entry)] => Collapse::Lift(entry.clone()),
                [Child::Node(node)] if node.collision_hash().is_some() => {
                    Collapse::LiftNode(ReferenceCounter::clone(node))
                }
                _ => Collapse::Keep,
            },
            Kind::Collision { hash, entries } => match entries.as_slice() {
                [] => Collapse::Drop,
                [(key, value)] => Collapse::Lift(Entry {
                    hash: *hash,
                    key: key.clone(),
                    value: value.clone(),
                }),
                _ => Collapse::Keep,
            },
        }
    }
}

/// Builds the smallest subtree at `depth` holding both `existing` and
/// `entry`.
fn pair<K, V>(
    edit: Edit,
    depth: usize,
    existing: Child<K, V>,
    existing_hash: u64,
    entry: Entry<K, V>,
) -> Child<K, V>
where
    K: Clone + Eq,
    V: Clone,
{
    if existing_hash == entry.hash {
        return match existing {
            Child::Entry(existing) => Child::Node(ReferenceCounter::new(Node {
                owner: edit,
                kind: Kind::Collision {
                    hash: entry.hash,
                    entries: smallvec![(existing.key, existing.value), (entry.key, entry.value)],
                },
            })),
            Child::Node(mut node) => {
                insert_into(&mut node, edit, depth, entry);
                Child::Node(node)
            }
        };
    }
    let existing_index = hash_index(existing_hash, depth);
    let new_index = hash_index(entry.hash, depth);
    let node = if existing_index == new_index {
        let child = pair(edit, depth + 1, existing, existing_hash, entry);
        Node::bitmap(bit_for(existing_index), vec![child], edit)
    } else {
        let bitmap = bit_for(existing_index) | bit_for(new_index);
        let children = if existing_index < new_index {
            vec![existing, Child::Entry(entry)]
        } else {
            vec![Child::Entry(entry), existing]
        };
        Node::bitmap(bitmap, children, edit)
    };
    Child::Node(ReferenceCounter::new(node))
}

enum InsertStep {
    Add,
    Descend,
    Replace,
    Split(u64),
}

/// Inserts `entry` below `node`. Returns `true` when the key was new.
fn insert_into<K, V>(
    node: &mut ReferenceCounter<Node<K, V>>,
    edit: Edit,
    depth: usize,
    entry: Entry<K, V>,
) -> bool
where
    K: Clone + Eq,
    V: Clone,
{
    let editable = make_editable(node, edit);
    match &mut editable.kind {
        Kind::Collision { entries, .. } => {
            if let Some(slot) = entries.iter_mut().find(|(key, _)| *key == entry.key) {
                slot.1 = entry.value;
                false
            } else {
                entries.push((entry.key, entry.value));
                true
            }
        }
        Kind::Bitmap { bitmap, children } => {
            let bit = bit_for(hash_index(entry.hash, depth));
            let position = compressed_index(*bitmap, bit);
            let step = if *bitmap & bit == 0 {
                InsertStep::Add
            } else {
                match &children[position] {
                    Child::Node(child) => match child.collision_hash() {
                        Some(hash) if hash != entry.hash => InsertStep::Split(hash),
                        _ => InsertStep::Descend,
                    },
                    Child::Entry(existing)
                        if existing.hash == entry.hash && existing.key == entry.key =>
                    {
                        InsertStep::Replace
                    }
                    Child::Entry(existing) => InsertStep::Split(existing.hash),
                }
            };
            match step {
                InsertStep::Add => {
                    children.insert(position, Child::Entry(entry));
                    *bitmap |= bit;
                    true
                }
                InsertStep::Descend => match &mut children[position] {
                    Child::Node(child) => insert_into(child, edit, depth + 1, entry),
                    Child::Entry(_) => false,
                },
                InsertStep::Replace => {
                    if let Child::Entry(existing) = &mut children[position] {
                        existing.value = entry.value;
                    }
                    false
                }
                InsertStep::Split(existing_hash) => {
                    let existing = children.remove(position);
                    let merged = pair(edit, depth + 1, existing, existing_hash, entry);
                    children.insert(position, merged);
                    true
                }
            }
        }
    }
}

/// Removes `key` below `node`; the caller has checked that it is present.
fn remove_from<K, V, Q>(
    node: &mut ReferenceCounter<Node<K, V>>,
    edit: Edit,
    depth: usize,
    hash: u64,
    key: &Q,
) where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    let editable = make_editable(node, edit);
    match &mut editable.kind {
        Kind::Collision { entries, .. } => {
            entries.retain(|entry| <K as Borrow<Q>>::borrow(&entry.0) != key);
        }
        Kind::Bitmap { bitmap, children } => {
            let bit = bit_for(hash_index(hash, depth));
            if *bitmap & bit == 0 {
                return;
            }
            let position = compressed_index(*bitmap, bit);
            let collapse = match &mut children[position] {
                Child::Entry(_) => Collapse::Drop,
                Child::Node(child) => {
                    remove_from(child, edit, depth + 1, hash, key);
                    child.collapse()
                }
            };
            match collapse {
                Collapse::Keep => {}
                Collapse::Drop => {
                    children.remove(position);
                    *bitmap &= !bit;
                }
                Collapse::Lift(entry) => children[position] = Child::Entry(entry),
                Collapse::LiftNode(collision) => children[position] = Child::Node(collision),
            }
        }
    }
}

fn nodes_equal<K, V>(
    left: &ReferenceCounter<Node<K, V>>,
    right: &ReferenceCounter<Node<K, V>>,
) -> bool
where
    K: Eq,
    V: PartialEq,
{
    if ReferenceCounter::ptr_eq(left, right) {
        return true;
    }
    match (&left.kind, &right.kind) {
        (
            Kind::Bitmap {
                bitmap: left_bitmap,
                children: left_children,
            },
            Kind::Bitmap {
                bitmap: right_bitmap,
                children: right_children,
            },
        ) => {
            left_bitmap == right_bitmap
                && left_children
                    .iter()
                    .zip(right_children)
                    .all(|pair| match pair {
                        (Child::Entry(left), Child::Entry(right)) => {
                            left.hash == right.hash
                                && left.key == right.key
                                && (std::ptr::eq(&left.value, &right.value)
                                    || left.value == right.value)
                        }
                        (Child::Node(left), Child::Node(right)) => nodes_equal(left, right),
                        _ => false,
                    })
        }
        (
            Kind::Collision {
                hash: left_hash,
                entries: left_entries,
            },
            Kind::Collision {
                hash: right_hash,
                entries: right_entries,
            },
        ) => {
            left_hash == right_hash
                && left_entries.len() == right_entries.len()
                && left_entries.iter().all(|(key, value)| {
                    right_entries
                        .iter()
                        .any(|(other_key, other_value)| key == other_key && value == other_value)
                })
        }
        _ => false,
    }
}

// =============================================================================
// Map Definition
// =============================================================================

/// A persistent unordered map built on a hash array mapped trie.
///
/// # Examples
///
/// ```rust
/// use immutables::Map;
///
/// let map = Map::new().insert("a", 1).insert("b", 2);
/// let extended = map.insert("c", 3);
/// assert_eq!(extended.len(), 3);
/// assert_eq!(map.len(), 2);
/// assert_eq!(extended.get("c"), Some(&3));
/// ```
pub struct Map<K, V> {
    root: Option<ReferenceCounter<Node<K, V>>>,
    length: usize,
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<K, V> Map<K, V> {
    /// Creates an empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Iterates entries by reference in trie order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            collision: None,
            remaining: self.length,
        };
        if let Some(root) = &self.root {
            iter.push_node(root);
        }
        iter
    }

    /// Iterates keys by reference.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates values by reference.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns `true` when both maps share the same root node.
    pub(crate) fn shares_structure(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl<K: Hash + Eq, V> Map<K, V> {
    /// Returns the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = compute_hash(key);
        let mut node = self.root.as_ref()?;
        let mut depth = 0;
        loop {
            match &node.kind {
                Kind::Bitmap { bitmap, children } => {
                    let bit = bit_for(hash_index(hash, depth));
                    if bitmap & bit == 0 {
                        return None;
                    }
                    match children.get(compressed_index(*bitmap, bit))? {
                        Child::Entry(entry) => {
                            return (entry.hash == hash && entry.key.borrow() == key)
                                .then_some((&entry.key, &entry.value));
                        }
                        Child::Node(child) => {
                            node = child;
                            depth += 1;
                        }
                    }
                }
                Kind::Collision {
                    hash: collision_hash,
                    entries,
                } => {
                    if *collision_hash != hash {
                        return None;
                    }
                    return entries
                        .iter()
                        .find(|(candidate, _)| candidate.borrow() == key)
                        .map(|(key, value)| (key, value));
                }
            }
        }
    }

    /// Returns the value under `key`, or `not_set` when absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, not_set: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(not_set)
    }

    /// Returns the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::KeyNotFound`] when the key is absent.
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
        self.get_key_value(key).is_some()
    }
}

// =============================================================================
// Structural Core
// =============================================================================

impl<K: Clone + Hash + Eq, V: Clone> Map<K, V> {
    pub(crate) fn insert_in(&mut self, edit: Edit, key: K, value: V) -> bool {
        let entry = Entry {
            hash: compute_hash(&key),
            key,
            value,
        };
        let root = self
            .root
            .get_or_insert_with(|| ReferenceCounter::new(Node::bitmap(0, Vec::new(), edit)));
        let added = insert_into(root, edit, 0, entry);
        if added {
            self.length += 1;
        }
        added
    }

    pub(crate) fn remove_in<Q>(&mut self, edit: Edit, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return false;
        }
        let hash = compute_hash(key);
        if let Some(root) = self.root.as_mut() {
            remove_from(root, edit, 0, hash, key);
        }
        self.length -= 1;
        if self.length == 0 {
            self.root = None;
        }
        true
    }

    fn update_with_in<F>(&mut self, edit: Edit, key: K, updater: F)
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        match updater(self.get(&key)) {
            Some(value) => {
                self.insert_in(edit, key, value);
            }
            None => {
                self.remove_in(edit, &key);
            }
        }
    }
}

// =============================================================================
// Persistent Operations
// =============================================================================

impl<K: Clone + Hash + Eq, V: Clone> Map<K, V> {
    /// Creates a map holding one entry.
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a map with `key` bound to `value`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut map = self.clone();
        map.insert_in(None, key, value);
        map
    }

    /// Returns a map without `key`. Returns a clone of `self` when the key
    /// is absent.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.clone();
        map.remove_in(None, key);
        map
    }

    /// Reads the value under `key` (or `not_set`), applies `updater` and
    /// stores the result in one step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutables::Map;
    ///
    /// let counts = Map::new().insert("apples", 2);
    /// let counts = counts.update("apples", 0, |count| count + 1);
    /// let counts = counts.update("pears", 0, |count| count + 1);
    /// assert_eq!(counts.get("apples"), Some(&3));
    /// assert_eq!(counts.get("pears"), Some(&1));
    /// ```
    #[must_use]
    pub fn update<F>(&self, key: K, not_set: V, updater: F) -> Self
    where
        F: FnOnce(V) -> V,
    {
        let current = self.get(&key).cloned().unwrap_or(not_set);
        self.insert(key, updater(current))
    }

    /// Inserts, replaces or removes `key` depending on what `updater`
    /// returns for the current value.
    #[must_use]
    pub fn update_with<F>(&self, key: K, updater: F) -> Self
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let mut map = self.clone();
        map.update_with_in(None, key, updater);
        map
    }

    /// Returns a map holding every entry of `self` and `other`; values from
    /// `other` win on shared keys.
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
            for (key, value) in other {
                let merged = match map.get(key) {
                    Some(existing) => merger(existing, value, key),
                    None => value.clone(),
                };
                map.insert(key.clone(), merged);
            }
        })
    }

    /// Key-space union; values from `self` win on shared keys.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.with_mutations(|map| {
            for (key, value) in other {
                if !map.contains_key(key) {
                    map.insert(key.clone(), value.clone());
                }
            }
        })
    }

    /// Key-space union resolving shared keys with `merger(first, second, key)`.
    #[must_use]
    pub fn union_with<F>(&self, other: &Self, merger: F) -> Self
    where
        F: FnMut(&V, &V, &K) -> V,
    {
        self.merge_with(other, merger)
    }

    /// Keeps the entries of `self` whose keys also occur in `other`.
    #[must_use]
    pub fn intersect<W>(&self, other: &Map<K, W>) -> Self {
        self.with_mutations(|map| {
            for key in self.keys() {
                if !other.contains_key(key) {
                    map.remove(key);
                }
            }
        })
    }

    /// Key-space intersection combining values with `merger(first, second, key)`.
    #[must_use]
    pub fn intersect_with<W, F>(&self, other: &Map<K, W>, mut merger: F) -> Self
    where
        F: FnMut(&V, &W, &K) -> V,
    {
        self.iter()
            .filter_map(|(key, value)| {
                other
                    .get(key)
                    .map(|second| (key.clone(), merger(value, second, key)))
            })
            .collect()
    }

    /// Drops every entry whose key occurs in `other`.
    #[must_use]
    pub fn subtract<W>(&self, other: &Map<K, W>) -> Self {
        self.with_mutations(|map| {
            for key in other.keys() {
                map.remove(key);
            }
        })
    }

    /// Maps every value, keeping keys.
    pub fn map<U, F>(&self, mut function: F) -> Map<K, U>
    where
        U: Clone,
        F: FnMut(&V, &K) -> U,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), function(value, key)))
            .collect()
    }

    /// Maps every key. Later entries win when two keys map to the same key.
    pub fn map_keys<L, F>(&self, mut function: F) -> Map<L, V>
    where
        L: Clone + Hash + Eq,
        F: FnMut(&K, &V) -> L,
    {
        self.iter()
            .map(|(key, value)| (function(key, value), value.clone()))
            .collect()
    }

    /// Maps every entry to a new key/value pair.
    pub fn map_entries<L, U, F>(&self, mut function: F) -> Map<L, U>
    where
        L: Clone + Hash + Eq,
        U: Clone,
        F: FnMut(&K, &V) -> (L, U),
    {
        self.iter().map(|(key, value)| function(key, value)).collect()
    }

    /// Swaps keys and values.
    pub fn flip(&self) -> Map<V, K>
    where
        V: Hash + Eq,
    {
        self.iter()
            .map(|(key, value)| (value.clone(), key.clone()))
            .collect()
    }

    // =========================================================================
    // Transient Entry Points
    // =========================================================================

    /// Opens a transient view stamped with a fresh owner.
    #[must_use]
    pub fn as_mutable(&self) -> TransientMap<K, V> {
        TransientMap::new(self.clone())
    }

    /// Applies a batch of edits through a transient and freezes the result.
    #[must_use]
    pub fn with_mutations<F>(&self, mutation: F) -> Self
    where
        F: FnOnce(&mut TransientMap<K, V>),
    {
        let mut transient = self.as_mutable();
        mutation(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientMap
// =============================================================================

/// A mutable batch view over a [`Map`].
pub struct TransientMap<K, V> {
    map: Map<K, V>,
    owner: OwnerId,
    _marker: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientMap<i32, i32>: Send, Sync);

impl<K: Clone + Hash + Eq, V: Clone> TransientMap<K, V> {
    fn new(map: Map<K, V>) -> Self {
        let owner = OwnerId::fresh();
        trace!(owner = owner.get(), size = map.len(), "opened transient map");
        Self {
            map,
            owner,
            _marker: PhantomData,
        }
    }

    /// The owner id stamped on nodes this batch writes.
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Current number of entries.
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no entries remain.
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Reads the value under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
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

    /// Reads, transforms and stores the value under `key`.
    pub fn update<F>(&mut self, key: K, not_set: V, updater: F) -> &mut Self
    where
        F: FnOnce(V) -> V,
    {
        let current = self.map.get(&key).cloned().unwrap_or(not_set);
        self.insert(key, updater(current))
    }

    /// Inserts, replaces or removes `key` depending on `updater`.
    pub fn update_with<F>(&mut self, key: K, updater: F) -> &mut Self
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        self.map.update_with_in(Some(self.owner), key, updater);
        self
    }

    /// Copies every entry of `other` in; `other` wins on shared keys.
    pub fn merge(&mut self, other: &Map<K, V>) -> &mut Self {
        for (key, value) in other {
            self.insert(key.clone(), value.clone());
        }
        self
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> &mut Self {
        self.map = Map::new();
        self
    }

    /// Freezes the batch into a persistent map. The owner id is retired.
    #[must_use]
    pub fn as_immutable(self) -> Map<K, V> {
        trace!(
            owner = self.owner.get(),
            size = self.map.len(),
            "froze transient map"
        );
        self.map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TransientMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransientMap")
            .field("owner", &self.owner)
            .field("entries", &self.map)
            .finish()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over a [`Map`].
pub struct Iter<'a, K, V> {
    stack: Vec<std::slice::Iter<'a, Child<K, V>>>,
    collision: Option<std::slice::Iter<'a, (K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_node(&mut self, node: &'a Node<K, V>) {
        match &node.kind {
            Kind::Bitmap { children, .. } => self.stack.push(children.iter()),
            Kind::Collision { entries, .. } => self.collision = Some(entries.iter()),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = self.collision.as_mut() {
                if let Some((key, value)) = entries.next() {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                self.collision = None;
            }
            match self.stack.last_mut()?.next() {
                None => {
                    self.stack.pop();
                }
                Some(Child::Entry(entry)) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &entry.value));
                }
                Some(Child::Node(node)) => self.push_node(node),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

enum Step<K, V> {
    Pop,
    Yield(K, V),
    Push(ReferenceCounter<Node<K, V>>),
}

/// Owning iterator over a [`Map`]; yields clones of the shared entries.
pub struct IntoIter<K, V> {
    stack: Vec<(ReferenceCounter<Node<K, V>>, usize)>,
    remaining: usize,
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = {
                let (node, position) = self.stack.last_mut()?;
                let current = *position;
                *position += 1;
                match &node.kind {
                    Kind::Bitmap { children, .. } => match children.get(current) {
                        None => Step::Pop,
                        Some(Child::Entry(entry)) => {
                            Step::Yield(entry.key.clone(), entry.value.clone())
                        }
                        Some(Child::Node(child)) => Step::Push(child.clone()),
                    },
                    Kind::Collision { entries, .. } => match entries.get(current) {
                        None => Step::Pop,
                        Some((key, value)) => Step::Yield(key.clone(), value.clone()),
                    },
                }
            };
            match step {
                Step::Pop => {
                    self.stack.pop();
                }
                Step::Push(child) => self.stack.push((child, 0)),
                Step::Yield(key, value) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {}
impl<K: Clone, V: Clone> FusedIterator for IntoIter<K, V> {}

impl<K: Clone, V: Clone> IntoIterator for Map<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            stack: self.root.into_iter().map(|root| (root, 0)).collect(),
            remaining: self.length,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        let owner = OwnerId::fresh();
        for (key, value) in iter {
            map.insert_in(Some(owner), key, value);
        }
        map
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_in(None, key, value);
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone, const N: usize> From<[(K, V); N]> for Map<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Eq, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if self.shares_structure(other) {
            return true;
        }
        match (&self.root, &other.root) {
            (Some(left), Some(right)) => nodes_equal(left, right),
            _ => false,
        }
    }
}

impl<K: Eq, V: Eq> Eq for Map<K, V> {}

impl<K: Hash, V: Hash> Hash for Map<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        crate::equality::unordered_hash(self.iter()).hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Map<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Map {{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

/// Collects a serialized map into any keyed collection, keeping entry order.
#[cfg(feature = "serde")]
pub(crate) struct EntriesVisitor<C, K, V> {
    marker: PhantomData<(C, K, V)>,
}

#[cfg(feature = "serde")]
impl<C, K, V> EntriesVisitor<C, K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, C, K, V> serde::de::Visitor<'de> for EntriesVisitor<C, K, V>
where
    C: FromIterator<(K, V)>,
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
{
    type Value = C;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        Ok(entries.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for Map<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for Map<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(EntriesVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
