//! Dynamically typed values for heterogeneous nested data.
//!
//! [`Value`] lets persistent collections nest inside each other the way
//! JSON documents do: a `Map` of `List`s of `Record`s, and so on. Key paths
//! (`get_in`, `set_in`, `update_in`, `remove_in`, `has_in`) walk such trees
//! one key at a time and rebuild only the collections along the path.
//!
//! # Examples
//!
//! ```rust
//! use immutables::{List, Map, Value};
//!
//! let tree = Value::from(Map::from([(
//!     Value::from("users"),
//!     Value::from(List::from([Value::from("ann"), Value::from("bob")])),
//! )]));
//! let path = [Value::from("users"), Value::from(1)];
//!
//! assert_eq!(tree.get_in(&path), Some(&Value::from("bob")));
//! let renamed = tree.set_in(&path, Value::from("cy")).unwrap();
//! assert_eq!(renamed.get_in(&path), Some(&Value::from("cy")));
//! assert_eq!(tree.get_in(&path), Some(&Value::from("bob")));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::trace;

use crate::error::{CollectionError, Result};
use crate::persistent::{List, Map, OrderedMap, OrderedSet, Set, Stack};
use crate::record::Record;
use crate::seq::Nested;

// =============================================================================
// Number
// =============================================================================

/// A 64-bit float with total equality.
///
/// `-0.0` is stored as `0.0` and every NaN as one canonical NaN, so equal
/// numbers have equal bits and `NaN == NaN`.
#[derive(Clone, Copy)]
pub struct Number(f64);

impl Number {
    /// Wraps `value`, normalizing zero and NaN.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(f64::NAN)
        } else if value.to_bits() == (-0.0_f64).to_bits() {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Returns `true` for finite numbers without a fractional part.
    #[must_use]
    pub fn is_integral(self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0
    }

    /// The number as a collection index, if it is a non-negative integer.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn as_index(self) -> Option<usize> {
        (self.is_integral() && self.0 >= 0.0 && self.0 <= usize::MAX as f64)
            .then_some(self.0 as usize)
    }

    /// The number as an `i64`, if it is integral and exactly representable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(self) -> Option<i64> {
        const EXACT: f64 = 9_007_199_254_740_992.0;
        (self.is_integral() && self.0.abs() <= EXACT).then_some(self.0 as i64)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_i64() {
            Some(integer) => write!(formatter, "{integer}"),
            None => write!(formatter, "{}", self.0),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::new(f64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Self::new(f64::from(value))
    }
}

impl From<i64> for Number {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::new(value as f64)
    }
}

impl From<usize> for Number {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        Self::new(value as f64)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed value.
///
/// Equality and hashing are structural and follow each variant's
/// collection semantics. Values of different variants are never equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(List<Value>),
    Map(Map<Value, Value>),
    OrderedMap(OrderedMap<Value, Value>),
    Set(Set<Value>),
    OrderedSet(OrderedSet<Value>),
    Stack(Stack<Value>),
    Record(Record),
}

impl Value {
    /// Short lowercase name of the variant, used in error reports.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::OrderedMap(_) => "ordered map",
            Self::Set(_) => "set",
            Self::OrderedSet(_) => "ordered set",
            Self::Stack(_) => "stack",
            Self::Record(_) => "record",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for variants that hold other values.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        !matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_)
        )
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(number.get()),
            _ => None,
        }
    }

    /// The value as a collection index; see [`Number::as_index`].
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Number(number) => number.as_index(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&List<Self>> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Map<Self, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_ordered_map(&self) -> Option<&OrderedMap<Self, Self>> {
        match self {
            Self::OrderedMap(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_set(&self) -> Option<&Set<Self>> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_ordered_set(&self) -> Option<&OrderedSet<Self>> {
        match self {
            Self::OrderedSet(set) => Some(set),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_stack(&self) -> Option<&Stack<Self>> {
        match self {
            Self::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Number of entries, for collection variants.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::List(list) => Some(list.len()),
            Self::Map(map) => Some(map.len()),
            Self::OrderedMap(map) => Some(map.len()),
            Self::Set(set) => Some(set.len()),
            Self::OrderedSet(set) => Some(set.len()),
            Self::Stack(stack) => Some(stack.len()),
            Self::Record(record) => Some(record.len()),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => None,
        }
    }
}

// =============================================================================
// Key Paths
// =============================================================================

impl Value {
    /// Looks up one key.
    ///
    /// Indexed variants take a non-negative integral number, keyed variants
    /// any value, records a field name. A set answers with its stored member
    /// equal to `key`.
    #[must_use]
    pub fn get(&self, key: &Self) -> Option<&Self> {
        match self {
            Self::List(list) => list.get(key.as_index()?),
            Self::Stack(stack) => stack.get(key.as_index()?),
            Self::Map(map) => map.get(key),
            Self::OrderedMap(map) => map.get(key),
            Self::Set(set) => set.get(key),
            Self::OrderedSet(set) => set.get(key),
            Self::Record(record) => record.get(key.as_str()?),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => None,
        }
    }

    /// Follows `path` from `self`. An empty path yields `self`.
    #[must_use]
    pub fn get_in(&self, path: &[Self]) -> Option<&Self> {
        path.iter().try_fold(self, |current, key| current.get(key))
    }

    /// Returns `true` if every key along `path` is present.
    #[must_use]
    pub fn has_in(&self, path: &[Self]) -> bool {
        self.get_in(path).is_some()
    }

    /// Returns a value with `value` stored at `path`.
    ///
    /// Missing intermediate keys are filled with empty maps.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::TypeMismatch`] when the path runs through a
    ///   scalar or a set, or uses a non-index key on an indexed variant.
    /// - [`CollectionError::OutOfRange`] when an index lies past the end.
    /// - [`CollectionError::UnknownField`] when a record lacks the field.
    pub fn set_in(&self, path: &[Self], value: Self) -> Result<Self> {
        self.update_in(path, Self::Null, move |_| value)
    }

    /// Returns a value with the entry at `path` replaced by
    /// `updater(existing)`, where a missing entry reads as `not_set`.
    ///
    /// # Errors
    ///
    /// Same as [`set_in`](Self::set_in).
    pub fn update_in<F>(&self, path: &[Self], not_set: Self, updater: F) -> Result<Self>
    where
        F: FnOnce(Self) -> Self,
    {
        let Some((key, rest)) = path.split_first() else {
            return Ok(updater(self.clone()));
        };
        let existing = self.get(key).cloned();
        let updated = if rest.is_empty() {
            updater(existing.unwrap_or(not_set))
        } else {
            existing
                .unwrap_or_else(|| Self::Map(Map::new()))
                .update_in(rest, not_set, updater)?
        };
        self.with_entry(key, updated)
    }

    /// Returns a value without the entry at `path`. Missing keys leave the
    /// value unchanged; a record field is reset to its default.
    ///
    /// # Errors
    ///
    /// Same as [`set_in`](Self::set_in), except that removing from a set is
    /// allowed and an index past the end is a no-op.
    pub fn remove_in(&self, path: &[Self]) -> Result<Self> {
        let Some((key, rest)) = path.split_first() else {
            return Ok(Self::Null);
        };
        if rest.is_empty() {
            return self.without_entry(key);
        }
        match self.get(key) {
            Some(child) => {
                let updated = child.remove_in(rest)?;
                self.with_entry(key, updated)
            }
            None => Ok(self.clone()),
        }
    }

    fn index_key(&self, key: &Self) -> Result<usize> {
        key.as_index().ok_or(CollectionError::TypeMismatch {
            left: self.kind_name(),
            right: key.kind_name(),
        })
    }

    fn field_key<'a>(&self, key: &'a Self) -> Result<&'a str> {
        key.as_str().ok_or(CollectionError::TypeMismatch {
            left: self.kind_name(),
            right: key.kind_name(),
        })
    }

    fn with_entry(&self, key: &Self, value: Self) -> Result<Self> {
        match self {
            Self::List(list) => Ok(Self::List(list.set(self.index_key(key)?, value)?)),
            Self::Stack(stack) => {
                let index = self.index_key(key)?;
                if index >= stack.len() {
                    return Err(CollectionError::OutOfRange {
                        index,
                        size: stack.len(),
                    });
                }
                Ok(Self::Stack(
                    stack
                        .iter()
                        .enumerate()
                        .map(|(position, item)| {
                            if position == index {
                                value.clone()
                            } else {
                                item.clone()
                            }
                        })
                        .collect(),
                ))
            }
            Self::Map(map) => Ok(Self::Map(map.insert(key.clone(), value))),
            Self::OrderedMap(map) => Ok(Self::OrderedMap(map.insert(key.clone(), value))),
            Self::Record(record) => Ok(Self::Record(record.set(self.field_key(key)?, value)?)),
            _ => Err(CollectionError::TypeMismatch {
                left: self.kind_name(),
                right: key.kind_name(),
            }),
        }
    }

    fn without_entry(&self, key: &Self) -> Result<Self> {
        match self {
            Self::List(list) => {
                let index = self.index_key(key)?;
                if index < list.len() {
                    Ok(Self::List(list.remove(index)?))
                } else {
                    Ok(self.clone())
                }
            }
            Self::Stack(stack) => {
                let index = self.index_key(key)?;
                Ok(Self::Stack(
                    stack
                        .iter()
                        .enumerate()
                        .filter(|(position, _)| *position != index)
                        .map(|(_, item)| item.clone())
                        .collect(),
                ))
            }
            Self::Map(map) => Ok(Self::Map(map.remove(key))),
            Self::OrderedMap(map) => Ok(Self::OrderedMap(map.remove(key))),
            Self::Set(set) => Ok(Self::Set(set.remove(key))),
            Self::OrderedSet(set) => Ok(Self::OrderedSet(set.remove(key))),
            Self::Record(record) => Ok(Self::Record(record.remove(self.field_key(key)?)?)),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {
                Err(CollectionError::TypeMismatch {
                    left: self.kind_name(),
                    right: key.kind_name(),
                })
            }
        }
    }
}

// =============================================================================
// Merging
// =============================================================================

/// Resolves a key present on both sides of a merge.
type Resolver<'a> = dyn FnMut(&Value, &Value, &Value) -> Result<Value> + 'a;

impl Value {
    /// Writes the entries of `other` over `self`.
    ///
    /// `other` is read as key/value pairs: positions for lists and stacks,
    /// keys for maps, field names for records. Lists take positions past
    /// their end by appending. Sets add the values of `other` as members.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::TypeMismatch`] when either side is a scalar,
    ///   `self` is a stack, or a key of `other` does not fit `self`.
    /// - [`CollectionError::UnknownField`] when `self` is a record without
    ///   a field named in `other`.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        self.merge_entries(other, &mut |_, incoming, _| Ok(incoming.clone()))
    }

    /// Like [`merge`](Self::merge), resolving keys present on both sides
    /// with `merger(existing, incoming, key)`.
    ///
    /// # Errors
    ///
    /// Same as [`merge`](Self::merge).
    pub fn merge_with<F>(&self, other: &Self, mut merger: F) -> Result<Self>
    where
        F: FnMut(&Self, &Self, &Self) -> Self,
    {
        self.merge_entries(other, &mut |existing, incoming, key| {
            Ok(merger(existing, incoming, key))
        })
    }

    /// Merges recursively: where both sides hold collections under the same
    /// key and the existing one can be merged into, the two are merged in
    /// turn rather than replaced.
    ///
    /// # Errors
    ///
    /// Same as [`merge`](Self::merge), at any depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutables::{Map, Value};
    ///
    /// fn key(text: &str) -> Value {
    ///     Value::from(text)
    /// }
    ///
    /// let style = Value::from(Map::from([(
    ///     key("font"),
    ///     Value::from(Map::from([(key("size"), Value::from(12)), (key("face"), key("serif"))])),
    /// )]));
    /// let larger = Value::from(Map::from([(
    ///     key("font"),
    ///     Value::from(Map::from([(key("size"), Value::from(14))])),
    /// )]));
    ///
    /// let merged = style.merge_deep(&larger).unwrap();
    /// assert_eq!(merged.get_in(&[key("font"), key("size")]), Some(&Value::from(14)));
    /// assert_eq!(merged.get_in(&[key("font"), key("face")]), Some(&key("serif")));
    /// ```
    pub fn merge_deep(&self, other: &Self) -> Result<Self> {
        self.merge_deep_with(other, |_, incoming, _| incoming.clone())
    }

    /// Like [`merge_deep`](Self::merge_deep); `merger(existing, incoming,
    /// key)` resolves shared keys wherever the two sides are not merged
    /// recursively.
    ///
    /// # Errors
    ///
    /// Same as [`merge`](Self::merge), at any depth.
    pub fn merge_deep_with<F>(&self, other: &Self, mut merger: F) -> Result<Self>
    where
        F: FnMut(&Self, &Self, &Self) -> Self,
    {
        self.merge_deep_entries(other, &mut merger)
    }

    /// Merges `other` into the value at `path`. A missing path starts from
    /// an empty map.
    ///
    /// # Errors
    ///
    /// Same as [`merge`](Self::merge) for the target, and
    /// [`set_in`](Self::set_in) for the path.
    pub fn merge_in(&self, path: &[Self], other: &Self) -> Result<Self> {
        let merged = self.value_at_or_empty(path).merge(other)?;
        self.set_in(path, merged)
    }

    /// [`merge_deep`](Self::merge_deep) into the value at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`merge_in`](Self::merge_in).
    pub fn merge_deep_in(&self, path: &[Self], other: &Self) -> Result<Self> {
        let merged = self.value_at_or_empty(path).merge_deep(other)?;
        self.set_in(path, merged)
    }

    fn value_at_or_empty(&self, path: &[Self]) -> Self {
        self.get_in(path)
            .cloned()
            .unwrap_or_else(|| Self::Map(Map::new()))
    }

    fn merge_deep_entries(
        &self,
        other: &Self,
        merger: &mut dyn FnMut(&Self, &Self, &Self) -> Self,
    ) -> Result<Self> {
        self.merge_entries(other, &mut |existing, incoming, key| {
            if existing.accepts_merge() && incoming.size().is_some() {
                existing.merge_deep_entries(incoming, &mut *merger)
            } else {
                Ok(merger(existing, incoming, key))
            }
        })
    }

    const fn accepts_merge(&self) -> bool {
        matches!(
            self,
            Self::List(_)
                | Self::Map(_)
                | Self::OrderedMap(_)
                | Self::Set(_)
                | Self::OrderedSet(_)
                | Self::Record(_)
        )
    }

    fn merge_entries(&self, other: &Self, resolve: &mut Resolver<'_>) -> Result<Self> {
        if !self.accepts_merge() || other.size().is_none() {
            return Err(CollectionError::TypeMismatch {
                left: self.kind_name(),
                right: other.kind_name(),
            });
        }
        let entries = other.merge_source();
        trace!(
            into = self.kind_name(),
            from = other.kind_name(),
            entries = entries.len(),
            "merging values"
        );
        match self {
            Self::Set(set) => Ok(Self::Set(
                entries
                    .into_iter()
                    .fold(set.clone(), |set, (_, member)| set.insert(member)),
            )),
            Self::OrderedSet(set) => Ok(Self::OrderedSet(
                entries
                    .into_iter()
                    .fold(set.clone(), |set, (_, member)| set.insert(member)),
            )),
            _ => entries
                .into_iter()
                .try_fold(self.clone(), |merged, (key, incoming)| {
                    let value = match merged.get(&key) {
                        Some(existing) => resolve(existing, &incoming, &key)?,
                        None => incoming,
                    };
                    merged.with_entry(&key, value)
                }),
        }
    }

    /// `self` read as key/value pairs; a set member is its own key.
    fn merge_source(&self) -> Vec<(Self, Self)> {
        match self {
            Self::List(list) => list
                .iter()
                .enumerate()
                .map(|(index, item)| (Self::from(index), item.clone()))
                .collect(),
            Self::Stack(stack) => stack
                .iter()
                .enumerate()
                .map(|(index, item)| (Self::from(index), item.clone()))
                .collect(),
            Self::Map(map) => map.iter().map(|(key, value)| (key.clone(), value.clone())).collect(),
            Self::OrderedMap(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Self::Set(set) => set.iter().map(|member| (member.clone(), member.clone())).collect(),
            Self::OrderedSet(set) => set
                .iter()
                .map(|member| (member.clone(), member.clone()))
                .collect(),
            Self::Record(record) => record
                .entries()
                .map(|(field, value)| (Self::from(field), value.clone()))
                .collect(),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => Vec::new(),
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

impl Value {
    /// Orders two values of the same scalar kind, or two indexed
    /// collections element by element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::TypeMismatch`] when the kinds differ or
    /// the kind has no natural order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use immutables::{CollectionError, Value};
    ///
    /// assert_eq!(Value::from(1).try_cmp(&Value::from(2)), Ok(Ordering::Less));
    /// assert!(matches!(
    ///     Value::from(1).try_cmp(&Value::from("1")),
    ///     Err(CollectionError::TypeMismatch { .. })
    /// ));
    /// ```
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Ok(Ordering::Equal),
            (Self::Bool(left), Self::Bool(right)) => Ok(left.cmp(right)),
            (Self::Number(left), Self::Number(right)) => Ok(left.cmp(right)),
            (Self::String(left), Self::String(right)) => Ok(left.cmp(right)),
            (Self::List(left), Self::List(right)) => {
                Self::try_cmp_items(left.iter(), right.iter())
            }
            (Self::Stack(left), Self::Stack(right)) => {
                Self::try_cmp_items(left.iter(), right.iter())
            }
            _ => Err(CollectionError::TypeMismatch {
                left: self.kind_name(),
                right: other.kind_name(),
            }),
        }
    }

    fn try_cmp_items<'a, I>(mut left: I, mut right: I) -> Result<Ordering>
    where
        I: Iterator<Item = &'a Self>,
    {
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ok(Ordering::Equal),
                (None, Some(_)) => return Ok(Ordering::Less),
                (Some(_), None) => return Ok(Ordering::Greater),
                (Some(left_item), Some(right_item)) => match left_item.try_cmp(right_item)? {
                    Ordering::Equal => {}
                    unequal => return Ok(unequal),
                },
            }
        }
    }
}

impl Nested for Value {
    fn children(&self) -> Option<Vec<Self>> {
        match self {
            Self::List(list) => Some(list.iter().cloned().collect()),
            Self::Stack(stack) => Some(stack.iter().cloned().collect()),
            Self::Set(set) => Some(set.iter().cloned().collect()),
            Self::OrderedSet(set) => Some(set.iter().cloned().collect()),
            Self::Map(map) => Some(map.values().cloned().collect()),
            Self::OrderedMap(map) => Some(map.values().cloned().collect()),
            Self::Null
            | Self::Bool(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Record(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(formatter, "null"),
            Self::Bool(flag) => write!(formatter, "{flag}"),
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(text) => write!(formatter, "{text:?}"),
            Self::List(list) => write!(formatter, "{list}"),
            Self::Map(map) => write!(formatter, "{map}"),
            Self::OrderedMap(map) => write!(formatter, "{map}"),
            Self::Set(set) => write!(formatter, "{set}"),
            Self::OrderedSet(set) => write!(formatter, "{set}"),
            Self::Stack(stack) => write!(formatter, "{stack}"),
            Self::Record(record) => write!(formatter, "{record}"),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_number!(f64, i32, u32, i64, usize);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! impl_from_collection {
    ($($variant:ident($collection:ty)),*) => {
        $(
            impl From<$collection> for Value {
                fn from(value: $collection) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_collection!(
    List(List<Value>),
    Map(Map<Value, Value>),
    OrderedMap(OrderedMap<Value, Value>),
    Set(Set<Value>),
    OrderedSet(OrderedSet<Value>),
    Stack(Stack<Value>),
    Record(Record)
);

impl FromIterator<Self> for Value {
    /// Collects into a `Value::List`.
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl FromIterator<(Self, Self)> for Value {
    /// Collects into a `Value::Map`.
    fn from_iter<I: IntoIterator<Item = (Self, Self)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}
