//! Fixed-shape records with default values.
//!
//! A [`RecordType`] declares a name and an ordered set of fields with
//! defaults. Every [`Record`] created from it holds exactly those fields;
//! reading or writing any other field fails with
//! [`CollectionError::UnknownField`].
//!
//! ```rust
//! use immutables::{RecordType, Value};
//!
//! let point = RecordType::new("Point", [("x", Value::from(0)), ("y", Value::from(0))]);
//! let origin = point.defaults();
//! let moved = origin.set("x", Value::from(4)).unwrap();
//!
//! assert_eq!(moved.get("x"), Some(&Value::from(4)));
//! assert_eq!(origin.get("x"), Some(&Value::from(0)));
//! assert!(moved.set("z", Value::Null).is_err());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CollectionError, Result};
use crate::persistent::{List, Map, OrderedMap, ReferenceCounter};
use crate::value::Value;

struct Shape {
    name: String,
    fields: Vec<String>,
    index: Map<String, usize>,
    defaults: List<Value>,
}

// =============================================================================
// RecordType
// =============================================================================

/// The declared shape of a family of records.
#[derive(Clone)]
pub struct RecordType {
    shape: ReferenceCounter<Shape>,
}

impl RecordType {
    /// Declares a record type. A repeated field name keeps its first
    /// position and its last default.
    pub fn new<N, I, S>(name: N, defaults: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        let mut index: Map<String, usize> = Map::new();
        let mut values: Vec<Value> = Vec::new();
        for (field, default) in defaults {
            let field = field.into();
            if let Some(&position) = index.get(&field) {
                values[position] = default;
            } else {
                index = index.insert(field.clone(), fields.len());
                fields.push(field);
                values.push(default);
            }
        }
        Self {
            shape: ReferenceCounter::new(Shape {
                name: name.into(),
                fields,
                index,
                defaults: List::from(values),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shape.name
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.shape.fields.iter().map(String::as_str)
    }

    /// A record holding every default.
    pub fn defaults(&self) -> Record {
        Record {
            shape: ReferenceCounter::clone(&self.shape),
            values: self.shape.defaults.clone(),
        }
    }

    /// Creates a record from `values`, with defaults for omitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownField`] for a field the type does
    /// not declare.
    pub fn create<I, S>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut record = self.defaults();
        let mut transient = record.values.as_mutable();
        for (field, value) in values {
            let position = record.position(field.as_ref())?;
            transient.set(position, value)?;
        }
        record.values = transient.as_immutable();
        Ok(record)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RecordType")
            .field("name", &self.shape.name)
            .field("fields", &self.shape.fields)
            .finish()
    }
}

// =============================================================================
// Record
// =============================================================================

/// An instance of a [`RecordType`].
///
/// Two records are equal when they share a type (by identity, or by name
/// and field list) and hold equal values.
#[derive(Clone)]
pub struct Record {
    shape: ReferenceCounter<Shape>,
    values: List<Value>,
}

impl Record {
    fn position(&self, field: &str) -> Result<usize> {
        self.shape
            .index
            .get(field)
            .copied()
            .ok_or_else(|| CollectionError::UnknownField {
                record: self.shape.name.clone(),
                field: field.to_owned(),
            })
    }

    /// The record type's name.
    pub fn name(&self) -> &str {
        &self.shape.name
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.shape.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.shape.fields.iter().map(String::as_str)
    }

    /// Returns `true` if the type declares `field`.
    pub fn has(&self, field: &str) -> bool {
        self.shape.index.contains_key(field)
    }

    /// The value of `field`, or `None` for an undeclared field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(*self.shape.index.get(field)?)
    }

    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownField`] for an undeclared field.
    pub fn try_get(&self, field: &str) -> Result<&Value> {
        let position = self.position(field)?;
        self.values.try_get(position)
    }

    /// Returns a record with `field` set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownField`] for an undeclared field.
    pub fn set(&self, field: &str, value: Value) -> Result<Self> {
        let position = self.position(field)?;
        Ok(Self {
            shape: ReferenceCounter::clone(&self.shape),
            values: self.values.set(position, value)?,
        })
    }

    /// Returns a record with `field` replaced by `updater(current)`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownField`] for an undeclared field.
    pub fn update<F>(&self, field: &str, updater: F) -> Result<Self>
    where
        F: FnOnce(&Value) -> Value,
    {
        let position = self.position(field)?;
        Ok(Self {
            shape: ReferenceCounter::clone(&self.shape),
            values: self.values.update(position, updater)?,
        })
    }

    /// Returns a record with `field` reset to its default.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownField`] for an undeclared field.
    pub fn remove(&self, field: &str) -> Result<Self> {
        let position = self.position(field)?;
        let default = self.shape.defaults.try_get(position)?.clone();
        self.set(field, default)
    }

    /// Returns a record with every field at its default.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self {
            shape: ReferenceCounter::clone(&self.shape),
            values: self.shape.defaults.clone(),
        }
    }

    /// Fields and values in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields().zip(self.values.iter())
    }

    pub fn to_ordered_map(&self) -> OrderedMap<String, Value> {
        self.entries()
            .map(|(field, value)| (field.to_owned(), value.clone()))
            .collect()
    }

    fn same_type(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.shape, &other.shape)
            || (self.shape.name == other.shape.name && self.shape.fields == other.shape.fields)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.same_type(other) && self.values == other.values
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape.name.hash(state);
        self.values.hash(state);
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = formatter.debug_struct(&self.shape.name);
        for (field, value) in self.entries() {
            output.field(field, value);
        }
        output.finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {{", self.shape.name)?;
        for (position, (field, value)) in self.entries().enumerate() {
            if position > 0 {
                write!(formatter, ",")?;
            }
            write!(formatter, " {field}: {value}")?;
        }
        write!(formatter, " }}")
    }
}
