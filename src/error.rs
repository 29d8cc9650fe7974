//! Error types for collection operations.
//!
//! Lookups report absence with `Option` (the "not set" sentinel). The
//! variants here are raised only when a caller asks for a hard failure
//! (`try_get`), violates an explicit bound on a mutating operation, touches
//! a field outside a [`Record`](crate::record::Record) shape, or combines
//! values of incompatible kinds.

use thiserror::Error;

/// Errors raised by persistent collections, records and dynamic values.
///
/// # Examples
///
/// ```rust
/// use immutables::{CollectionError, List};
///
/// let list = List::from([1, 2, 3]);
/// assert_eq!(
///     list.set(7, 0),
///     Err(CollectionError::OutOfRange { index: 7, size: 3 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// An index fell outside the valid range of an indexed collection.
    #[error("index {index} is out of range for a collection of size {size}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The size of the collection at the time of the call.
        size: usize,
    },

    /// A keyed lookup required a value but the key was absent.
    #[error("key {key} was not found")]
    KeyNotFound {
        /// Debug rendering of the missing key.
        key: String,
    },

    /// A record was accessed through a field it does not declare.
    #[error("record {record} has no field named {field:?}")]
    UnknownField {
        /// The record type name.
        record: String,
        /// The undeclared field name.
        field: String,
    },

    /// Values of incompatible kinds met in a comparison or a key path.
    #[error("type mismatch between {left} and {right}")]
    TypeMismatch {
        /// Kind of the left-hand operand.
        left: &'static str,
        /// Kind of the right-hand operand.
        right: &'static str,
    },
}

impl CollectionError {
    pub(crate) fn key_not_found<K: std::fmt::Debug + ?Sized>(key: &K) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }
}

/// Shorthand for results carrying a [`CollectionError`].
pub type Result<T> = std::result::Result<T, CollectionError>;
