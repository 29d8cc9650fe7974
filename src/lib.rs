//! # immutables
//!
//! Persistent immutable collections with structural sharing.
//!
//! ## Overview
//!
//! Every write returns a new collection and leaves the receiver untouched;
//! unchanged subtrees are shared between versions.
//!
//! - **Indexed**: [`List`] (32-way vector trie) and [`Stack`]
//! - **Keyed**: [`Map`] (hash array mapped trie) and [`OrderedMap`]
//! - **Sets**: [`Set`] and [`OrderedSet`]
//! - **Lazy sequences**: [`Seq`] and [`KeyedSeq`], with [`range`] and
//!   [`repeat`] sources
//! - **Transients**: `as_mutable` / `with_mutations` for batched edits
//! - **Dynamic data**: [`Value`], [`Record`] and, with the `json`
//!   feature, deep JSON conversion in [`convert`]
//!
//! ## Feature Flags
//!
//! - `arc`: share trie nodes through `Arc` so collections are `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` for every collection
//! - `json` (default): the [`convert`] module
//! - `fxhash` / `ahash`: alternative hashers for map and set keys
//!
//! ## Example
//!
//! ```rust
//! use immutables::prelude::*;
//!
//! let list = List::from([1, 2, 3]);
//! let edited = list.set(1, 99).unwrap();
//! assert_eq!(edited.to_vec(), vec![1, 99, 3]);
//! assert_eq!(list.to_vec(), vec![1, 2, 3]);
//!
//! let squares = range(0, 5).map(|x| x * x).to_vec();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16]);
//!
//! let common = Set::from([1, 2, 3]).intersect(&Set::from([2, 3, 4]));
//! assert_eq!(common, Set::from([2, 3]));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collection types and the capability traits.
///
/// ```rust
/// use immutables::prelude::*;
///
/// let evens = List::from([1, 2, 3, 4]).filter(|x| x % 2 == 0);
/// assert_eq!(evens, List::from([2, 4]));
/// ```
pub mod prelude {
    pub use crate::collection::{
        Collection, IndexedCollection, KeyedCollection, SetCollection,
    };
    pub use crate::persistent::*;
    pub use crate::seq::{KeyedSeq, Seq, range, range_by, range_from, repeat, repeat_n};
    pub use crate::value::Value;
}

pub mod collection;
pub mod equality;
pub mod error;
pub mod persistent;
pub mod record;
pub mod seq;
pub mod value;

#[cfg(feature = "json")]
pub mod convert;

pub use collection::{Collection, IndexedCollection, KeyedCollection, SetCollection};
pub use equality::{hash_code, is};
pub use error::{CollectionError, Result};
pub use persistent::{
    List, Map, OrderedMap, OrderedSet, OwnerId, Set, Stack, TransientList, TransientMap,
    TransientOrderedMap, TransientOrderedSet, TransientSet, TransientStack,
};
pub use record::{Record, RecordType};
pub use seq::{KeyedSeq, Nested, Seq, SeqKind, range, range_by, range_from, repeat, repeat_n};
pub use value::{Number, Value};

#[cfg(feature = "json")]
pub use convert::{Revived, from_js, from_js_with};
