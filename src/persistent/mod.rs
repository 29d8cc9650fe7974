//! Persistent collections with structural sharing.
//!
//! - [`List`]: indexed sequence on a 32-way vector trie with a tail leaf
//! - [`Stack`]: LIFO stack, read from the back of a [`List`]
//! - [`Map`]: hash array mapped trie
//! - [`Set`]: hash set over [`Map`]
//! - [`OrderedMap`]: [`Map`] that iterates in insertion order
//! - [`OrderedSet`]: [`Set`] that iterates in insertion order
//!
//! Every write returns a new collection and leaves the receiver untouched.
//! Untouched subtrees are shared between versions through
//! reference-counted nodes.
//!
//! # Transients
//!
//! Each collection can open a transient view with `as_mutable` or run a
//! batch through `with_mutations`. Nodes created during a batch are
//! stamped with the batch's [`OwnerId`] and edited in place on later
//! writes; nodes from any other version are copied first.
//!
//! ```rust
//! use immutables::List;
//!
//! let base: List<i32> = (0..100).collect();
//! let edited = base.with_mutations(|list| {
//!     for index in 0..10 {
//!         list.set(index, -1).unwrap();
//!     }
//! });
//! assert_eq!(base.get(0), Some(&0));
//! assert_eq!(edited.get(0), Some(&-1));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted pointer used for trie nodes.
///
/// With the `arc` feature this is `std::sync::Arc`, so persistent
/// collections can cross threads. Otherwise it is `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

pub(crate) mod hashing;
pub(crate) mod owner;

pub mod list;
pub mod map;
pub mod ordered_map;
pub mod ordered_set;
pub mod set;
pub mod stack;

pub use list::{List, TransientList};
pub use map::{Map, TransientMap};
pub use ordered_map::{OrderedMap, TransientOrderedMap};
pub use ordered_set::{OrderedSet, TransientOrderedSet};
pub use owner::OwnerId;
pub use set::{Set, TransientSet};
pub use stack::{Stack, TransientStack};

// =============================================================================
// Tests
// =============================================================================
