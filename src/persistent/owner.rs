//! Owner stamps for transient batches.
//!
//! Every trie node records the [`OwnerId`] of the transient batch that
//! created it, or `None` once it has only ever been built persistently.
//! A write carrying an [`Edit`] mutates a node in place only when the stamp
//! matches; any other node is copied first and the copy is stamped.
//! Owner ids come from a process-wide counter and are never reissued, so a
//! frozen collection can never again match the stamp of a live batch.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use super::ReferenceCounter;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of one transient batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(NonZeroU64);

impl OwnerId {
    /// Allocates a fresh owner id.
    pub(crate) fn fresh() -> Self {
        let raw = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and a u64 does not wrap in practice.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Returns the raw id, used for log fields.
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// The owner a write is performed on behalf of. `None` means a plain
/// persistent write.
pub(crate) type Edit = Option<OwnerId>;

/// A trie node that carries an owner stamp.
pub(crate) trait Owned: Clone {
    fn owner(&self) -> Edit;
    fn set_owner(&mut self, owner: Edit);
}

/// Returns a mutable reference to `node`, copying it first unless it is
/// stamped with `edit` and held exclusively.
///
/// With `edit == None` this is plain path copying: a shared node is cloned,
/// a node created during the current operation is reused. With an owner,
/// nodes from other batches are copied once and stamped; `make_mut` still
/// clones a stamped node that turns out to be aliased.
pub(crate) fn make_editable<N: Owned>(node: &mut ReferenceCounter<N>, edit: Edit) -> &mut N {
    if edit.is_some() && node.owner() != edit {
        let mut copy = N::clone(node);
        copy.set_owner(edit);
        *node = ReferenceCounter::new(copy);
    }
    ReferenceCounter::make_mut(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, Debug, PartialEq)]
    struct Cell {
        owner: Edit,
        value: i32,
    }

    impl Owned for Cell {
        fn owner(&self) -> Edit {
            self.owner
        }

        fn set_owner(&mut self, owner: Edit) {
            self.owner = owner;
        }
    }

    #[rstest]
    fn test_fresh_owner_ids_are_distinct() {
        let first = OwnerId::fresh();
        let second = OwnerId::fresh();
        assert_ne!(first, second);
        assert!(second.get() > first.get());
    }

    #[rstest]
    fn test_persistent_edit_copies_shared_node() {
        let original = ReferenceCounter::new(Cell {
            owner: None,
            value: 1,
        });
        let mut edited = original.clone();
        make_editable(&mut edited, None).value = 2;

        assert_eq!(original.value, 1);
        assert_eq!(edited.value, 2);
        assert!(!ReferenceCounter::ptr_eq(&original, &edited));
    }

    #[rstest]
    fn test_owned_edit_reuses_stamped_node() {
        let owner = OwnerId::fresh();
        let mut node = ReferenceCounter::new(Cell {
            owner: Some(owner),
            value: 1,
        });
        let before = ReferenceCounter::as_ptr(&node);
        make_editable(&mut node, Some(owner)).value = 5;

        assert_eq!(ReferenceCounter::as_ptr(&node), before);
        assert_eq!(node.value, 5);
    }

    #[rstest]
    fn test_owned_edit_copies_node_from_other_batch() {
        let stale = OwnerId::fresh();
        let current = OwnerId::fresh();
        let published = ReferenceCounter::new(Cell {
            owner: Some(stale),
            value: 1,
        });
        let mut node = published.clone();
        make_editable(&mut node, Some(current)).value = 9;

        assert_eq!(published.value, 1);
        assert_eq!(published.owner, Some(stale));
        assert_eq!(node.owner, Some(current));
        assert_eq!(node.value, 9);
    }

    #[rstest]
    fn test_aliased_stamped_node_fails_closed() {
        let owner = OwnerId::fresh();
        let published = ReferenceCounter::new(Cell {
            owner: Some(owner),
            value: 1,
        });
        let mut alias = published.clone();
        make_editable(&mut alias, Some(owner)).value = 3;

        assert_eq!(published.value, 1);
        assert_eq!(alias.value, 3);
    }
}
