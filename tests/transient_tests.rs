//! Integration tests for transient batch mutation.

use immutables::{CollectionError, List, Map, OrderedMap, OrderedSet, Set, Stack};
use rstest::rstest;
use static_assertions::assert_not_impl_any;
use tracing_subscriber::EnvFilter;

assert_not_impl_any!(immutables::TransientList<i32>: Send, Sync, Clone);
assert_not_impl_any!(immutables::TransientMap<i32, i32>: Send, Sync, Clone);
assert_not_impl_any!(immutables::TransientSet<i32>: Send, Sync, Clone);
assert_not_impl_any!(immutables::TransientOrderedMap<i32, i32>: Send, Sync, Clone);
assert_not_impl_any!(immutables::TransientOrderedSet<i32>: Send, Sync, Clone);
assert_not_impl_any!(immutables::TransientStack<i32>: Send, Sync, Clone);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("immutables=trace"))
        .with_test_writer()
        .try_init();
}

// =============================================================================
// List
// =============================================================================

#[rstest]
fn test_list_batch_matches_persistent_result() {
    let base: List<i32> = (0..100).collect();
    let batched = base.with_mutations(|list| {
        for index in 0..100 {
            list.set(index, index as i32 * 2).unwrap();
        }
        list.push(-1);
    });
    let persistent = (0..100)
        .fold(base.clone(), |acc, index| acc.set(index, index as i32 * 2).unwrap())
        .push(-1);
    assert_eq!(batched, persistent);
    assert_eq!(base, (0..100).collect::<List<i32>>());
}

#[rstest]
fn test_list_transient_is_isolated_from_source() {
    let base = List::from([1, 2, 3]);
    let mut transient = base.as_mutable();
    transient.set(0, 10).unwrap().push(4).unshift(0);
    assert_eq!(transient.len(), 5);
    assert_eq!(transient.get(1), Some(&10));
    let frozen = transient.as_immutable();
    assert_eq!(frozen.to_vec(), vec![0, 10, 2, 3, 4]);
    assert_eq!(base.to_vec(), vec![1, 2, 3]);
}

#[rstest]
fn test_list_frozen_result_is_not_edited_by_later_batches() {
    let first = List::from([1, 2, 3]).with_mutations(|list| {
        list.push(4);
    });
    let second = first.with_mutations(|list| {
        list.set(0, 100).unwrap();
    });
    assert_eq!(first.to_vec(), vec![1, 2, 3, 4]);
    assert_eq!(second.to_vec(), vec![100, 2, 3, 4]);
}

#[rstest]
fn test_list_transient_errors_do_not_publish() {
    let base = List::from([1, 2]);
    let result: Result<List<i32>, CollectionError> = base.try_with_mutations(|list| {
        list.push(3);
        list.set(10, 0)?;
        Ok(())
    });
    assert_eq!(
        result,
        Err(CollectionError::OutOfRange { index: 10, size: 3 })
    );
    assert_eq!(base.to_vec(), vec![1, 2]);
}

#[rstest]
fn test_list_transient_structural_edits() {
    let list = List::from([1, 2, 3, 4]).with_mutations(|list| {
        list.insert(1, 9).unwrap();
        list.remove(0).unwrap();
        list.pop().shift();
        list.resize(4, 0);
    });
    assert_eq!(list.to_vec(), vec![2, 3, 0, 0]);
}

// =============================================================================
// Map and Set
// =============================================================================

#[rstest]
fn test_map_batch_insert_and_remove() {
    let base = Map::from([("keep", 1), ("drop", 2)]);
    let batched = base.with_mutations(|map| {
        map.insert("new", 3).remove("drop").update("keep", 0, |x| x + 10);
    });
    assert_eq!(batched, Map::from([("keep", 11), ("new", 3)]));
    assert_eq!(base.len(), 2);
    assert_eq!(base.get("drop"), Some(&2));
}

#[rstest]
fn test_map_transient_over_large_map() {
    let base: Map<u32, u32> = (0..2000).map(|key| (key, key)).collect();
    let mut transient = base.as_mutable();
    for key in 0..2000 {
        transient.update(key, 0, |value| value + 1);
    }
    let bumped = transient.as_immutable();
    assert!(bumped.iter().all(|(key, value)| *value == key + 1));
    assert!(base.iter().all(|(key, value)| value == key));
}

#[rstest]
fn test_set_transient() {
    let base = Set::from([1, 2]);
    let mut transient = base.as_mutable();
    transient.insert(3).remove(&1);
    assert!(transient.contains(&3));
    assert_eq!(transient.as_immutable(), Set::from([2, 3]));
    assert_eq!(base, Set::from([1, 2]));
}

// =============================================================================
// Ordered variants and Stack
// =============================================================================

#[rstest]
fn test_ordered_map_transient_keeps_order() {
    let map = OrderedMap::from([("a", 1)]).with_mutations(|map| {
        map.insert("b", 2).insert("c", 3).remove("a").insert("a", 4);
    });
    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, vec!["b", "c", "a"]);
}

#[rstest]
fn test_ordered_set_transient() {
    let set = OrderedSet::from([3]).with_mutations(|set| {
        set.insert(1).insert(2).remove(&3);
    });
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[rstest]
fn test_stack_transient() {
    let base = Stack::from([1]);
    let mut transient = base.as_mutable();
    transient.push_all([3, 2]);
    assert_eq!(transient.peek(), Some(&3));
    let frozen = transient.as_immutable();
    assert_eq!(frozen.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    assert_eq!(base.len(), 1);
}

#[rstest]
fn test_clear_inside_batch() {
    let map = Map::from([(1, 1)]).with_mutations(|map| {
        map.clear().insert(2, 2);
    });
    assert_eq!(map, Map::from([(2, 2)]));
}

#[rstest]
fn test_batches_and_compaction_under_subscriber() {
    init_tracing();
    let churned = (0..200).fold(OrderedMap::new(), |map, key| {
        map.insert(key, key).remove(&(key - 1))
    });
    assert_eq!(churned.len(), 1);
    assert_eq!(churned.keys().copied().collect::<Vec<_>>(), vec![199]);
    let batched = churned.with_mutations(|map| {
        map.insert(200, 200);
    });
    assert_eq!(batched.keys().copied().collect::<Vec<_>>(), vec![199, 200]);
}
