//! Integration tests for OrderedMap and OrderedSet.

use immutables::{Map, OrderedMap, OrderedSet};
use rstest::rstest;

fn keys<V: Clone>(map: &OrderedMap<&'static str, V>) -> Vec<&'static str> {
    map.keys().copied().collect()
}

// =============================================================================
// Insertion order
// =============================================================================

#[rstest]
fn test_iterates_in_insertion_order() {
    let map = OrderedMap::new().insert("z", 1).insert("a", 2).insert("m", 3);
    assert_eq!(keys(&map), vec!["z", "a", "m"]);
    assert_eq!(map.first(), Some((&"z", &1)));
    assert_eq!(map.last(), Some((&"m", &3)));
}

#[rstest]
fn test_updating_value_keeps_position() {
    let map = OrderedMap::from([("x", 1), ("y", 2)]).insert("x", 10);
    assert_eq!(keys(&map), vec!["x", "y"]);
    assert_eq!(map.get("x"), Some(&10));
}

#[rstest]
fn test_remove_then_reinsert_moves_key_to_end() {
    let map = OrderedMap::new()
        .insert("x", 1)
        .insert("y", 2)
        .remove("x")
        .insert("x", 3);
    assert_eq!(keys(&map), vec!["y", "x"]);
}

#[rstest]
fn test_position_of_skips_holes() {
    let map = OrderedMap::from([("a", 1), ("b", 2), ("c", 3)]).remove("a");
    assert_eq!(map.position_of("c"), Some(1));
    assert_eq!(map.position_of("a"), None);
}

#[rstest]
fn test_heavy_churn_keeps_order_and_size() {
    let mut map: OrderedMap<i32, i32> = (0..300).map(|key| (key, key)).collect();
    for key in 0..250 {
        map = map.remove(&key);
    }
    assert_eq!(map.len(), 50);
    let remaining: Vec<i32> = map.keys().copied().collect();
    assert_eq!(remaining, (250..300).collect::<Vec<_>>());
    let extended = map.insert(0, 0);
    assert_eq!(extended.last(), Some((&0, &0)));
}

#[rstest]
fn test_removing_everything_empties_map() {
    let map = OrderedMap::from([("a", 1)]).remove("a");
    assert!(map.is_empty());
    assert_eq!(map.first(), None);
    assert_eq!(map.insert("b", 2).first(), Some((&"b", &2)));
}

// =============================================================================
// Bulk operations
// =============================================================================

#[rstest]
fn test_merge_appends_new_keys_in_argument_order() {
    let merged =
        OrderedMap::from([("a", 1), ("b", 2)]).merge(&OrderedMap::from([("c", 3), ("a", 9)]));
    assert_eq!(keys(&merged), vec!["a", "b", "c"]);
    assert_eq!(merged.get("a"), Some(&9));
}

#[rstest]
fn test_filter_map_and_reverse_keep_order() {
    let map = OrderedMap::from([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    let odd = map.filter(|value, _| value % 2 == 1);
    assert_eq!(keys(&odd), vec!["a", "c"]);
    let doubled = map.map(|value, _| value * 2);
    assert_eq!(doubled.values().copied().collect::<Vec<_>>(), vec![2, 4, 6, 8]);
    assert_eq!(keys(&map.reverse()), vec!["d", "c", "b", "a"]);
}

#[rstest]
fn test_sort_by_value_and_key() {
    let map = OrderedMap::from([("b", 3), ("c", 1), ("a", 2)]);
    assert_eq!(keys(&map.sort()), vec!["c", "a", "b"]);
    assert_eq!(
        keys(&map.sort_by(|(left, _), (right, _)| left.cmp(right))),
        vec!["a", "b", "c"]
    );
}

#[rstest]
fn test_equality_is_order_sensitive() {
    let forward = OrderedMap::from([("a", 1), ("b", 2)]);
    let backward = OrderedMap::from([("b", 2), ("a", 1)]);
    assert_ne!(forward, backward);
    assert_eq!(forward.to_map(), backward.to_map());
    assert_eq!(forward.to_map(), Map::from([("a", 1), ("b", 2)]));
}

#[rstest]
fn test_display_follows_order() {
    let map = OrderedMap::from([("b", 2), ("a", 1)]);
    assert_eq!(map.to_string(), "OrderedMap {b: 2, a: 1}");
}

// =============================================================================
// OrderedSet
// =============================================================================

#[rstest]
fn test_ordered_set_keeps_first_insertion_order() {
    let set = OrderedSet::from([3, 1, 3, 2]);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
    assert_eq!(set.first(), Some(&3));
    assert_eq!(set.last(), Some(&2));
}

#[rstest]
fn test_ordered_set_union_appends_new_members() {
    let union = OrderedSet::from([1, 2]).union(&OrderedSet::from([3, 1]));
    assert_eq!(union.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[rstest]
fn test_ordered_set_intersect_and_subtract_keep_self_order() {
    let set = OrderedSet::from([4, 3, 2, 1]);
    let other = OrderedSet::from([1, 3]);
    assert_eq!(set.intersect(&other).iter().copied().collect::<Vec<_>>(), vec![3, 1]);
    assert_eq!(set.subtract(&other).iter().copied().collect::<Vec<_>>(), vec![4, 2]);
}

#[rstest]
fn test_ordered_set_remove_and_reinsert_moves_to_end() {
    let set = OrderedSet::from(["x", "y"]).remove("x").insert("x");
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["y", "x"]);
}

#[rstest]
fn test_ordered_set_to_set_forgets_order() {
    let left = OrderedSet::from([1, 2]);
    let right = OrderedSet::from([2, 1]);
    assert_ne!(left, right);
    assert_eq!(left.to_set(), right.to_set());
}
