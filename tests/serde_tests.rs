#![cfg(feature = "serde")]

//! Integration tests for serde support.

use immutables::{List, Map, OrderedMap, OrderedSet, Set, Stack};
use rstest::rstest;

// =============================================================================
// Indexed collections
// =============================================================================

#[rstest]
fn test_list_json_roundtrip() {
    let list: List<i32> = (1..=40).collect();
    let json = serde_json::to_string(&list).unwrap();
    let restored: List<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(list, restored);
}

#[rstest]
fn test_list_serializes_as_array() {
    let list = List::from(["a", "b"]);
    assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a","b"]"#);
}

#[rstest]
fn test_stack_roundtrip_keeps_top() {
    let stack = Stack::from([3, 2, 1]);
    let json = serde_json::to_string(&stack).unwrap();
    assert_eq!(json, "[3,2,1]");
    let restored: Stack<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.peek(), Some(&3));
    assert_eq!(restored, stack);
}

// =============================================================================
// Keyed collections
// =============================================================================

#[rstest]
fn test_map_json_roundtrip() {
    let map = Map::from([("one".to_string(), 1), ("two".to_string(), 2)]);
    let json = serde_json::to_string(&map).unwrap();
    let restored: Map<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
}

#[rstest]
fn test_ordered_map_keeps_document_order() {
    let restored: OrderedMap<String, i32> =
        serde_json::from_str(r#"{"z": 1, "m": 2, "a": 3}"#).unwrap();
    let keys: Vec<&str> = restored.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "m", "a"]);
    assert_eq!(
        serde_json::to_string(&restored).unwrap(),
        r#"{"z":1,"m":2,"a":3}"#
    );
}

#[rstest]
fn test_nested_collections_roundtrip() {
    let nested = Map::from([("primes".to_string(), List::from([2, 3, 5]))]);
    let json = serde_json::to_string(&nested).unwrap();
    let restored: Map<String, List<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(nested, restored);
}

// =============================================================================
// Sets
// =============================================================================

#[rstest]
fn test_set_serializes_as_array() {
    let set = Set::from([7]);
    assert_eq!(serde_json::to_string(&set).unwrap(), "[7]");
    let restored: Set<i32> = serde_json::from_str("[1, 2, 2, 3]").unwrap();
    assert_eq!(restored, Set::from([1, 2, 3]));
}

#[rstest]
fn test_ordered_set_roundtrip_keeps_order() {
    let set = OrderedSet::from([5, 1, 3]);
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, "[5,1,3]");
    let restored: OrderedSet<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, set);
}

#[rstest]
fn test_wrong_shape_is_rejected() {
    assert!(serde_json::from_str::<List<i32>>(r#"{"a": 1}"#).is_err());
    assert!(serde_json::from_str::<Map<String, i32>>("[1, 2]").is_err());
}
