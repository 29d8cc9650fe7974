//! Integration tests for Map.

use std::hash::{Hash, Hasher};

use immutables::{CollectionError, Map};
use rstest::rstest;

/// A key whose hash ignores its payload, forcing full-hash collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Colliding(u32);

impl Hash for Colliding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        0_u8.hash(state);
    }
}

fn letters() -> Map<&'static str, i32> {
    Map::from([("a", 1), ("b", 2)])
}

// =============================================================================
// Reads
// =============================================================================

#[rstest]
fn test_empty_map() {
    let map: Map<String, i32> = Map::new();
    assert!(map.is_empty());
    assert_eq!(map.get("missing"), None);
}

#[rstest]
fn test_get_variants() {
    let map = letters();
    assert_eq!(map.get("a"), Some(&1));
    assert_eq!(*map.get_or("z", &0), 0);
    assert_eq!(map.get_key_value("b"), Some((&"b", &2)));
    assert_eq!(
        map.try_get("z"),
        Err(CollectionError::KeyNotFound {
            key: "\"z\"".to_string()
        })
    );
}

#[rstest]
fn test_borrowed_lookup_on_string_keys() {
    let map = Map::new().insert("alpha".to_string(), 1);
    assert_eq!(map.get("alpha"), Some(&1));
    assert!(map.contains_key("alpha"));
}

// =============================================================================
// Writes
// =============================================================================

#[rstest]
fn test_insert_new_key_grows_map() {
    let map = letters();
    let extended = map.insert("c", 3);
    assert_eq!(extended.len(), 3);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("c"), None);
}

#[rstest]
fn test_insert_existing_key_replaces_value() {
    let map = letters().insert("a", 10);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a"), Some(&10));
}

#[rstest]
fn test_remove() {
    let map = letters();
    assert_eq!(map.remove("a").len(), 1);
    assert_eq!(map.remove("zzz"), map);
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_many_inserts_and_removes() {
    let map: Map<i32, i32> = (0..5000).map(|key| (key, key * 2)).collect();
    assert_eq!(map.len(), 5000);
    for key in (0..5000).step_by(97) {
        assert_eq!(map.get(&key), Some(&(key * 2)));
    }
    let evens = (0..5000).filter(|key| key % 2 == 1).fold(map.clone(), |acc, key| acc.remove(&key));
    assert_eq!(evens.len(), 2500);
    assert!(evens.keys().all(|key| key % 2 == 0));
}

#[rstest]
fn test_hash_collisions_are_kept_apart() {
    let map: Map<Colliding, &str> = Map::new()
        .insert(Colliding(1), "one")
        .insert(Colliding(2), "two")
        .insert(Colliding(3), "three");
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&Colliding(2)), Some(&"two"));
    let removed = map.remove(&Colliding(1)).remove(&Colliding(3));
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get(&Colliding(2)), Some(&"two"));
    assert_eq!(removed.get(&Colliding(1)), None);
}

#[rstest]
fn test_update_and_update_with() {
    let map = letters();
    assert_eq!(map.update("a", 0, |x| x + 5).get("a"), Some(&6));
    assert_eq!(map.update("n", 100, |x| x + 1).get("n"), Some(&101));
    assert_eq!(map.update_with("a", |_| None).get("a"), None);
    assert_eq!(
        map.update_with("b", |current| current.map(|x| x * 3)).get("b"),
        Some(&6)
    );
}

// =============================================================================
// Bulk operations
// =============================================================================

#[rstest]
fn test_merge_prefers_other() {
    let merged = letters().merge(&Map::from([("b", 20), ("c", 30)]));
    assert_eq!(merged, Map::from([("a", 1), ("b", 20), ("c", 30)]));
}

#[rstest]
fn test_merge_with_combines_conflicts() {
    let merged = letters().merge_with(&Map::from([("b", 20)]), |old, new, _| old + new);
    assert_eq!(merged.get("b"), Some(&22));
}

#[rstest]
fn test_union_prefers_self() {
    let unioned = letters().union(&Map::from([("a", 100), ("z", 26)]));
    assert_eq!(unioned.get("a"), Some(&1));
    assert_eq!(unioned.get("z"), Some(&26));
}

#[rstest]
fn test_intersect_and_subtract() {
    let other = Map::from([("b", "x"), ("q", "y")]);
    assert_eq!(letters().intersect(&other), Map::from([("b", 2)]));
    assert_eq!(letters().subtract(&other), Map::from([("a", 1)]));
}

#[rstest]
fn test_map_flip_and_map_keys() {
    let map = letters();
    assert_eq!(map.map(|value, _| value * 10).get("b"), Some(&20));
    assert_eq!(map.flip().get(&1), Some(&"a"));
    let upper = map.map_keys(|key, _| key.to_uppercase());
    assert_eq!(upper.get("A"), Some(&1));
    let swapped = map.map_entries(|key, value| (*value, key.len()));
    assert_eq!(swapped.get(&2), Some(&1));
}

// =============================================================================
// Equality, hashing and formatting
// =============================================================================

#[rstest]
fn test_equality_ignores_insertion_order() {
    let forward: Map<i32, i32> = (0..200).map(|key| (key, key)).collect();
    let backward: Map<i32, i32> = (0..200).rev().map(|key| (key, key)).collect();
    assert_eq!(forward, backward);
    assert_eq!(immutables::hash_code(&forward), immutables::hash_code(&backward));
}

#[rstest]
fn test_maps_can_be_keys() {
    let outer = Map::new().insert(letters(), "letters");
    assert_eq!(outer.get(&Map::from([("b", 2), ("a", 1)])), Some(&"letters"));
}

#[rstest]
fn test_display_of_single_entry() {
    assert_eq!(Map::from([("k", 1)]).to_string(), "Map {k: 1}");
}
