//! Integration tests for dynamic values and records.

use std::cmp::Ordering;

use immutables::{
    CollectionError, List, Map, OrderedMap, OrderedSet, RecordType, Seq, Set, Value,
};
use rstest::{fixture, rstest};

fn text(value: &str) -> Value {
    Value::from(value)
}

#[fixture]
fn user_type() -> RecordType {
    RecordType::new(
        "User",
        [("name", text("")), ("age", Value::from(0)), ("tags", Value::List(List::new()))],
    )
}

#[fixture]
fn document(user_type: RecordType) -> Value {
    let ann = user_type
        .create([("name", text("ann")), ("age", Value::from(31))])
        .unwrap();
    Value::Map(Map::from([
        (text("users"), Value::List(List::from([Value::Record(ann)]))),
        (text("version"), Value::from(2)),
    ]))
}

// =============================================================================
// Key paths
// =============================================================================

#[rstest]
fn test_get_in_through_list_and_record(document: Value) {
    let path = [text("users"), Value::from(0), text("name")];
    assert_eq!(document.get_in(&path), Some(&text("ann")));
    assert!(document.has_in(&path));
    assert!(!document.has_in(&[text("users"), Value::from(1)]));
}

#[rstest]
fn test_lookups_outlive_temporary_keys(document: Value) {
    let version = document.get(&text("version"));
    let name = document.get_in(&[text("users"), Value::from(0), text("name")]);
    assert_eq!(version, Some(&Value::from(2)));
    assert_eq!(name, Some(&text("ann")));
}

#[rstest]
fn test_set_lookup_returns_stored_member() {
    let tags = Value::Set(Set::from([text("red"), text("blue")]));
    let ordered = Value::OrderedSet(OrderedSet::from([text("red"), text("blue")]));
    let red = tags.get(&text("red"));
    let blue = ordered.get(&text("blue"));
    assert_eq!(red, Some(&text("red")));
    assert_eq!(blue, Some(&text("blue")));
    assert_eq!(tags.get(&text("green")), None);
    assert!(ordered.has_in(&[text("red")]));
}

#[rstest]
fn test_set_in_rebuilds_only_the_path(document: Value) {
    let path = [text("users"), Value::from(0), text("age")];
    let older = document.set_in(&path, Value::from(32)).unwrap();
    assert_eq!(older.get_in(&path), Some(&Value::from(32)));
    assert_eq!(document.get_in(&path), Some(&Value::from(31)));
    assert_eq!(older.get(&text("version")), document.get(&text("version")));
}

#[rstest]
fn test_update_in_appends_to_nested_list(document: Value) {
    let path = [text("users"), Value::from(0), text("tags")];
    let tagged = document
        .update_in(&path, Value::Null, |tags| match tags {
            Value::List(list) => Value::List(list.push(text("admin"))),
            other => other,
        })
        .unwrap();
    let tags = tagged.get_in(&path).and_then(Value::as_list).map(List::len);
    assert_eq!(tags, Some(1));
}

#[rstest]
fn test_unknown_record_field_in_path(document: Value) {
    let error = document
        .set_in(&[text("users"), Value::from(0), text("email")], text("a@b"))
        .unwrap_err();
    assert_eq!(
        error,
        CollectionError::UnknownField {
            record: "User".to_string(),
            field: "email".to_string(),
        }
    );
}

#[rstest]
fn test_path_through_scalar_is_type_mismatch(document: Value) {
    let error = document
        .set_in(&[text("version"), text("major")], Value::from(1))
        .unwrap_err();
    assert_eq!(
        error,
        CollectionError::TypeMismatch {
            left: "number",
            right: "string",
        }
    );
}

#[rstest]
fn test_remove_in_resets_record_field(document: Value) {
    let path = [text("users"), Value::from(0), text("age")];
    let reset = document.remove_in(&path).unwrap();
    assert_eq!(reset.get_in(&path), Some(&Value::from(0)));
}

#[rstest]
fn test_remove_in_from_list(document: Value) {
    let emptied = document.remove_in(&[text("users"), Value::from(0)]).unwrap();
    assert_eq!(
        emptied.get(&text("users")).and_then(Value::size),
        Some(0)
    );
}

#[rstest]
fn test_set_in_on_ordered_map_keeps_order() {
    let value = Value::OrderedMap(OrderedMap::from([(text("b"), Value::from(1))]));
    let updated = value.set_in(&[text("a")], Value::from(2)).unwrap();
    let keys: Vec<Value> = updated
        .as_ordered_map()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    assert_eq!(keys, vec![text("b"), text("a")]);
}

// =============================================================================
// Merging
// =============================================================================

fn map_of<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(entries.into_iter().map(|(key, value)| (text(key), value)).collect())
}

#[fixture]
fn style() -> Value {
    map_of([
        ("font", map_of([("size", Value::from(12)), ("face", text("serif"))])),
        ("color", text("black")),
    ])
}

#[rstest]
fn test_merge_replaces_nested_maps(style: Value) {
    let patch = map_of([("font", map_of([("size", Value::from(14))]))]);
    let merged = style.merge(&patch).unwrap();
    assert_eq!(merged.get_in(&[text("font"), text("size")]), Some(&Value::from(14)));
    assert_eq!(merged.get_in(&[text("font"), text("face")]), None);
    assert_eq!(merged.get(&text("color")), Some(&text("black")));
}

#[rstest]
fn test_merge_deep_combines_nested_maps(style: Value) {
    let patch = map_of([("font", map_of([("size", Value::from(14))]))]);
    let merged = style.merge_deep(&patch).unwrap();
    assert_eq!(merged.get_in(&[text("font"), text("size")]), Some(&Value::from(14)));
    assert_eq!(merged.get_in(&[text("font"), text("face")]), Some(&text("serif")));
    assert_eq!(style.get_in(&[text("font"), text("size")]), Some(&Value::from(12)));
}

#[rstest]
fn test_merge_deep_with_resolves_leaves() {
    let base = map_of([("totals", map_of([("a", Value::from(1)), ("b", Value::from(2))]))]);
    let more = map_of([("totals", map_of([("a", Value::from(10)), ("c", Value::from(5))]))]);
    let combined = base
        .merge_deep_with(&more, |existing, incoming, _| {
            Value::from(List::from([existing.clone(), incoming.clone()]))
        })
        .unwrap();
    assert_eq!(
        combined.get_in(&[text("totals"), text("a")]),
        Some(&Value::from(List::from([Value::from(1), Value::from(10)])))
    );
    assert_eq!(combined.get_in(&[text("totals"), text("b")]), Some(&Value::from(2)));
    assert_eq!(combined.get_in(&[text("totals"), text("c")]), Some(&Value::from(5)));
}

#[rstest]
fn test_merge_lists_by_position() {
    let short = Value::from(List::from([text("a"), text("b")]));
    let long = Value::from(List::from([text("x"), Value::Null, text("z")]));
    let merged = short
        .merge_with(&long, |existing, incoming, _| {
            if incoming.is_null() {
                existing.clone()
            } else {
                incoming.clone()
            }
        })
        .unwrap();
    assert_eq!(merged, Value::from(List::from([text("x"), text("b"), text("z")])));
}

#[rstest]
fn test_merge_into_set_adds_members() {
    let tags = Value::Set(Set::from([text("red")]));
    let merged = tags
        .merge(&Value::from(List::from([text("blue"), text("red")])))
        .unwrap();
    assert_eq!(merged, Value::Set(Set::from([text("red"), text("blue")])));
}

#[rstest]
fn test_merge_in_targets_path(document: Value) {
    let user = [text("users"), Value::from(0)];
    let renamed = document.merge_in(&user, &map_of([("name", text("anne"))])).unwrap();
    assert_eq!(
        renamed.get_in(&[text("users"), Value::from(0), text("name")]),
        Some(&text("anne"))
    );
    assert_eq!(
        renamed.get_in(&[text("users"), Value::from(0), text("age")]),
        Some(&Value::from(31))
    );
}

#[rstest]
fn test_merge_deep_in_starts_missing_path_empty(document: Value) {
    let settings = map_of([("theme", map_of([("mode", text("dark"))]))]);
    let created = document.merge_deep_in(&[text("settings")], &settings).unwrap();
    assert_eq!(
        created.get_in(&[text("settings"), text("theme"), text("mode")]),
        Some(&text("dark"))
    );
    assert!(!document.has_in(&[text("settings")]));
}

#[rstest]
#[case(Value::from(1), map_of([("a", Value::Null)]))]
#[case(map_of([("a", Value::Null)]), text("scalar"))]
#[case(Value::from(List::new()), map_of([("a", Value::Null)]))]
fn test_merge_type_mismatch(#[case] target: Value, #[case] other: Value) {
    assert!(matches!(
        target.merge(&other),
        Err(CollectionError::TypeMismatch { .. })
    ));
}

#[rstest]
fn test_merge_into_record_rejects_unknown_field(user_type: RecordType) {
    let user = Value::Record(user_type.defaults());
    assert!(matches!(
        user.merge(&map_of([("email", text("ann@example.com"))])),
        Err(CollectionError::UnknownField { .. })
    ));
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
fn test_try_sort_by_with_try_cmp() {
    let sorted = Seq::of([Value::from(3), Value::from(1), Value::from(2)])
        .try_sort_by(Value::try_cmp)
        .unwrap();
    assert_eq!(sorted.to_vec(), vec![Value::from(1), Value::from(2), Value::from(3)]);
}

#[rstest]
fn test_try_sort_by_reports_type_mismatch() {
    let result = Seq::of([Value::from(3), text("x"), Value::from(2)]).try_sort_by(Value::try_cmp);
    assert!(matches!(result, Err(CollectionError::TypeMismatch { .. })));
}

#[rstest]
fn test_try_cmp_on_collections() {
    let left = Value::List(List::from([Value::from(1), Value::from(2)]));
    let right = Value::List(List::from([Value::from(1), Value::from(3)]));
    assert_eq!(left.try_cmp(&right), Ok(Ordering::Less));
    let map = Value::Map(Map::new());
    assert!(map.try_cmp(&map).is_err());
}

// =============================================================================
// Records
// =============================================================================

#[rstest]
fn test_record_defaults_and_fields(user_type: RecordType) {
    let user = user_type.defaults();
    assert_eq!(user.name(), "User");
    assert_eq!(user.fields().collect::<Vec<_>>(), vec!["name", "age", "tags"]);
    assert_eq!(user.get("age"), Some(&Value::from(0)));
}

#[rstest]
fn test_record_set_is_persistent(user_type: RecordType) {
    let user = user_type.defaults();
    let named = user.set("name", text("bob")).unwrap();
    assert_eq!(named.get("name"), Some(&text("bob")));
    assert_eq!(user.get("name"), Some(&text("")));
    assert_ne!(user, named);
    assert_eq!(named.clear(), user);
}

#[rstest]
fn test_record_rejects_unknown_fields(user_type: RecordType) {
    let user = user_type.defaults();
    assert!(matches!(
        user.set("email", Value::Null),
        Err(CollectionError::UnknownField { .. })
    ));
    assert!(matches!(
        user.remove("email"),
        Err(CollectionError::UnknownField { .. })
    ));
    assert_eq!(user.get("email"), None);
}

#[rstest]
fn test_records_key_maps(user_type: RecordType) {
    let user = user_type.create([("name", text("cy"))]).unwrap();
    let index = Map::new().insert(Value::Record(user.clone()), 1);
    let same = user_type.defaults().set("name", text("cy")).unwrap();
    assert_eq!(index.get(&Value::Record(same)), Some(&1));
}

#[rstest]
fn test_value_display() {
    let value = Value::List(List::from([Value::from(1), text("a"), Value::Null]));
    assert_eq!(value.to_string(), "List [1, \"a\", null]");
}
