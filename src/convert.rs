//! Deep conversion between JSON documents and [`Value`] trees.
//!
//! [`from_js`] turns objects into [`Map`]s and arrays into [`List`]s,
//! recursively. [`from_js_with`] hands every object and array to a reviver
//! that picks the collection type, which is how sets, ordered maps or
//! records are rebuilt from plain JSON. [`Value::to_js`] goes the other way.
//!
//! ```rust
//! use immutables::Value;
//! use immutables::convert::from_js;
//! use serde_json::json;
//!
//! let document = json!({"tags": ["a", "b"], "count": 2});
//! let value = from_js(&document);
//! assert_eq!(value.get_in(&["tags".into(), 1.into()]), Some(&Value::from("b")));
//! assert_eq!(value.to_js(), document);
//! ```

use serde_json::Value as JsonValue;

use crate::error::{CollectionError, Result};
use crate::persistent::{List, Map};
use crate::seq::{KeyedSeq, Seq};
use crate::value::{Number, Value};

/// A converted JSON container, offered to a reviver.
#[derive(Debug, Clone)]
pub enum Revived {
    /// The entries of a JSON object, in document order.
    Keyed(KeyedSeq<Value, Value>),
    /// The items of a JSON array.
    Indexed(Seq<Value>),
}

impl Revived {
    /// Builds the collection [`from_js`] would build: a `Map` for objects
    /// and a `List` for arrays.
    pub fn into_default(self) -> Value {
        match self {
            Self::Keyed(entries) => Value::Map(entries.to_map()),
            Self::Indexed(items) => Value::List(items.to_list()),
        }
    }
}

/// Converts a JSON document into nested `Map`s and `List`s.
pub fn from_js(json: &JsonValue) -> Value {
    from_js_with(json, |_, revived, _| revived.into_default())
}

/// Converts a JSON document, letting `reviver` build every container.
///
/// The reviver is called bottom-up with the container's key in its parent
/// (an empty string for the root), its already converted contents and the
/// key path from the root.
///
/// ```rust
/// use immutables::Value;
/// use immutables::convert::{Revived, from_js_with};
/// use serde_json::json;
///
/// let value = from_js_with(&json!({"ids": [1, 2, 2]}), |_, revived, path| {
///     match revived {
///         Revived::Indexed(items) if !path.is_empty() => Value::Set(items.to_set()),
///         other => other.into_default(),
///     }
/// });
/// assert_eq!(value.get(&"ids".into()).and_then(Value::size), Some(2));
/// ```
pub fn from_js_with<F>(json: &JsonValue, mut reviver: F) -> Value
where
    F: FnMut(&Value, Revived, &[Value]) -> Value,
{
    let mut path = Vec::new();
    revive(json, &Value::from(""), &mut path, &mut reviver)
}

fn revive<F>(json: &JsonValue, key: &Value, path: &mut Vec<Value>, reviver: &mut F) -> Value
where
    F: FnMut(&Value, Revived, &[Value]) -> Value,
{
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(flag) => Value::Bool(*flag),
        JsonValue::Number(number) => number
            .as_f64()
            .map_or(Value::Null, |float| Value::Number(Number::new(float))),
        JsonValue::String(text) => Value::String(text.clone()),
        JsonValue::Array(items) => {
            let converted: Vec<Value> = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let child_key = Value::from(index);
                    path.push(child_key.clone());
                    let child = revive(item, &child_key, path, reviver);
                    path.pop();
                    child
                })
                .collect();
            reviver(key, Revived::Indexed(Seq::from_vec(converted)), path)
        }
        JsonValue::Object(entries) => {
            let converted: Vec<(Value, Value)> = entries
                .iter()
                .map(|(name, item)| {
                    let child_key = Value::from(name.as_str());
                    path.push(child_key.clone());
                    let child = revive(item, &child_key, path, reviver);
                    path.pop();
                    (child_key, child)
                })
                .collect();
            reviver(
                key,
                Revived::Keyed(KeyedSeq::new(Seq::from_vec(converted))),
                path,
            )
        }
    }
}

// =============================================================================
// Value to JSON
// =============================================================================

fn object_key(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn number_to_js(number: Number) -> JsonValue {
    match number.as_i64() {
        Some(integer) => JsonValue::from(integer),
        None => serde_json::Number::from_f64(number.get())
            .map_or(JsonValue::Null, JsonValue::Number),
    }
}

fn array_of<'a, I>(items: I) -> Vec<JsonValue>
where
    I: IntoIterator<Item = &'a Value>,
{
    items.into_iter().map(Value::to_js).collect()
}

fn object_of<'a, I>(entries: I) -> serde_json::Map<String, JsonValue>
where
    I: IntoIterator<Item = (&'a Value, &'a Value)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (object_key(key), value.to_js()))
        .collect()
}

impl Value {
    /// Converts deeply into JSON.
    ///
    /// Keyed collections and records become objects, with non-string keys
    /// rendered through `Display`. Indexed collections and sets become
    /// arrays. Integral numbers become JSON integers; NaN and infinities
    /// become `null`.
    pub fn to_js(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(flag) => JsonValue::Bool(*flag),
            Self::Number(number) => number_to_js(*number),
            Self::String(text) => JsonValue::String(text.clone()),
            Self::List(list) => JsonValue::Array(array_of(list)),
            Self::Stack(stack) => JsonValue::Array(array_of(stack)),
            Self::Set(set) => JsonValue::Array(array_of(set)),
            Self::OrderedSet(set) => JsonValue::Array(array_of(set)),
            Self::Map(map) => JsonValue::Object(object_of(map)),
            Self::OrderedMap(map) => JsonValue::Object(object_of(map)),
            Self::Record(record) => JsonValue::Object(
                record
                    .entries()
                    .map(|(field, value)| (field.to_owned(), value.to_js()))
                    .collect(),
            ),
        }
    }

    /// Converts a collection into a JSON array. Keyed collections yield
    /// `[key, value]` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::TypeMismatch`] for scalars and records.
    pub fn to_array(&self) -> Result<Vec<JsonValue>> {
        let pair =
            |(key, value): (&Self, &Self)| JsonValue::Array(vec![key.to_js(), value.to_js()]);
        match self {
            Self::List(list) => Ok(array_of(list)),
            Self::Stack(stack) => Ok(array_of(stack)),
            Self::Set(set) => Ok(array_of(set)),
            Self::OrderedSet(set) => Ok(array_of(set)),
            Self::Map(map) => Ok(map.iter().map(pair).collect()),
            Self::OrderedMap(map) => Ok(map.iter().map(pair).collect()),
            _ => Err(CollectionError::TypeMismatch {
                left: self.kind_name(),
                right: "array",
            }),
        }
    }

    /// Converts a collection into a JSON object. Indexed collections are
    /// keyed by position and sets by member.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::TypeMismatch`] for scalars.
    pub fn to_object(&self) -> Result<serde_json::Map<String, JsonValue>> {
        let by_position = |(index, item): (usize, &Self)| (index.to_string(), item.to_js());
        let by_member = |member: &Self| (object_key(member), member.to_js());
        match self {
            Self::Map(map) => Ok(object_of(map)),
            Self::OrderedMap(map) => Ok(object_of(map)),
            Self::List(list) => Ok(list.iter().enumerate().map(by_position).collect()),
            Self::Stack(stack) => Ok(stack.iter().enumerate().map(by_position).collect()),
            Self::Set(set) => Ok(set.iter().map(by_member).collect()),
            Self::OrderedSet(set) => Ok(set.iter().map(by_member).collect()),
            Self::Record(_) => match self.to_js() {
                JsonValue::Object(object) => Ok(object),
                _ => Ok(serde_json::Map::new()),
            },
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {
                Err(CollectionError::TypeMismatch {
                    left: self.kind_name(),
                    right: "object",
                })
            }
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        from_js(json)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_js()
    }
}

impl From<List<Value>> for JsonValue {
    fn from(list: List<Value>) -> Self {
        Self::Array(array_of(&list))
    }
}

impl From<Map<Value, Value>> for JsonValue {
    fn from(map: Map<Value, Value>) -> Self {
        Self::Object(object_of(&map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::{OrderedMap, Set};
    use crate::record::RecordType;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!(3))]
    #[case(json!(-2.5))]
    #[case(json!("text"))]
    #[case(json!([1, [2, 3], {"a": null}]))]
    #[case(json!({"a": {"b": [true, false]}, "c": "d"}))]
    fn test_round_trip(#[case] document: JsonValue) {
        assert_eq!(from_js(&document).to_js(), document);
    }

    #[rstest]
    fn test_objects_become_maps_and_arrays_lists() {
        let value = from_js(&json!({"list": [1, 2]}));
        assert!(value.as_map().is_some());
        let list = value.get(&Value::from("list")).and_then(Value::as_list);
        assert_eq!(list.map(List::len), Some(2));
    }

    #[rstest]
    fn test_reviver_sees_keys_and_paths() {
        let mut seen = Vec::new();
        from_js_with(&json!({"a": [[1]]}), |key, revived, path| {
            seen.push((key.clone(), path.to_vec()));
            revived.into_default()
        });
        assert_eq!(
            seen,
            vec![
                (Value::from(0), vec![Value::from("a"), Value::from(0)]),
                (Value::from("a"), vec![Value::from("a")]),
                (Value::from(""), vec![]),
            ]
        );
    }

    #[rstest]
    fn test_reviver_can_build_ordered_maps() {
        let value = from_js_with(&json!({"z": 1, "a": 2}), |_, revived, _| match revived {
            Revived::Keyed(entries) => Value::OrderedMap(entries.to_ordered_map()),
            indexed @ Revived::Indexed(_) => indexed.into_default(),
        });
        assert!(value.as_ordered_map().is_some());
        assert_eq!(value.to_js(), json!({"z": 1, "a": 2}));
    }

    #[rstest]
    fn test_set_round_trips_through_reviver() {
        let set = Value::Set(Set::from([Value::from(1), Value::from(2)]));
        let revived = from_js_with(&set.to_js(), |_, revived, _| match revived {
            Revived::Indexed(items) => Value::Set(items.to_set()),
            keyed @ Revived::Keyed(_) => keyed.into_default(),
        });
        assert_eq!(revived, set);
    }

    #[rstest]
    #[case(f64::NAN, json!(null))]
    #[case(f64::INFINITY, json!(null))]
    #[case(4.0, json!(4))]
    #[case(0.5, json!(0.5))]
    fn test_number_to_js(#[case] number: f64, #[case] expected: JsonValue) {
        assert_eq!(Value::from(number).to_js(), expected);
    }

    #[rstest]
    fn test_non_string_keys_are_rendered() {
        let map = Value::Map(Map::from([(Value::from(1), Value::from("one"))]));
        assert_eq!(map.to_js(), json!({"1": "one"}));
    }

    #[rstest]
    fn test_to_array_pairs_keyed_entries() {
        let map = Value::OrderedMap(OrderedMap::from([
            (Value::from("a"), Value::from(1)),
            (Value::from("b"), Value::from(2)),
        ]));
        assert_eq!(
            map.to_array().unwrap(),
            vec![json!(["a", 1]), json!(["b", 2])]
        );
        assert!(Value::from(1).to_array().is_err());
    }

    #[rstest]
    fn test_to_object_keys_lists_by_position() {
        let list = Value::List(List::from([Value::from("x"), Value::from("y")]));
        let object = list.to_object().unwrap();
        assert_eq!(JsonValue::Object(object), json!({"0": "x", "1": "y"}));
        assert!(Value::Null.to_object().is_err());
    }

    #[rstest]
    fn test_record_converts_to_object() {
        let point = RecordType::new("Point", [("x", Value::from(1)), ("y", Value::from(2))]);
        let record = Value::Record(point.defaults());
        assert_eq!(record.to_js(), json!({"x": 1, "y": 2}));
        assert_eq!(
            JsonValue::Object(record.to_object().unwrap()),
            json!({"x": 1, "y": 2})
        );
    }
}
