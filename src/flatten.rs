//! Conversion between nested records and flat key maps.
//!
//! A nested record (a JSON object whose repeated sub-entities are lists of
//! objects) flattens to a map from [`FlatKey`] to leaf value:
//!
//! ```rust
//! use dictize::flatten::{flatten_dict, unflatten};
//! use dictize::flat_key;
//! use serde_json::json;
//!
//! let record = json!({
//!     "name": "census",
//!     "resources": [{"url": "a.csv"}, {"url": "b.csv"}],
//!     "tags": []
//! });
//! let record = record.as_object().unwrap();
//!
//! let flat = flatten_dict(record).unwrap();
//! assert_eq!(flat[&flat_key!["resources", 1, "url"]], json!("b.csv"));
//! assert_eq!(flat[&flat_key!["tags"]], json!([]));
//!
//! assert_eq!(&unflatten(flat), record);
//! ```
//!
//! Lists of scalars are not expanded; they are stored as opaque leaf values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::DataError;
use crate::path::{FlatKey, Segment};

/// A flattened record of plain JSON values.
pub type FlatMap = BTreeMap<FlatKey, Value>;

/// Flattens a nested record.
///
/// A value that is a non-empty list starting with an object is expanded with
/// index segments; every other value, including empty lists, is stored
/// verbatim under its key.
///
/// # Errors
///
/// Returns [`DataError::NonDictListItem`] when such a list also contains a
/// value that is not an object.
pub fn flatten_dict(data: &Map<String, Value>) -> Result<FlatMap, DataError> {
    let mut flattened = FlatMap::new();
    flatten_dict_into(data, &FlatKey::root(), &mut flattened)?;
    Ok(flattened)
}

/// Flattens a list of objects found under `prefix`.
///
/// # Errors
///
/// Returns [`DataError::NonDictListItem`] if any item is not an object.
pub fn flatten_list(items: &[Value], prefix: &FlatKey) -> Result<FlatMap, DataError> {
    let mut flattened = FlatMap::new();
    flatten_list_into(items, prefix, &mut flattened)?;
    Ok(flattened)
}

fn flatten_dict_into(
    data: &Map<String, Value>,
    prefix: &FlatKey,
    flattened: &mut FlatMap,
) -> Result<(), DataError> {
    for (name, value) in data {
        let key = prefix.push_field(name.as_str());
        match value {
            Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
                flatten_list_into(items, &key, flattened)?;
            }
            _ => {
                flattened.insert(key, value.clone());
            }
        }
    }
    Ok(())
}

fn flatten_list_into(
    items: &[Value],
    prefix: &FlatKey,
    flattened: &mut FlatMap,
) -> Result<(), DataError> {
    for (idx, item) in items.iter().enumerate() {
        let key = prefix.push_index(idx);
        match item {
            Value::Object(map) => flatten_dict_into(map, &key, flattened)?,
            _ => return Err(DataError::NonDictListItem { key }),
        }
    }
    Ok(())
}

/// Intermediate tree used while unflattening.
enum Node {
    Leaf(Value),
    Branch(BTreeMap<Segment, Node>),
}

/// Rebuilds a nested record from flat entries.
///
/// Entries are placed in `(length, contents)` key order so every parent is
/// built before its children. Branches keyed by list indices become lists
/// ordered by index; gaps left by removed items are closed up.
pub fn unflatten(flat: impl IntoIterator<Item = (FlatKey, Value)>) -> Map<String, Value> {
    let ordered: FlatMap = flat.into_iter().collect();
    let mut root: BTreeMap<Segment, Node> = BTreeMap::new();

    for (key, value) in ordered {
        let Some((last, parents)) = key.as_slice().split_last() else {
            continue;
        };
        let mut current = &mut root;
        for segment in parents {
            current = branch_mut(
                current
                    .entry(segment.clone())
                    .or_insert_with(|| Node::Branch(BTreeMap::new())),
            );
        }
        current.insert(last.clone(), Node::Leaf(value));
    }

    branch_into_object(root)
}

/// Returns the children of `node`, turning a leaf into an empty branch.
///
/// A shorter key may have stored a leaf (typically `[]`) where a longer key
/// now needs a branch.
fn branch_mut(node: &mut Node) -> &mut BTreeMap<Segment, Node> {
    if let Node::Leaf(_) = node {
        *node = Node::Branch(BTreeMap::new());
    }
    match node {
        Node::Branch(children) => children,
        Node::Leaf(_) => unreachable!("leaf was replaced by a branch"),
    }
}

fn node_into_value(node: Node) -> Value {
    match node {
        Node::Leaf(value) => value,
        Node::Branch(children) => {
            let is_list = !children.is_empty()
                && children.keys().all(|segment| matches!(segment, Segment::Index(_)));
            if is_list {
                Value::Array(children.into_values().map(node_into_value).collect())
            } else {
                Value::Object(branch_into_object(children))
            }
        }
    }
}

fn branch_into_object(children: BTreeMap<Segment, Node>) -> Map<String, Value> {
    children
        .into_iter()
        .map(|(segment, node)| (segment.name(), node_into_value(node)))
        .collect()
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
