//! Expanding a nested schema against concrete data.
//!
//! A nested schema describes one element of each repeated list. Before
//! validation it is expanded into a [`FullSchema`] keyed by concrete flat keys,
//! one copy of each sub-schema per list element actually present in the data.
//! The data is then augmented so every schema key has an entry and every
//! unknown entry is routed to an extras bucket or the root junk bucket.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::datum::Datum;
use crate::error::DataError;
use crate::flatten::{value_type_name, FlatMap};
use crate::path::{Control, FlatKey};
use crate::schema::{Schema, SchemaNode};
use crate::validator::{FlatData, Validator};

const CONTROLS: [Control; 3] = [Control::Before, Control::After, Control::Extras];

/// A schema expanded against one record.
#[derive(Debug, Clone, Default)]
pub struct FullSchema {
    entries: BTreeMap<FlatKey, Vec<Validator>>,
}

impl FullSchema {
    /// Returns the validators for a concrete key.
    pub fn get(&self, key: &FlatKey) -> Option<&[Validator]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns true if the key has an entry.
    pub fn contains_key(&self, key: &FlatKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in `(length, contents)` order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &FlatKey> {
        self.entries.keys()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FlatKey, &[Validator])> {
        self.entries.iter().map(|(key, chain)| (key, chain.as_slice()))
    }

    /// Number of concrete keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was expanded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flattens a schema into template keys.
///
/// Template keys contain field and control segments only; a sub-schema
/// contributes its keys under its field name with no index.
///
/// ```rust
/// use dictize::{flat_key, Control, Schema};
/// use dictize::schema::flatten_schema;
/// use dictize::validators::{ignore, not_empty};
///
/// let schema = Schema::new()
///     .field("name", [not_empty()])
///     .sub_schema("numbers", Schema::new().field("number", []).extras([ignore()]));
///
/// let template = flatten_schema(&schema);
/// let keys: Vec<_> = template.keys().cloned().collect();
/// assert_eq!(keys, vec![
///     flat_key!["name"],
///     flat_key!["numbers", "number"],
///     flat_key!["numbers", Control::Extras],
/// ]);
/// ```
pub fn flatten_schema(schema: &Schema) -> IndexMap<FlatKey, Vec<Validator>> {
    let mut template = IndexMap::new();
    flatten_schema_into(schema, &FlatKey::root(), &mut template);
    if let Some(junk) = schema.control(Control::Junk) {
        template.insert(FlatKey::root().push_control(Control::Junk), junk.to_vec());
    }
    template
}

fn flatten_schema_into(
    schema: &Schema,
    prefix: &FlatKey,
    template: &mut IndexMap<FlatKey, Vec<Validator>>,
) {
    for (name, node) in schema.fields() {
        let key = prefix.push_field(name);
        match node {
            SchemaNode::Leaf(validators) => {
                template.insert(key, validators.clone());
            }
            SchemaNode::Sub(sub) => flatten_schema_into(sub, &key, template),
        }
    }
    for control in CONTROLS {
        if let Some(validators) = schema.control(control) {
            template.insert(prefix.push_control(control), validators.to_vec());
        }
    }
}

/// Finds the concrete node prefixes that appear in the data.
///
/// The root is always included. A data key contributes its parent when the
/// parent's shape is a schema node and the grandparent list element has
/// already been accepted. Keys are visited in `(length, contents)` order so
/// outer elements are accepted before inner ones.
pub fn get_all_key_combinations<V>(
    data: &BTreeMap<FlatKey, V>,
    template: &IndexMap<FlatKey, Vec<Validator>>,
) -> BTreeSet<FlatKey> {
    let schema_prefixes: BTreeSet<FlatKey> =
        template.keys().map(|key| key.truncate_end(1)).collect();

    let mut combinations = BTreeSet::from([FlatKey::root()]);
    for key in data.keys() {
        if !schema_prefixes.contains(&key.parent_shape()) {
            continue;
        }
        if !combinations.contains(&key.truncate_end(3)) {
            continue;
        }
        combinations.insert(key.truncate_end(1));
    }
    combinations
}

/// Expands `schema` into one concrete entry per (node prefix, field) pair.
pub fn make_full_schema<V>(data: &BTreeMap<FlatKey, V>, schema: &Schema) -> FullSchema {
    Expansion::new(data, schema).full
}

/// Completes a flattened record against the expanded schema.
///
/// Every non-control schema key absent from the data is added as
/// [`Datum::Missing`]. Unknown keys under an accepted node move to that node's
/// extras bucket; orphaned keys move to the root junk bucket, keyed by their
/// rendered path.
///
/// # Errors
///
/// Returns [`DataError::NotAListOfDicts`] when a non-empty value that is not
/// a list of objects sits where the schema expects a sub-schema.
pub fn augment_data(data: &FlatMap, schema: &Schema) -> Result<FlatData, DataError> {
    Expansion::new(data, schema).augment(data)
}

/// The template, node prefixes and full schema for one record.
pub(crate) struct Expansion {
    template: IndexMap<FlatKey, Vec<Validator>>,
    combinations: BTreeSet<FlatKey>,
    pub(crate) full: FullSchema,
}

impl Expansion {
    pub(crate) fn new<V>(data: &BTreeMap<FlatKey, V>, schema: &Schema) -> Self {
        let template = flatten_schema(schema);
        let combinations = get_all_key_combinations(data, &template);

        let mut entries = BTreeMap::new();
        for combination in &combinations {
            let Some(node) = schema.descend(combination) else {
                continue;
            };
            for (name, child) in node.fields() {
                if let SchemaNode::Leaf(validators) = child {
                    entries.insert(combination.push_field(name), validators.clone());
                }
            }
            for control in CONTROLS {
                if let Some(validators) = node.control(control) {
                    entries.insert(combination.push_control(control), validators.to_vec());
                }
            }
        }
        if let Some(junk) = schema.control(Control::Junk) {
            entries.insert(FlatKey::root().push_control(Control::Junk), junk.to_vec());
        }

        Self {
            template,
            combinations,
            full: FullSchema { entries },
        }
    }

    pub(crate) fn augment(&self, data: &FlatMap) -> Result<FlatData, DataError> {
        let mut augmented = FlatData::new();
        let mut extras: BTreeMap<FlatKey, Map<String, Value>> = BTreeMap::new();
        let mut junk = Map::new();

        for (key, value) in data {
            if self.full.contains_key(key) {
                augmented.insert(key.clone(), Datum::Value(value.clone()));
                continue;
            }

            let shape = key.shape();
            let under_sub_schema = self.template.keys().any(|t| t.starts_with(&shape));
            if under_sub_schema && !is_empty_list(value) {
                return Err(DataError::NotAListOfDicts {
                    key: key.clone(),
                    found: value_type_name(value),
                });
            }

            let parent = key.truncate_end(1);
            match key.last() {
                Some(last) if self.combinations.contains(&parent) => {
                    extras
                        .entry(parent.push_control(Control::Extras))
                        .or_default()
                        .insert(last.name(), value.clone());
                }
                _ => {
                    junk.insert(key.to_string(), value.clone());
                }
            }
        }

        if !junk.is_empty() {
            augmented.insert(
                FlatKey::root().push_control(Control::Junk),
                Datum::Value(Value::Object(junk)),
            );
        }

        for key in self.full.keys() {
            if key.control().is_none() && !augmented.contains_key(key) {
                augmented.insert(key.clone(), Datum::Missing);
            }
        }

        augmented.extend(
            extras
                .into_iter()
                .map(|(key, bucket)| (key, Datum::Value(Value::Object(bucket)))),
        );
        Ok(augmented)
    }
}

fn is_empty_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.is_empty())
}
