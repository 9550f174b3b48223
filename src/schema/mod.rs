//! Schema definitions for validation.
//!
//! A [`Schema`] maps field names to [`SchemaNode`]s. A node is either a chain
//! of validators for a single value (a leaf) or a nested schema describing
//! *one element* of a repeated list field. Control chains that run outside the
//! main phase are explicit fields of the schema rather than magic keys.
//!
//! # Example
//!
//! ```rust
//! use dictize::Schema;
//! use dictize::validators::{convert_int, default, ignore, ignore_missing, not_empty};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("name", [not_empty()])
//!     .field("age", [ignore_missing(), convert_int()])
//!     .field("gender", [default(json!("female"))])
//!     .sub_schema(
//!         "numbers",
//!         Schema::new()
//!             .field("number", [convert_int()])
//!             .field("code", [not_empty()])
//!             .extras([ignore()]),
//!     );
//!
//! assert_eq!(schema.field_names(), vec!["name", "age", "gender", "numbers"]);
//! ```

pub mod full;

use std::fmt;

use indexmap::IndexMap;

use crate::path::{Control, FlatKey, Segment};
use crate::validator::Validator;

pub use full::{augment_data, flatten_schema, get_all_key_combinations, make_full_schema, FullSchema};

/// A node of a schema tree.
#[derive(Clone)]
pub enum SchemaNode {
    /// Validators applied, in order, to a single value.
    Leaf(Vec<Validator>),
    /// The schema of each element of a list-of-objects field.
    Sub(Schema),
}

impl SchemaNode {
    /// Returns the validator chain if this is a leaf.
    pub fn as_leaf(&self) -> Option<&[Validator]> {
        match self {
            SchemaNode::Leaf(validators) => Some(validators),
            SchemaNode::Sub(_) => None,
        }
    }

    /// Returns the nested schema if this is a sub-schema.
    pub fn as_sub(&self) -> Option<&Schema> {
        match self {
            SchemaNode::Leaf(_) => None,
            SchemaNode::Sub(schema) => Some(schema),
        }
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Leaf(validators) => f.debug_tuple("Leaf").field(validators).finish(),
            SchemaNode::Sub(schema) => f.debug_tuple("Sub").field(schema).finish(),
        }
    }
}

/// A validation schema for one record shape.
///
/// Fields keep their declaration order. The `before`, `after` and `extras`
/// chains may be declared at any level; `junk` only runs at the root.
#[derive(Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, SchemaNode>,
    before: Option<Vec<Validator>>,
    after: Option<Vec<Validator>>,
    extras: Option<Vec<Validator>>,
    junk: Option<Vec<Validator>>,
}

impl Schema {
    /// Creates a new schema with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a leaf field validated by `validators`, in order.
    ///
    /// Redefining a field replaces the earlier definition in place.
    pub fn field<I>(mut self, name: impl Into<String>, validators: I) -> Self
    where
        I: IntoIterator<Item = Validator>,
    {
        self.fields.insert(
            name.into(),
            SchemaNode::Leaf(validators.into_iter().collect()),
        );
        self
    }

    /// Adds a list-of-objects field whose elements follow `schema`.
    pub fn sub_schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.insert(name.into(), SchemaNode::Sub(schema));
        self
    }

    /// Sets the chain that runs before the main phase of this node.
    pub fn before<I: IntoIterator<Item = Validator>>(mut self, validators: I) -> Self {
        self.before = Some(validators.into_iter().collect());
        self
    }

    /// Sets the chain that runs after the main and extras phases of this node.
    pub fn after<I: IntoIterator<Item = Validator>>(mut self, validators: I) -> Self {
        self.after = Some(validators.into_iter().collect());
        self
    }

    /// Sets the chain that handles fields not named by this node.
    pub fn extras<I: IntoIterator<Item = Validator>>(mut self, validators: I) -> Self {
        self.extras = Some(validators.into_iter().collect());
        self
    }

    /// Sets the chain that handles unrecognised input. Only used at the root.
    pub fn junk<I: IntoIterator<Item = Validator>>(mut self, validators: I) -> Self {
        self.junk = Some(validators.into_iter().collect());
        self
    }

    /// Returns the node for a field.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.get(name)
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// The names of this node's fields in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the chain declared for a control slot.
    pub fn control(&self, control: Control) -> Option<&[Validator]> {
        match control {
            Control::Before => self.before.as_deref(),
            Control::After => self.after.as_deref(),
            Control::Extras => self.extras.as_deref(),
            Control::Junk => self.junk.as_deref(),
        }
    }

    /// Follows the field segments of `key` down through nested schemas.
    ///
    /// Index segments are skipped. Returns `None` when a field is unknown or
    /// names a leaf rather than a sub-schema.
    pub fn descend(&self, key: &FlatKey) -> Option<&Schema> {
        let mut schema = self;
        for segment in key.segments() {
            match segment {
                Segment::Field(name) => schema = schema.fields.get(name)?.as_sub()?,
                Segment::Index(_) => {}
                Segment::Control(_) => return None,
            }
        }
        Some(schema)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Schema");
        debug.field("fields", &self.fields);
        for control in [Control::Before, Control::After, Control::Extras, Control::Junk] {
            if let Some(validators) = self.control(control) {
                debug.field(control.as_str(), &validators);
            }
        }
        debug.finish()
    }
}
