//! The validation engine.
//!
//! [`validate`] flattens a nested record, expands the schema against it, runs
//! every validator chain in phase order and unflattens both the converted data
//! and the recorded errors.
//!
//! Phases run in this order, each over keys in `(length, contents)` order:
//!
//! 1. `before` chains
//! 2. every key whose last segment is a plain field
//! 3. `extras` chains
//! 4. `after` chains, in reverse key order so inner nodes finish first
//! 5. the root `junk` chain
//!
//! A chain ends early when a validator stops it; the phase then moves on to the
//! next key.
//!
//! # Example
//!
//! ```rust
//! use dictize::{validate, Context, Schema};
//! use dictize::validators::{convert_int, not_empty};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("name", [not_empty()])
//!     .field("age", [convert_int()]);
//!
//! let record = json!({"name": "", "age": "32"});
//! let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
//!
//! assert_eq!(json!(outcome.data()), json!({"name": "", "age": 32}));
//! assert_eq!(json!(outcome.errors()), json!({"name": ["Missing value"]}));
//! ```

use rayon::prelude::*;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{DataError, FieldError, FieldErrors};
use crate::flatten::{flatten_dict, unflatten, value_type_name, FlatMap};
use crate::path::{Control, FlatKey};
use crate::schema::full::Expansion;
use crate::schema::Schema;
use crate::validator::{ErrorMap, FlatData};
use crate::ValidationResult;

/// The ordered stages of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    Main,
    Extras,
    After,
    Junk,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::Before,
        Phase::Main,
        Phase::Extras,
        Phase::After,
        Phase::Junk,
    ];

    /// The phase a full-schema key belongs to.
    pub fn of(key: &FlatKey) -> Phase {
        match key.control() {
            None => Phase::Main,
            Some(Control::Before) => Phase::Before,
            Some(Control::Extras) => Phase::Extras,
            Some(Control::After) => Phase::After,
            Some(Control::Junk) => Phase::Junk,
        }
    }
}

/// The result of validating one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    data: Map<String, Value>,
    errors: Map<String, Value>,
    field_errors: Vec<FieldError>,
}

impl ValidationOutcome {
    /// The converted record.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The nested error tree with empty branches removed.
    pub fn errors(&self) -> &Map<String, Value> {
        &self.errors
    }

    /// Every recorded message with its flat key, in key order.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Splits into the converted record and the error tree.
    pub fn into_parts(self) -> (Map<String, Value>, Map<String, Value>) {
        (self.data, self.errors)
    }

    /// Converts into a [`Validation`] carrying the converted record or every
    /// recorded error.
    pub fn into_validation(self) -> ValidationResult<Map<String, Value>> {
        match FieldErrors::from_vec(self.field_errors) {
            None => Validation::Success(self.data),
            Some(errors) => Validation::Failure(errors),
        }
    }
}

/// Validates a nested record against `schema`.
///
/// The caller's context is cloned; the clone has its schema keys set to the
/// schema's top-level field names and is what validators see.
///
/// # Errors
///
/// Returns a [`DataError`] when the record is structurally unusable.
pub fn validate(
    data: &Map<String, Value>,
    schema: &Schema,
    context: &Context,
) -> Result<ValidationOutcome, DataError> {
    let empty_lists: Vec<String> = data
        .iter()
        .filter(|(_, value)| matches!(value, Value::Array(items) if items.is_empty()))
        .map(|(name, _)| name.clone())
        .collect();

    let mut call_context = context.clone();
    call_context.set_schema_keys(schema.field_names().into_iter().map(String::from).collect());

    let flattened = flatten_dict(data)?;
    let (converted, errors) = validate_flat(&flattened, schema, &mut call_context)?;

    let mut converted_data = unflatten(
        converted
            .into_iter()
            .filter_map(|(key, datum)| datum.into_value().map(|value| (key, value))),
    );

    if context.fixes_partial_updates() {
        for name in empty_lists {
            converted_data
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }

    let field_errors: Vec<FieldError> = errors
        .iter()
        .flat_map(|(key, messages)| {
            messages
                .iter()
                .map(move |message| FieldError::new(key.clone(), message.clone()))
        })
        .collect();

    let error_tree = unflatten(unshadow_errors(errors).into_iter().map(|(key, messages)| {
        (key, Value::Array(messages.into_iter().map(Value::String).collect()))
    }));

    debug!(errors = field_errors.len(), "validated record");
    Ok(ValidationOutcome {
        data: converted_data,
        errors: prune_errors(error_tree),
        field_errors,
    })
}

/// Validates a record held as a JSON value.
///
/// # Errors
///
/// Returns [`DataError::NotAnObject`] if `data` is not an object, or any
/// error [`validate`] returns.
pub fn validate_value(
    data: &Value,
    schema: &Schema,
    context: &Context,
) -> Result<ValidationOutcome, DataError> {
    match data {
        Value::Object(map) => validate(map, schema, context),
        other => Err(DataError::NotAnObject {
            found: value_type_name(other),
        }),
    }
}

/// Validates many independent records in parallel.
///
/// Each record gets its own copy of `context`.
pub fn validate_batch(
    records: &[Map<String, Value>],
    schema: &Schema,
    context: &Context,
) -> Vec<Result<ValidationOutcome, DataError>> {
    records
        .par_iter()
        .map(|record| validate(record, schema, context))
        .collect()
}

/// Runs every phase over an already flattened record.
///
/// Returns the converted flat record (missing entries included) and the
/// flat error map, which holds every full-schema key even when it has no
/// messages.
///
/// # Errors
///
/// Returns [`DataError::NotAListOfDicts`] when a scalar sits where a
/// sub-schema is expected.
pub fn validate_flat(
    data: &FlatMap,
    schema: &Schema,
    context: &mut Context,
) -> Result<(FlatData, ErrorMap), DataError> {
    let expansion = Expansion::new(data, schema);
    let mut converted = expansion.augment(data)?;
    let mut errors: ErrorMap = expansion
        .full
        .keys()
        .map(|key| (key.clone(), Vec::new()))
        .collect();

    for phase in Phase::ALL {
        run_phase(phase, &expansion, &mut converted, &mut errors, context);
    }

    Ok((converted, errors))
}

fn run_phase(
    phase: Phase,
    expansion: &Expansion,
    data: &mut FlatData,
    errors: &mut ErrorMap,
    context: &mut Context,
) {
    let full = &expansion.full;
    let mut keys: Vec<&FlatKey> = full
        .keys()
        .filter(|key| Phase::of(key) == phase)
        .filter(|key| phase != Phase::Junk || key.len() == 1)
        .collect();
    if phase == Phase::After {
        keys.reverse();
    }

    for key in keys {
        let Some(chain) = full.get(key) else {
            continue;
        };
        for validator in chain {
            if validator.apply(key, data, errors, context).is_err() {
                trace!(key = %key, ?phase, "validator chain stopped");
                break;
            }
        }
    }
}

/// Removes empty message lists and error-free branches from an error tree.
///
/// Inside a list of objects an error-free element is kept as `{}` so the
/// positions of the remaining errors still line up with the input; the list
/// itself is dropped when every element is error free.
/// Drops message-free entries beneath keys that carry messages themselves.
///
/// A list key such as `numbers` can hold its own messages while its element
/// keys are still seeded with empty lists. Left in place, those children would
/// turn the list's messages into a branch when the tree is rebuilt.
fn unshadow_errors(mut errors: ErrorMap) -> ErrorMap {
    let flagged: Vec<FlatKey> = errors
        .iter()
        .filter(|(_, messages)| !messages.is_empty())
        .map(|(key, _)| key.clone())
        .collect();
    errors.retain(|key, messages| {
        !messages.is_empty()
            || !flagged
                .iter()
                .any(|parent| parent.len() < key.len() && key.starts_with(parent))
    });
    errors
}

fn prune_errors(tree: Map<String, Value>) -> Map<String, Value> {
    tree.into_iter()
        .filter_map(|(name, value)| prune(value).map(|value| (name, value)))
        .collect()
}

fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let pruned = prune_errors(map);
            (!pruned.is_empty()).then_some(Value::Object(pruned))
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {
            let items: Vec<Value> = items
                .into_iter()
                .map(|item| prune(item).unwrap_or_else(|| Value::Object(Map::new())))
                .collect();
            let all_clear = items
                .iter()
                .all(|item| matches!(item, Value::Object(map) if map.is_empty()));
            (!all_clear).then_some(Value::Array(items))
        }
        Value::Array(items) => (!items.is_empty()).then_some(Value::Array(items)),
        other => Some(other),
    }
}
