//! Presence checks, defaults and the routing of extra or unexpected input.

use serde_json::Value;

use crate::datum::Datum;
use crate::error::ValidatorError;
use crate::path::FlatKey;
use crate::validator::{push_error, FlatData, Patch, Validator};

const MISSING_VALUE: &str = "Missing value";

fn current(data: &FlatData, key: &FlatKey) -> Datum {
    data.get(key).cloned().unwrap_or_default()
}

/// Rejects the missing sentinel and stops the chain.
///
/// Null and empty strings pass; only a field the caller left out fails.
pub fn not_missing() -> Validator {
    Validator::context(|key, data, errors, _| {
        if current(data, key).is_missing() {
            push_error(errors, key, MISSING_VALUE);
            return Err(ValidatorError::stop());
        }
        Ok(())
    })
}

/// Rejects missing or empty values and stops the chain.
///
/// ```rust
/// use dictize::{validate, Context, Schema};
/// use dictize::validators::{not_empty, unicode_safe};
/// use serde_json::json;
///
/// let schema = Schema::new().field("name", [not_empty(), unicode_safe()]);
/// let outcome = validate(json!({}).as_object().unwrap(), &schema, &Context::new()).unwrap();
///
/// assert_eq!(json!(outcome.errors()), json!({"name": ["Missing value"]}));
/// ```
pub fn not_empty() -> Validator {
    Validator::context(|key, data, errors, _| {
        if current(data, key).is_empty() {
            push_error(errors, key, MISSING_VALUE);
            return Err(ValidatorError::stop());
        }
        Ok(())
    })
}

/// Drops the key from the output and stops the chain.
pub fn ignore() -> Validator {
    Validator::context(|key, data, _, _| {
        data.remove(key);
        Err(ValidatorError::stop())
    })
}

/// Drops a missing or null key and stops the chain; anything else continues.
pub fn ignore_missing() -> Validator {
    Validator::context(|key, data, _, _| {
        let value = current(data, key);
        if value.is_missing() || value.is_null() {
            data.remove(key);
            return Err(ValidatorError::stop());
        }
        Ok(())
    })
}

/// Drops a missing or empty key and stops the chain.
pub fn ignore_empty() -> Validator {
    Validator::context(|key, data, _, _| {
        if current(data, key).is_empty() {
            data.remove(key);
            return Err(ValidatorError::stop());
        }
        Ok(())
    })
}

/// Drops the key and records an error if it carried a value.
///
/// On the junk key the message names every unrecognised input key.
pub fn empty() -> Validator {
    Validator::context(|key, data, errors, _| {
        let value = data.remove(key).unwrap_or_default();
        if value.is_empty() {
            return Ok(());
        }
        let name = match (value.as_value(), key.last()) {
            (Some(Value::Object(junk)), Some(last)) if last.as_control().is_some() => junk
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            (_, Some(last)) => last.name(),
            (_, None) => String::new(),
        };
        push_error(errors, key, format!("The input field {name} was not expected."));
        Ok(())
    })
}

/// Moves every entry of an extras bucket up to a sibling key of the bucket.
///
/// ```rust
/// use dictize::{validate, Context, Schema};
/// use dictize::validators::keep_extras;
/// use serde_json::json;
///
/// let schema = Schema::new().field("name", []).extras([keep_extras()]);
/// let record = json!({"name": "fred", "colour": "red"});
/// let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
///
/// assert_eq!(json!(outcome.data()), json!({"name": "fred", "colour": "red"}));
/// ```
pub fn keep_extras() -> Validator {
    Validator::context(|key, data, _, _| {
        let parent = key.truncate_end(1);
        let bucket = data.get(key).and_then(|d| d.as_value()).and_then(Value::as_object);
        let patch = bucket
            .into_iter()
            .flatten()
            .fold(Patch::new().remove(key.clone()), |patch, (name, value)| {
                patch.set(parent.push_field(name.as_str()), Datum::Value(value.clone()))
            });
        patch.apply(data);
        Ok(())
    })
}

/// Supplies `value` when the field is missing, null or the empty string.
pub fn default(value: Value) -> Validator {
    Validator::context(move |key, data, _, _| {
        let blank = match current(data, key) {
            Datum::Missing => true,
            Datum::Value(Value::Null) => true,
            Datum::Value(Value::String(s)) => s.is_empty(),
            Datum::Value(_) => false,
        };
        if blank {
            data.insert(key.clone(), Datum::Value(value.clone()));
        }
        Ok(())
    })
}

/// Copies the sibling field `other` when this field is empty.
pub fn if_empty_same_as(other: impl Into<String>) -> Validator {
    let other = other.into();
    Validator::context(move |key, data, _, _| {
        if current(data, key).is_empty() {
            let sibling = current(data, &key.truncate_end(1).push_field(other.as_str()));
            data.insert(key.clone(), sibling);
        }
        Ok(())
    })
}

/// Requires both this field and the sibling field `other` to be non-empty.
pub fn both_not_empty(other: impl Into<String>) -> Validator {
    let other = other.into();
    Validator::context(move |key, data, errors, _| {
        let sibling = current(data, &key.truncate_end(1).push_field(other.as_str()));
        if current(data, key).is_empty() || sibling.is_empty() {
            push_error(errors, key, MISSING_VALUE);
            return Err(ValidatorError::stop());
        }
        Ok(())
    })
}
