//! Naming rules for entities and tags.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::datum::Datum;
use crate::error::{Invalid, ValidatorError};
use crate::path::{FlatKey, Segment};
use crate::validator::{push_error, Patch, Validator};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_TAG_LENGTH: usize = 2;
pub const MAX_TAG_LENGTH: usize = 100;

const RESERVED_NAMES: [&str; 3] = ["new", "edit", "search"];

static NAME_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_\-]*$").expect("name pattern is valid"));

static TAG_NAME_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w \-.]*$").expect("tag pattern is valid"));

/// Checks a URL-safe entity name.
///
/// ```rust
/// use dictize::{validate, Context, Schema};
/// use dictize::validators::name_validator;
/// use serde_json::json;
///
/// let schema = Schema::new().field("name", [name_validator()]);
/// let record = json!({"name": "Census"});
/// let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
///
/// assert_eq!(
///     json!(outcome.errors()),
///     json!({"name": ["Must be purely lowercase alphanumeric (ascii) characters and these symbols: -_"]})
/// );
/// ```
pub fn name_validator() -> Validator {
    Validator::converter(|value| {
        check_name(&value)?;
        Ok(value)
    })
}

fn check_name(value: &Datum) -> Result<(), Invalid> {
    let Some(name) = value.as_str() else {
        return Err(Invalid::new("Names must be strings"));
    };
    if RESERVED_NAMES.contains(&name) {
        return Err(Invalid::new("That name cannot be used"));
    }
    let length = name.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(Invalid::new(format!(
            "Must be at least {MIN_NAME_LENGTH} characters long"
        )));
    }
    if length > MAX_NAME_LENGTH {
        return Err(Invalid::new(format!(
            "Name must be a maximum of {MAX_NAME_LENGTH} characters long"
        )));
    }
    if !NAME_MATCH.is_match(name) {
        return Err(Invalid::new(
            "Must be purely lowercase alphanumeric (ascii) characters and these symbols: -_",
        ));
    }
    Ok(())
}

/// Checks a tag's length.
pub fn tag_length_validator() -> Validator {
    Validator::converter(|value| {
        check_tag_length(&value.to_text()?)?;
        Ok(value)
    })
}

/// Checks a tag's characters.
pub fn tag_name_validator() -> Validator {
    Validator::converter(|value| {
        check_tag_name(&value.to_text()?)?;
        Ok(value)
    })
}

fn check_tag_length(tag: &str) -> Result<(), Invalid> {
    let length = tag.chars().count();
    if length < MIN_TAG_LENGTH {
        return Err(Invalid::new(format!(
            "Tag \"{tag}\" length is less than minimum {MIN_TAG_LENGTH}"
        )));
    }
    if length > MAX_TAG_LENGTH {
        return Err(Invalid::new(format!(
            "Tag \"{tag}\" length is more than maximum {MAX_TAG_LENGTH}"
        )));
    }
    Ok(())
}

fn check_tag_name(tag: &str) -> Result<(), Invalid> {
    if TAG_NAME_MATCH.is_match(tag) {
        Ok(())
    } else {
        Err(Invalid::new(format!(
            "Tag \"{tag}\" must be alphanumeric characters or symbols: -_."
        )))
    }
}

/// Splits a comma-separated tag string into `list_field` entries.
///
/// Each tag becomes `(list_field, n, "name")`, numbered after the highest
/// index already present. A list of strings is accepted as-is. Every tag is
/// then checked for length and characters; each failure is recorded against
/// the tag string's own key.
///
/// ```rust
/// use dictize::{validate, Context, Schema};
/// use dictize::validators::{ignore_missing, tag_string_convert};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .field("tag_string", [ignore_missing(), tag_string_convert("tags")])
///     .sub_schema("tags", Schema::new().field("name", []));
///
/// let record = json!({"tag_string": "economy, health ,"});
/// let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
///
/// assert_eq!(
///     outcome.data()["tags"],
///     json!([{"name": "economy"}, {"name": "health"}])
/// );
/// ```
pub fn tag_string_convert(list_field: impl Into<String>) -> Validator {
    let list_field = list_field.into();
    Validator::context(move |key, data, errors, _| {
        let tags: Vec<String> = match data.get(key).and_then(Datum::as_value) {
            Some(Value::String(text)) => text
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Datum::Value(item.clone()).to_text())
                .collect::<Result<_, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(ValidatorError::invalid("Tags must be a string or a list")),
        };

        let next_index = data
            .keys()
            .filter(|k| k.len() == 3 && k.first().and_then(Segment::as_field) == Some(list_field.as_str()))
            .filter_map(|k| match k.as_slice().get(1) {
                Some(Segment::Index(i)) => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        let patch = tags.iter().enumerate().fold(Patch::new(), |patch, (offset, tag)| {
            patch.set(
                FlatKey::from_field(list_field.as_str())
                    .push_index(next_index + offset)
                    .push_field("name"),
                Datum::from(tag.as_str()),
            )
        });
        patch.apply(data);

        for tag in &tags {
            let checks = check_tag_length(tag).and_then(|()| check_tag_name(tag));
            if let Err(invalid) = checks {
                push_error(errors, key, invalid.message);
            }
        }
        Ok(())
    })
}
