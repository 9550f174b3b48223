//! Validators that consult the storage session or look across the record.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::datum::Datum;
use crate::error::ValidatorError;
use crate::model::{Cell, EntityKind};
use crate::path::{FlatKey, Segment};
use crate::validator::{push_error, Validator};

/// Requires the value to be the id of an existing `kind` row.
pub fn entity_id_exists(kind: EntityKind) -> Validator {
    Validator::value_context(move |value, context| {
        let id = value.to_text()?;
        let session = context
            .require_session()
            .map_err(|e| ValidatorError::invalid(e.to_string()))?;
        match session.get(&kind, &id) {
            Ok(Some(_)) => Ok(value),
            Ok(None) => Err(ValidatorError::invalid(format!("Not found: {}", kind.name()))),
            Err(e) => Err(ValidatorError::invalid(e.to_string())),
        }
    })
}

/// Rejects a name already used by another live `kind` row.
///
/// The row being edited is excluded. Its id is read from the sibling `id`
/// field, or from an object stored in the context under the kind's name.
pub fn name_unique(kind: EntityKind) -> Validator {
    Validator::context(move |key, data, errors, context| {
        let Some(name) = data.get(key).and_then(Datum::as_str).map(String::from) else {
            return Ok(());
        };
        let session = context
            .require_session()
            .map_err(|e| ValidatorError::invalid(e.to_string()))?;

        let own_id = context
            .value(kind.name())
            .and_then(|entity| entity.get("id"))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| {
                data.get(&key.truncate_end(1).push_field("id"))
                    .and_then(Datum::as_str)
                    .map(String::from)
            });

        let filter = [("name".to_string(), Cell::Text(name))];
        let existing = session
            .find_first(&kind, &filter)
            .map_err(|e| ValidatorError::invalid(e.to_string()))?;

        if let Some(row) = existing {
            let same_row = own_id.is_some() && row.id() == own_id.as_deref();
            if !same_row && row.state() != Some("deleted") {
                push_error(errors, key, "That name is already in use.");
            }
        }
        Ok(())
    })
}

/// Flags repeated `key_field` values among the live items of `list_field`.
///
/// Intended for a root `after` or `before` chain. Items whose `deleted`
/// field is truthy are skipped. Each duplicate is reported once against
/// `<list_field>_validation`.
pub fn duplicate_key(list_field: impl Into<String>, key_field: impl Into<String>) -> Validator {
    let list_field = list_field.into();
    let key_field = key_field.into();
    Validator::context(move |_, data, errors, _| {
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        for (key, value) in data.iter() {
            let [Segment::Field(list), Segment::Index(_), Segment::Field(field)] = key.as_slice() else {
                continue;
            };
            if *list != list_field || *field != key_field {
                continue;
            }
            let deleted = data
                .get(&key.truncate_end(1).push_field("deleted"))
                .map_or(false, |d| !d.is_empty());
            if deleted {
                continue;
            }
            if let Ok(text) = value.to_text() {
                *seen.entry(text).or_default() += 1;
            }
        }

        let target = FlatKey::from_field(format!("{list_field}_validation"));
        for (name, count) in seen {
            if count > 1 {
                push_error(errors, &target, format!("Duplicate key \"{name}\""));
            }
        }
        Ok(())
    })
}
