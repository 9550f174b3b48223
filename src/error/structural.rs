//! Errors that abort a whole call instead of being recorded per field.

use crate::path::FlatKey;

/// The input is malformed at a level per-field validators cannot address.
///
/// Callers should treat this as a bad request, distinct from ordinary field
/// validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// A list that starts with objects contains something else.
    #[error("Values in lists need to be dicts (at {key})")]
    NonDictListItem {
        /// The key of the offending list item.
        key: FlatKey,
    },

    /// A value other than a list of objects was placed against a sub-schema.
    #[error("Only lists of dicts can be placed against subschema {key}, not {found}")]
    NotAListOfDicts {
        /// The key of the offending value.
        key: FlatKey,
        /// The JSON type name of the offending value.
        found: &'static str,
    },

    /// The record handed to the engine is not an object.
    #[error("expected an object at the top level, got {found}")]
    NotAnObject {
        /// The JSON type name of the offending value.
        found: &'static str,
    },
}

/// Failures while reading or staging rows through the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The context carries no session to talk to.
    #[error("no storage session in context")]
    NoSession,

    /// A value cannot be stored in a column of the given type.
    #[error("cannot store {found} in {kind}.{column} ({expected})")]
    Coercion {
        /// Entity kind name.
        kind: String,
        /// Column name.
        column: String,
        /// Declared column type.
        expected: &'static str,
        /// The JSON type name (or text) that failed to convert.
        found: String,
    },

    /// The row's kind is not the kind it is being saved as.
    #[error("row of kind '{found}' cannot be stored as '{expected}'")]
    KindMismatch {
        /// Kind the caller asked for.
        expected: String,
        /// Kind of the row.
        found: String,
    },

    /// The storage backend reported a failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}
