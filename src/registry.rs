//! Named schema storage.
//!
//! This module provides the [`SchemaRegistry`] type that keeps one schema per
//! entity name (package, group, tag...) so callers can look them up and
//! validate against them by name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::engine::{validate, ValidationOutcome};
use crate::error::DataError;
use crate::schema::Schema;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<Schema>>>>;

/// A thread-safe registry of named schemas.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Multiple threads can look up and validate concurrently
/// - Registration is serialized
/// - Clones share the same storage
///
/// # Example
///
/// ```rust
/// use dictize::{Context, Schema, SchemaRegistry};
/// use dictize::validators::{name_validator, not_empty};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register("group", Schema::new().field("name", [not_empty(), name_validator()]))
///     .unwrap();
///
/// let record = json!({"name": "health"});
/// let outcome = registry
///     .validate("group", record.as_object().unwrap(), &Context::new())
///     .unwrap();
/// assert!(outcome.is_valid());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already taken.
    pub fn register(&self, name: impl Into<String>, schema: Schema) -> Result<(), RegistryError> {
        let name = name.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Retrieves a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Validates a record against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` for an unknown name, or
    /// `RegistryError::Data` when the record is structurally unusable.
    pub fn validate(
        &self,
        schema_name: &str,
        data: &Map<String, Value>,
        context: &Context,
    ) -> Result<ValidationOutcome, RegistryError> {
        let schema = self
            .get(schema_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_name.to_string()))?;
        Ok(validate(data, &schema, context)?)
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    /// The record could not be validated at all.
    #[error(transparent)]
    Data(#[from] DataError),
}
