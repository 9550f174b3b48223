//! Per-call context threaded through validators and dictizers.
//!
//! A [`Context`] carries the storage session, behaviour flags and any opaque
//! entity references a caller wants validators to see. The engine clones the
//! caller's context for each call so nothing a validator writes leaks back.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::model::Session;

/// Context for one validate, dictize or save call.
///
/// ```rust
/// use std::sync::Arc;
/// use dictize::{Context, MemorySession};
/// use serde_json::json;
///
/// let context = Context::new()
///     .with_session(Arc::new(MemorySession::new()))
///     .with_value("user", json!("alice"))
///     .pending(true);
///
/// assert!(context.session().is_some());
/// assert!(context.is_pending());
/// assert!(context.is_active());
/// assert_eq!(context.value("user"), Some(&json!("alice")));
/// ```
#[derive(Clone)]
pub struct Context {
    session: Option<Arc<dyn Session>>,
    schema_keys: Vec<String>,
    values: Map<String, Value>,
    pending: bool,
    allow_partial_update: bool,
    active: bool,
    with_capacity: bool,
    fix_partial_updates: bool,
    metadata_modified: Option<NaiveDateTime>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            session: None,
            schema_keys: Vec::new(),
            values: Map::new(),
            pending: false,
            allow_partial_update: false,
            active: true,
            with_capacity: false,
            fix_partial_updates: true,
            metadata_modified: None,
        }
    }
}

impl Context {
    /// Creates a context with default flags and no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the engine-wide settings.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.fix_partial_updates = config.fix_partial_updates;
        self
    }

    /// Attaches a storage session.
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Stores an opaque value for validators to read.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Saves rows as pending revisions.
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    /// Marks the call as a partial update.
    pub fn allow_partial_update(mut self, allow: bool) -> Self {
        self.allow_partial_update = allow;
        self
    }

    /// Whether list dictizing drops rows that are not active or pending.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether list dictizing expects `(row, capacity)` pairs.
    pub fn with_capacity(mut self, with_capacity: bool) -> Self {
        self.with_capacity = with_capacity;
        self
    }

    /// Whether empty top-level lists dropped by validation are restored.
    pub fn fix_partial_updates(mut self, fix: bool) -> Self {
        self.fix_partial_updates = fix;
        self
    }

    /// The attached session, if any.
    pub fn session(&self) -> Option<&Arc<dyn Session>> {
        self.session.as_ref()
    }

    /// The attached session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSession`] when none is attached.
    pub fn require_session(&self) -> Result<&dyn Session, StoreError> {
        self.session.as_deref().ok_or(StoreError::NoSession)
    }

    /// Top-level field names of the schema currently being validated.
    pub fn schema_keys(&self) -> &[String] {
        &self.schema_keys
    }

    pub(crate) fn set_schema_keys(&mut self, keys: Vec<String>) {
        self.schema_keys = keys;
    }

    /// Reads an opaque value.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Writes an opaque value. Validators may use this to pass data forward.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Whether saved rows are staged as pending.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether callers may omit fields they do not change.
    pub fn is_partial_update(&self) -> bool {
        self.allow_partial_update
    }

    /// Whether list dictize drops inactive rows.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether list dictize adds each row's capacity.
    pub fn is_with_capacity(&self) -> bool {
        self.with_capacity
    }

    /// Whether empty top-level lists are restored after validation.
    pub fn fixes_partial_updates(&self) -> bool {
        self.fix_partial_updates
    }

    /// The latest revision timestamp seen while dictizing.
    pub fn metadata_modified(&self) -> Option<NaiveDateTime> {
        self.metadata_modified
    }

    /// Raises the modification watermark to `timestamp` if it is later.
    pub fn record_modified(&mut self, timestamp: NaiveDateTime) {
        self.metadata_modified = Some(match self.metadata_modified {
            Some(current) => current.max(timestamp),
            None => timestamp,
        });
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("session", &self.session.is_some())
            .field("schema_keys", &self.schema_keys)
            .field("values", &self.values)
            .field("pending", &self.pending)
            .field("allow_partial_update", &self.allow_partial_update)
            .field("active", &self.active)
            .field("with_capacity", &self.with_capacity)
            .field("fix_partial_updates", &self.fix_partial_updates)
            .field("metadata_modified", &self.metadata_modified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let context = Context::default();
        assert!(context.is_active());
        assert!(context.fixes_partial_updates());
        assert!(!context.is_pending());
        assert!(!context.is_with_capacity());
        assert!(context.session().is_none());
        assert_eq!(context.require_session().err(), Some(StoreError::NoSession));
    }

    #[test]
    fn test_config_sets_fix_partial_updates() {
        let config = EngineConfig {
            fix_partial_updates: false,
        };
        assert!(!Context::new().with_config(&config).fixes_partial_updates());
    }

    #[test]
    fn test_watermark_only_moves_forward() {
        let mut context = Context::new();
        context.record_modified(at(10));
        context.record_modified(at(8));
        assert_eq!(context.metadata_modified(), Some(at(10)));
        context.record_modified(at(12));
        assert_eq!(context.metadata_modified(), Some(at(12)));
    }

    #[test]
    fn test_clones_are_independent() {
        let original = Context::new().with_value("a", Value::from(1));
        let mut copy = original.clone();
        copy.set_value("a", Value::from(2));
        copy.set_schema_keys(vec!["name".into()]);

        assert_eq!(original.value("a"), Some(&Value::from(1)));
        assert!(original.schema_keys().is_empty());
    }
}
