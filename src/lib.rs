//! # Dictize
//!
//! Flattening, schema-driven validation and row persistence for nested
//! catalogue records (datasets with lists of resources, tags, extras...).
//!
//! ## Overview
//!
//! A record is flattened into a map keyed by [`FlatKey`] (`resources[0].url`).
//! The nested [`Schema`] is expanded against the keys actually present, every
//! validator chain runs in a fixed phase order, and both the converted data
//! and the collected errors are rebuilt into nested form. Every error is kept,
//! not just the first.
//!
//! Rows go the other way through [`table_dictize`] and come back through
//! [`table_dict_save`], which talks to storage only through the [`Session`]
//! trait.
//!
//! ## Core Types
//!
//! - [`FlatKey`]: the address of a value in a flattened record
//! - [`Datum`]: a value, or the [`Datum::Missing`] sentinel
//! - [`Schema`]: nested validator chains plus `before`/`after`/`extras`/`junk`
//! - [`Validator`]: a validator tagged with its calling convention
//! - [`Context`]: per-call session, flags and opaque values
//! - [`ValidationOutcome`]: converted data, error tree and flat [`FieldError`]s
//!
//! ## Example
//!
//! ```rust
//! use dictize::{validate, Context, Schema};
//! use dictize::validators::{convert_int, default, ignore_missing, not_empty};
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
//!             .field("code", [not_empty()]),
//!     );
//!
//! let record = json!({
//!     "name": "fred",
//!     "age": "32",
//!     "numbers": [{"number": "01234", "code": "+44"}, {"number": "5"}]
//! });
//! let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
//!
//! assert_eq!(json!(outcome.data()), json!({
//!     "name": "fred",
//!     "age": 32,
//!     "gender": "female",
//!     "numbers": [{"number": 1234, "code": "+44"}, {"number": 5}]
//! }));
//! assert_eq!(json!(outcome.errors()), json!({
//!     "numbers": [{}, {"code": ["Missing value"]}]
//! }));
//! ```

pub mod config;
pub mod context;
pub mod dates;
pub mod datum;
pub mod dictize;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod model;
pub mod path;
pub mod registry;
pub mod save;
pub mod schema;
pub mod validator;
pub mod validators;

pub use config::{ConfigError, EngineConfig};
pub use context::Context;
pub use datum::Datum;
pub use dictize::{by_field, obj_dict_dictize, obj_list_dictize, table_dictize, Listed};
pub use engine::{validate, validate_batch, validate_flat, validate_value, Phase, ValidationOutcome};
pub use error::{DataError, FieldError, FieldErrors, Invalid, StopOnError, StoreError, ValidatorError};
pub use flatten::{flatten_dict, flatten_list, unflatten, FlatMap};
pub use model::{Cell, ColumnType, EntityKind, EntityRow, MemorySession, Session};
pub use path::{Control, FlatKey, Segment};
pub use registry::{RegistryError, SchemaRegistry};
pub use save::{get_unique_constraints, table_dict_save};
pub use schema::{FullSchema, Schema, SchemaNode};
pub use validator::{push_error, ErrorMap, FlatData, Patch, StatefulValidator, Validator};

/// Type alias for validation results using FieldErrors
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
    assert_send::<Context>();
    assert_sync::<Context>();
};
