//! The standard validator library.
//!
//! Every function here returns a [`Validator`](crate::Validator) already
//! tagged with its calling convention, ready to drop into a schema chain:
//!
//! ```rust
//! use dictize::Schema;
//! use dictize::validators::{ignore_missing, isodate, name_validator, not_empty, unicode_safe};
//!
//! let schema = Schema::new()
//!     .field("name", [not_empty(), unicode_safe(), name_validator()])
//!     .field("metadata_created", [ignore_missing(), isodate()]);
//! ```
//!
//! - [`navl`]: presence, defaults and routing of extra or unexpected fields
//! - [`convert`]: type conversions
//! - [`names`]: entity and tag name rules
//! - [`lookup`]: checks that consult the storage session

pub mod convert;
pub mod lookup;
pub mod names;
pub mod navl;

pub use convert::{
    boolean_validator, convert_int, int_validator, isodate, natural_number_validator, strip_value,
    unicode_safe, OneOf,
};
pub use lookup::{duplicate_key, entity_id_exists, name_unique};
pub use names::{
    name_validator, tag_length_validator, tag_name_validator, tag_string_convert,
    MAX_NAME_LENGTH, MAX_TAG_LENGTH, MIN_NAME_LENGTH, MIN_TAG_LENGTH,
};
pub use navl::{
    both_not_empty, default, empty, if_empty_same_as, ignore, ignore_empty, ignore_missing,
    keep_extras, not_empty, not_missing,
};
