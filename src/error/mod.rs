//! Error types for validation, structural and storage failures.
//!
//! This module provides the per-field failure types validators raise
//! ([`Invalid`], [`StopOnError`]), the accumulated field errors reported to
//! callers ([`FieldError`], [`FieldErrors`]), and the errors that abort a call
//! outright ([`DataError`], [`StoreError`]).

mod field_error;
mod invalid;
mod structural;

pub use field_error::{FieldError, FieldErrors};
pub use invalid::{Invalid, StopOnError, ValidatorError};
pub use structural::{DataError, StoreError};
