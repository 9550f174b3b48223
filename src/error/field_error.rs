//! Accumulated field error types.
//!
//! This module provides [`FieldError`] for a single message recorded against a
//! flat key and [`FieldErrors`] for a non-empty collection of them.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::FlatKey;

/// A single validation message recorded against a field.
///
/// # Example
///
/// ```rust
/// use dictize::{flat_key, FieldError};
///
/// let error = FieldError::new(flat_key!["resources", 0, "url"], "Missing value")
///     .with_code("missing");
///
/// assert_eq!(error.to_string(), "resources[0].url: Missing value");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The flat key the message was recorded against.
    pub path: FlatKey,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
}

impl FieldError {
    /// Creates a new field error. The code defaults to `invalid`.
    pub fn new(path: FlatKey, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: "invalid".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for FieldError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldError>();
    assert_sync::<FieldError>();
};

/// A non-empty collection of field errors.
///
/// `FieldErrors` wraps a `NonEmptyVec<FieldError>` so a failed
/// `Validation<T, FieldErrors>` always carries at least one message.
///
/// ```rust
/// use dictize::{FieldError, FieldErrors, FlatKey};
/// use stillwater::prelude::*;
///
/// let a = FieldErrors::single(FieldError::new(FlatKey::from_field("name"), "Missing value"));
/// let b = FieldErrors::single(FieldError::new(FlatKey::from_field("age"), "Invalid integer"));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    /// Creates a `FieldErrors` containing a single error.
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `FieldErrors` from a vec, or `None` if it is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        let mut iter = errors.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::single(first), |acc, error| {
            acc.combine(Self::single(error))
        }))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns all errors recorded against `path`.
    pub fn at_path(&self, path: &FlatKey) -> Vec<&FieldError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors with the given code.
    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<FieldError>`.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}
