//! Signals raised by validators.

/// A single-field validation failure carrying one human-readable message.
///
/// Raised by validators and caught at the dispatch boundary, where the
/// message is appended to the field's error list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Invalid {
    /// The message reported for the field.
    pub message: String,
}

impl Invalid {
    /// Creates a new invalid signal with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message used whenever a missing value is coerced or required.
    pub fn missing() -> Self {
        Self::new("Missing value")
    }
}

/// Aborts the remaining validators of the current key's chain.
///
/// This is control flow rather than a failure: the engine moves on to the
/// next key of the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("validator chain stopped")]
pub struct StopOnError;

/// What a validator can raise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// The value is invalid; the message is recorded and the chain continues.
    #[error(transparent)]
    Invalid(#[from] Invalid),

    /// The rest of the key's chain is skipped.
    #[error(transparent)]
    Stop(#[from] StopOnError),
}

impl ValidatorError {
    /// Shorthand for `ValidatorError::Invalid(Invalid::new(message))`.
    pub fn invalid(message: impl Into<String>) -> Self {
        ValidatorError::Invalid(Invalid::new(message))
    }

    /// Shorthand for `ValidatorError::Stop(StopOnError)`.
    pub fn stop() -> Self {
        ValidatorError::Stop(StopOnError)
    }
}
