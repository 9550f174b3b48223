//! Validator shapes and the uniform dispatch over them.
//!
//! Every validator is tagged with its calling convention when it is built, so
//! the engine never has to guess how to call it:
//!
//! | Variant | Receives | Result |
//! |---|---|---|
//! | [`Validator::Stateful`] | the value and the context | replaces the value |
//! | [`Validator::Converter`] | the value | replaces the value |
//! | [`Validator::ValueContext`] | the value and the context | replaces the value |
//! | [`Validator::Context`] | the key, the whole record, the error map and the context | mutates in place |
//!
//! A key that is absent from the record is presented to value validators as
//! [`Datum::Missing`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::datum::Datum;
use crate::error::{Invalid, StopOnError, ValidatorError};
use crate::path::FlatKey;

/// A flattened record under validation.
pub type FlatData = BTreeMap<FlatKey, Datum>;

/// Error messages recorded per flat key.
pub type ErrorMap = BTreeMap<FlatKey, Vec<String>>;

type ConvertFn = dyn Fn(Datum) -> Result<Datum, ValidatorError> + Send + Sync;
type ValueContextFn = dyn Fn(Datum, &Context) -> Result<Datum, ValidatorError> + Send + Sync;
type ContextFn = dyn Fn(&FlatKey, &mut FlatData, &mut ErrorMap, &mut Context) -> Result<(), ValidatorError>
    + Send
    + Sync;

/// An object-style validator that converts a value with access to the context.
///
/// ```rust
/// use dictize::{Context, Datum, Invalid, StatefulValidator};
///
/// struct Uppercase;
///
/// impl StatefulValidator for Uppercase {
///     fn to_python(&self, value: &Datum, _state: &Context) -> Result<Datum, Invalid> {
///         Ok(Datum::from(value.to_text()?.to_uppercase()))
///     }
/// }
///
/// let out = Uppercase.to_python(&Datum::from("abc"), &Context::default()).unwrap();
/// assert_eq!(out, Datum::from("ABC"));
/// ```
pub trait StatefulValidator: Send + Sync {
    /// Converts `value`, or rejects it with a message.
    fn to_python(&self, value: &Datum, state: &Context) -> Result<Datum, Invalid>;
}

/// A validator attached to a schema key.
#[derive(Clone)]
pub enum Validator {
    /// An object exposing [`StatefulValidator::to_python`].
    Stateful(Arc<dyn StatefulValidator>),
    /// A value-only converter.
    Converter(Arc<ConvertFn>),
    /// A value converter that also reads the context.
    ValueContext(Arc<ValueContextFn>),
    /// A full validator with access to the whole record and error map.
    Context(Arc<ContextFn>),
}

impl Validator {
    /// Wraps a [`StatefulValidator`].
    pub fn stateful<V: StatefulValidator + 'static>(validator: V) -> Self {
        Validator::Stateful(Arc::new(validator))
    }

    /// Wraps a value-only converter.
    pub fn converter<F>(f: F) -> Self
    where
        F: Fn(Datum) -> Result<Datum, ValidatorError> + Send + Sync + 'static,
    {
        Validator::Converter(Arc::new(f))
    }

    /// Wraps a value converter that reads the context.
    pub fn value_context<F>(f: F) -> Self
    where
        F: Fn(Datum, &Context) -> Result<Datum, ValidatorError> + Send + Sync + 'static,
    {
        Validator::ValueContext(Arc::new(f))
    }

    /// Wraps a full validator.
    ///
    /// ```rust
    /// use dictize::{Datum, Validator};
    ///
    /// // Copies the value of `title` into `name` when `name` is blank.
    /// let fill_name = Validator::context(|key, data, _errors, _ctx| {
    ///     let blank = data.get(key).map_or(true, Datum::is_empty);
    ///     if blank {
    ///         let title = data.get(&key.truncate_end(1).push_field("title")).cloned();
    ///         data.insert(key.clone(), title.unwrap_or_default());
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(fill_name.kind(), "context");
    /// ```
    pub fn context<F>(f: F) -> Self
    where
        F: Fn(&FlatKey, &mut FlatData, &mut ErrorMap, &mut Context) -> Result<(), ValidatorError>
            + Send
            + Sync
            + 'static,
    {
        Validator::Context(Arc::new(f))
    }

    /// Short name of the calling convention.
    pub fn kind(&self) -> &'static str {
        match self {
            Validator::Stateful(_) => "stateful",
            Validator::Converter(_) => "converter",
            Validator::ValueContext(_) => "value_context",
            Validator::Context(_) => "context",
        }
    }

    /// Runs the validator against `key`.
    ///
    /// Converted values are written back under `key`. An [`Invalid`] is
    /// appended to the key's error list and the chain goes on.
    ///
    /// # Errors
    ///
    /// Returns [`StopOnError`] when the rest of the key's chain must be skipped.
    pub fn apply(
        &self,
        key: &FlatKey,
        data: &mut FlatData,
        errors: &mut ErrorMap,
        context: &mut Context,
    ) -> Result<(), StopOnError> {
        if let Validator::Context(f) = self {
            return settle(f(key, data, errors, context), key, errors);
        }
        let current = data.get(key).cloned().unwrap_or_default();
        let converted = match self {
            Validator::Stateful(v) => v.to_python(&current, context).map_err(ValidatorError::from),
            Validator::Converter(f) => f(current),
            Validator::ValueContext(f) => f(current, context),
            Validator::Context(_) => return Ok(()),
        };
        let written = converted.map(|value| {
            data.insert(key.clone(), value);
        });
        settle(written, key, errors)
    }
}

fn settle(
    outcome: Result<(), ValidatorError>,
    key: &FlatKey,
    errors: &mut ErrorMap,
) -> Result<(), StopOnError> {
    match outcome {
        Ok(()) => Ok(()),
        Err(ValidatorError::Invalid(invalid)) => {
            push_error(errors, key, invalid.message);
            Ok(())
        }
        Err(ValidatorError::Stop(stop)) => Err(stop),
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator::{}", self.kind())
    }
}

/// Appends `message` to the error list of `key`.
pub fn push_error(errors: &mut ErrorMap, key: &FlatKey, message: impl Into<String>) {
    errors.entry(key.clone()).or_default().push(message.into());
}

/// A batch of writes and removals a validator makes to keys other than its own.
///
/// ```rust
/// use dictize::{flat_key, Datum, FlatData, Patch};
///
/// let mut data = FlatData::new();
/// data.insert(flat_key!["tag_string"], Datum::from("a"));
///
/// Patch::new()
///     .set(flat_key!["tags", 0, "name"], Datum::from("a"))
///     .remove(flat_key!["tag_string"])
///     .apply(&mut data);
///
/// assert_eq!(data.len(), 1);
/// assert_eq!(data[&flat_key!["tags", 0, "name"]], Datum::from("a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    writes: Vec<(FlatKey, Datum)>,
    removals: Vec<FlatKey>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a write.
    pub fn set(mut self, key: FlatKey, value: Datum) -> Self {
        self.writes.push((key, value));
        self
    }

    /// Records a removal. Removals are applied before writes.
    pub fn remove(mut self, key: FlatKey) -> Self {
        self.removals.push(key);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.removals.is_empty()
    }

    /// Keys written by this patch.
    pub fn written_keys(&self) -> impl Iterator<Item = &FlatKey> {
        self.writes.iter().map(|(key, _)| key)
    }

    /// Applies the patch to a record.
    pub fn apply(self, data: &mut FlatData) {
        for key in self.removals {
            data.remove(&key);
        }
        data.extend(self.writes);
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_key;
    use serde_json::json;

    struct Shout;

    impl StatefulValidator for Shout {
        fn to_python(&self, value: &Datum, _state: &Context) -> Result<Datum, Invalid> {
            Ok(Datum::from(format!("{}!", value.to_text()?)))
        }
    }

    fn run(validator: &Validator, key: &FlatKey, data: &mut FlatData) -> (ErrorMap, Result<(), StopOnError>) {
        let mut errors = ErrorMap::new();
        let mut context = Context::default();
        let outcome = validator.apply(key, data, &mut errors, &mut context);
        (errors, outcome)
    }

    #[test]
    fn test_converter_writes_back() {
        let key = flat_key!["age"];
        let mut data = FlatData::from([(key.clone(), Datum::from("32"))]);
        let double = Validator::converter(|value| Ok(Datum::from(value.to_int()? * 2)));

        let (errors, outcome) = run(&double, &key, &mut data);
        assert!(outcome.is_ok());
        assert!(errors.is_empty());
        assert_eq!(data[&key], Datum::from(json!(64)));
    }

    #[test]
    fn test_invalid_is_recorded_and_chain_continues() {
        let key = flat_key!["age"];
        let mut data = FlatData::from([(key.clone(), Datum::from("abc"))]);
        let to_int = Validator::converter(|value| Ok(Datum::from(value.to_int()?)));

        let (errors, outcome) = run(&to_int, &key, &mut data);
        assert!(outcome.is_ok());
        assert_eq!(errors[&key], vec!["Please enter an integer value".to_string()]);
        assert_eq!(data[&key], Datum::from("abc"));
    }

    #[test]
    fn test_absent_key_is_presented_as_missing() {
        let key = flat_key!["age"];
        let mut data = FlatData::new();
        let seen = Validator::value_context(|value, _ctx| {
            assert!(value.is_missing());
            Ok(Datum::from("filled"))
        });

        let (_, outcome) = run(&seen, &key, &mut data);
        assert!(outcome.is_ok());
        assert_eq!(data[&key], Datum::from("filled"));
    }

    #[test]
    fn test_stop_is_propagated() {
        let key = flat_key!["name"];
        let mut data = FlatData::new();
        let stop = Validator::context(|key, _data, errors, _ctx| {
            push_error(errors, key, "Missing value");
            Err(ValidatorError::stop())
        });

        let (errors, outcome) = run(&stop, &key, &mut data);
        assert_eq!(outcome, Err(StopOnError));
        assert_eq!(errors[&key].len(), 1);
    }

    #[test]
    fn test_stateful_dispatch() {
        let key = flat_key!["name"];
        let mut data = FlatData::from([(key.clone(), Datum::from("hi"))]);

        let (_, outcome) = run(&Validator::stateful(Shout), &key, &mut data);
        assert!(outcome.is_ok());
        assert_eq!(data[&key], Datum::from("hi!"));

        let missing_key = flat_key!["other"];
        let (errors, _) = run(&Validator::stateful(Shout), &missing_key, &mut data);
        assert_eq!(errors[&missing_key], vec!["Missing value".to_string()]);
    }

    #[test]
    fn test_patch_removes_before_writing() {
        let key = flat_key!["a"];
        let mut data = FlatData::from([(key.clone(), Datum::from("old"))]);
        let patch = Patch::new().set(key.clone(), Datum::from("new")).remove(key.clone());
        assert!(!patch.is_empty());
        assert_eq!(patch.written_keys().count(), 1);

        patch.apply(&mut data);
        assert_eq!(data[&key], Datum::from("new"));
    }
}
