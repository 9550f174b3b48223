//! Type conversions.

use serde_json::Value;

use crate::context::Context;
use crate::dates::{isoformat, parse_date_str};
use crate::datum::Datum;
use crate::error::{Invalid, ValidatorError};
use crate::validator::{StatefulValidator, Validator};

const TRUTHY: [&str; 5] = ["true", "yes", "t", "y", "1"];

/// Converts to an integer, or fails with "Please enter an integer value".
pub fn convert_int() -> Validator {
    Validator::converter(|value| Ok(Datum::from(value.to_int()?)))
}

/// Accepts whole numbers only.
///
/// Blank strings become null; floats with a fractional part and unparseable
/// strings fail with "Invalid integer".
pub fn int_validator() -> Validator {
    Validator::converter(to_whole_number)
}

fn to_whole_number(value: Datum) -> Result<Datum, ValidatorError> {
    let invalid = || ValidatorError::invalid("Invalid integer");
    match value {
        Datum::Missing => Err(Invalid::missing().into()),
        Datum::Value(Value::Bool(b)) => Ok(Datum::from(i64::from(b))),
        Datum::Value(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Datum::from(i)),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Datum::from(f as i64))
                .ok_or_else(invalid),
        },
        Datum::Value(Value::String(s)) if s.trim().is_empty() => Ok(Datum::Value(Value::Null)),
        Datum::Value(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Datum::from)
            .map_err(|_| invalid()),
        Datum::Value(_) => Err(invalid()),
    }
}

/// Accepts whole numbers that are zero or greater.
pub fn natural_number_validator() -> Validator {
    Validator::converter(|value| {
        let number = to_whole_number(value)?;
        match number.as_value().and_then(Value::as_i64) {
            Some(n) if n < 0 => Err(ValidatorError::invalid("Must be a natural number")),
            _ => Ok(number),
        }
    })
}

/// Reads a flag. Missing and null are false; strings are true only for
/// `true`, `yes`, `t`, `y` or `1` in any case.
pub fn boolean_validator() -> Validator {
    Validator::converter(|value| {
        let flag = match &value {
            Datum::Missing | Datum::Value(Value::Null) => false,
            Datum::Value(Value::Bool(b)) => *b,
            other => {
                let text = other.to_text()?.to_lowercase();
                TRUTHY.contains(&text.as_str())
            }
        };
        Ok(Datum::from(flag))
    })
}

/// Coerces the value to text.
pub fn unicode_safe() -> Validator {
    Validator::converter(|value| Ok(Datum::from(value.to_text()?)))
}

/// Trims surrounding whitespace from strings; other values pass through.
pub fn strip_value() -> Validator {
    Validator::converter(|value| match value {
        Datum::Value(Value::String(s)) => Ok(Datum::from(s.trim())),
        other => Ok(other),
    })
}

/// Normalises a date string to ISO-8601. The empty string becomes null.
///
/// ```rust
/// use dictize::{validate, Context, Schema};
/// use dictize::validators::isodate;
/// use serde_json::json;
///
/// let schema = Schema::new().field("created", [isodate()]);
/// let record = json!({"created": "2024/03/01 09:15"});
/// let outcome = validate(record.as_object().unwrap(), &schema, &Context::new()).unwrap();
///
/// assert_eq!(outcome.data()["created"], json!("2024-03-01T09:15:00"));
/// ```
pub fn isodate() -> Validator {
    Validator::converter(|value| match value.as_str() {
        Some("") => Ok(Datum::Value(Value::Null)),
        Some(text) => parse_date_str(text)
            .map(|dt| Datum::from(isoformat(&dt)))
            .map_err(|_| ValidatorError::invalid("Date format incorrect")),
        None => Err(ValidatorError::invalid("Date format incorrect")),
    })
}

/// Accepts only values equal to one of a fixed set.
///
/// ```rust
/// use dictize::{Context, Datum, StatefulValidator};
/// use dictize::validators::OneOf;
///
/// let state = OneOf::new(["active", "deleted"]);
/// assert!(state.to_python(&Datum::from("active"), &Context::new()).is_ok());
///
/// let err = state.to_python(&Datum::from("gone"), &Context::new()).unwrap_err();
/// assert_eq!(err.message, "Value must be one of: active; deleted (not 'gone')");
/// ```
#[derive(Debug, Clone)]
pub struct OneOf {
    items: Vec<Value>,
}

impl OneOf {
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Wraps this set as a schema validator.
    pub fn validator(self) -> Validator {
        Validator::stateful(self)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl StatefulValidator for OneOf {
    fn to_python(&self, value: &Datum, _state: &Context) -> Result<Datum, Invalid> {
        let Some(candidate) = value.as_value() else {
            return Err(Invalid::missing());
        };
        if self.items.contains(candidate) {
            return Ok(value.clone());
        }
        let allowed: Vec<String> = self.items.iter().map(render).collect();
        Err(Invalid::new(format!(
            "Value must be one of: {} (not '{}')",
            allowed.join("; "),
            render(candidate)
        )))
    }
}
