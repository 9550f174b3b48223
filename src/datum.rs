//! Values carried through the flat key space.
//!
//! A [`Datum`] is either a JSON value or [`Datum::Missing`], the sentinel for
//! "the caller did not supply this field at all". Missing is distinct from
//! null, from the empty string and from an absent key. Coercing it to text or
//! a number fails with [`Invalid`] so a validator can never silently turn
//! "not supplied" into a concrete value.

use serde_json::Value;

use crate::error::Invalid;

/// A value in a flattened record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    /// The field was not supplied.
    #[default]
    Missing,
    /// A supplied (or converted) value.
    Value(Value),
}

impl Datum {
    /// Returns true for the missing sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Datum::Missing)
    }

    /// Returns true for a supplied JSON null.
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Value(Value::Null))
    }

    /// Returns true if the value counts as empty for required-field checks.
    ///
    /// Missing, null, `false`, zero, the empty string and empty lists or
    /// objects are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Datum::Missing => true,
            Datum::Value(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
            },
        }
    }

    /// Returns the JSON value, or `None` when missing.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Datum::Missing => None,
            Datum::Value(value) => Some(value),
        }
    }

    /// Consumes the datum, returning the JSON value or `None` when missing.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Datum::Missing => None,
            Datum::Value(value) => Some(value),
        }
    }

    /// Returns the string slice if the value is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Coerces the value to text.
    ///
    /// Strings are returned as-is, numbers and booleans are rendered, null
    /// becomes the empty string and lists or objects are rendered as JSON.
    pub fn to_text(&self) -> Result<String, Invalid> {
        match self {
            Datum::Missing => Err(Invalid::missing()),
            Datum::Value(Value::String(s)) => Ok(s.clone()),
            Datum::Value(Value::Null) => Ok(String::new()),
            Datum::Value(Value::Number(n)) => Ok(n.to_string()),
            Datum::Value(Value::Bool(b)) => Ok(b.to_string()),
            Datum::Value(other) => Ok(other.to_string()),
        }
    }

    /// Coerces the value to an integer.
    ///
    /// Floats are truncated, booleans become 0 or 1 and strings are parsed
    /// after trimming surrounding whitespace.
    pub fn to_int(&self) -> Result<i64, Invalid> {
        let not_an_integer = || Invalid::new("Please enter an integer value");
        match self {
            Datum::Missing => Err(Invalid::missing()),
            Datum::Value(Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(i),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(not_an_integer),
            },
            Datum::Value(Value::Bool(b)) => Ok(i64::from(*b)),
            Datum::Value(Value::String(s)) => s.trim().parse().map_err(|_| not_an_integer()),
            Datum::Value(_) => Err(not_an_integer()),
        }
    }

    /// Coerces the value to a float.
    pub fn to_float(&self) -> Result<f64, Invalid> {
        let not_a_number = || Invalid::new("Please enter a number");
        match self {
            Datum::Missing => Err(Invalid::missing()),
            Datum::Value(Value::Number(n)) => n.as_f64().ok_or_else(not_a_number),
            Datum::Value(Value::String(s)) => s.trim().parse().map_err(|_| not_a_number()),
            Datum::Value(_) => Err(not_a_number()),
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Datum::Value(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Value(Value::String(value))
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Value(Value::from(value))
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Value(Value::Bool(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_refuses_coercion() {
        let missing = Datum::Missing;
        assert_eq!(missing.to_text(), Err(Invalid::missing()));
        assert_eq!(missing.to_int(), Err(Invalid::missing()));
        assert_eq!(missing.to_float(), Err(Invalid::missing()));
        assert!(missing.as_value().is_none());
    }

    #[test]
    fn test_missing_is_not_null_or_empty_string() {
        assert_ne!(Datum::Missing, Datum::Value(Value::Null));
        assert_ne!(Datum::Missing, Datum::from(""));
        assert!(!Datum::Missing.is_null());
    }

    #[test]
    fn test_emptiness() {
        assert!(Datum::Missing.is_empty());
        assert!(Datum::from("").is_empty());
        assert!(Datum::from(json!([])).is_empty());
        assert!(Datum::from(json!(0)).is_empty());
        assert!(Datum::from(false).is_empty());
        assert!(!Datum::from("x").is_empty());
        assert!(!Datum::from(json!({"a": 1})).is_empty());
    }

    #[test]
    fn test_to_int() {
        assert_eq!(Datum::from("32").to_int(), Ok(32));
        assert_eq!(Datum::from(" 7 ").to_int(), Ok(7));
        assert_eq!(Datum::from(json!(3.9)).to_int(), Ok(3));
        assert_eq!(Datum::from(true).to_int(), Ok(1));
        assert_eq!(
            Datum::from("dsa32").to_int(),
            Err(Invalid::new("Please enter an integer value"))
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Datum::from("abc").to_text().unwrap(), "abc");
        assert_eq!(Datum::from(12i64).to_text().unwrap(), "12");
        assert_eq!(Datum::from(json!(null)).to_text().unwrap(), "");
        assert_eq!(Datum::from(json!({"a": 1})).to_text().unwrap(), r#"{"a":1}"#);
    }
}
