//! Typed column values.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::dates::{isoformat, parse_date_str};
use crate::flatten::value_type_name;

/// The declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Int,
    Float,
    Bool,
    DateTime,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::DateTime => "datetime",
            ColumnType::Json => "json",
        }
    }
}

/// A value stored in a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Json(Value),
}

impl Cell {
    /// Converts a JSON value for storage in a column of type `ty`.
    ///
    /// Null fits every column. Returns `None` when the value cannot be
    /// represented.
    ///
    /// ```rust
    /// use dictize::{Cell, ColumnType};
    /// use serde_json::json;
    ///
    /// assert_eq!(Cell::coerce(&json!("42"), ColumnType::Int), Some(Cell::Int(42)));
    /// assert_eq!(Cell::coerce(&json!(1.5), ColumnType::Text), Some(Cell::Text("1.5".into())));
    /// assert_eq!(Cell::coerce(&json!("x"), ColumnType::Int), None);
    /// ```
    pub fn coerce(value: &Value, ty: ColumnType) -> Option<Cell> {
        if value.is_null() {
            return Some(Cell::Null);
        }
        match ty {
            ColumnType::Text => match value {
                Value::String(s) => Some(Cell::Text(s.clone())),
                Value::Number(n) => Some(Cell::Text(n.to_string())),
                Value::Bool(b) => Some(Cell::Text(b.to_string())),
                _ => None,
            },
            ColumnType::Int => match value {
                Value::Number(n) => n.as_i64().map(Cell::Int),
                Value::String(s) => s.trim().parse().ok().map(Cell::Int),
                Value::Bool(b) => Some(Cell::Int(i64::from(*b))),
                _ => None,
            },
            ColumnType::Float => match value {
                Value::Number(n) => n.as_f64().map(Cell::Float),
                Value::String(s) => s.trim().parse().ok().map(Cell::Float),
                _ => None,
            },
            ColumnType::Bool => match value {
                Value::Bool(b) => Some(Cell::Bool(*b)),
                Value::String(s) => match s.to_lowercase().as_str() {
                    "true" => Some(Cell::Bool(true)),
                    "false" => Some(Cell::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ColumnType::DateTime => value
                .as_str()
                .and_then(|s| parse_date_str(s).ok())
                .map(Cell::DateTime),
            ColumnType::Json => Some(Cell::Json(value.clone())),
        }
    }

    /// Describes a JSON value that failed [`Cell::coerce`].
    pub(crate) fn describe(value: &Value) -> String {
        match value {
            Value::String(s) => format!("'{s}'"),
            other => value_type_name(other).to_string(),
        }
    }

    /// Renders the cell as a plain JSON value.
    ///
    /// Null, booleans, integers and JSON pass through; date-times become
    /// ISO-8601 strings; everything else becomes text.
    pub fn to_value(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(i) => Value::from(*i),
            Cell::Float(f) => Value::String(f.to_string()),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::DateTime(dt) => Value::String(isoformat(dt)),
            Cell::Json(value) => value.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::DateTime(value)
    }
}
