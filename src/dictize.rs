//! Rendering rows as plain records.

use serde_json::{Map, Value};

use crate::context::Context;
use crate::model::{Cell, EntityRow};

/// Revision bookkeeping columns never shown in a record.
const HIDDEN_COLUMNS: [&str; 4] = ["current", "expired_timestamp", "expired_id", "continuity_id"];

/// Renders a row as a record.
///
/// Entries of `overrides` replace or extend the rendered columns. A
/// `revision_timestamp` column raises the context's modification watermark.
///
/// ```rust
/// use dictize::{table_dictize, Cell, ColumnType, Context, EntityKind, EntityRow};
/// use serde_json::{json, Map};
///
/// let kind = EntityKind::new("group")
///     .column("title", ColumnType::Text)
///     .column("current", ColumnType::Bool);
/// let row = EntityRow::new(&kind)
///     .with("id", Cell::from("g1"))
///     .with("title", Cell::from("Health"));
///
/// let record = table_dictize(&row, &mut Context::new(), Map::new());
/// assert_eq!(json!(record), json!({"id": "g1", "title": "Health"}));
/// ```
pub fn table_dictize(row: &EntityRow, context: &mut Context, overrides: Map<String, Value>) -> Map<String, Value> {
    let mut record = Map::new();
    for (column, cell) in row.cells() {
        if HIDDEN_COLUMNS.contains(&column) {
            continue;
        }
        record.insert(column.to_string(), cell.to_value());
    }
    record.extend(overrides);

    if let Some(timestamp) = row.get("revision_timestamp").and_then(Cell::as_datetime) {
        context.record_modified(timestamp);
    }
    record
}

/// An item handed to [`obj_list_dictize`].
#[derive(Debug, Clone, Copy)]
pub enum Listed<'a> {
    Row(&'a EntityRow),
    /// A row paired with the capacity it holds in its parent.
    WithCapacity(&'a EntityRow, &'a str),
}

impl<'a> Listed<'a> {
    fn row(&self) -> &'a EntityRow {
        match *self {
            Listed::Row(row) | Listed::WithCapacity(row, _) => row,
        }
    }
}

impl<'a> From<&'a EntityRow> for Listed<'a> {
    fn from(row: &'a EntityRow) -> Self {
        Listed::Row(row)
    }
}

/// Renders a list of rows, sorted by `sort_key`.
///
/// When the context is active (the default), rows whose state is neither
/// `active` nor `pending` are dropped; rows without a state are kept. When
/// the context asks for capacities, each paired capacity is added to its
/// record.
pub fn obj_list_dictize<'a, I, K, F>(items: I, context: &mut Context, sort_key: F) -> Vec<Map<String, Value>>
where
    I: IntoIterator<Item = Listed<'a>>,
    K: Ord,
    F: Fn(&Map<String, Value>) -> K,
{
    let mut records = Vec::new();
    for item in items {
        let row = item.row();
        let mut overrides = Map::new();
        if let (true, Listed::WithCapacity(_, capacity)) = (context.is_with_capacity(), item) {
            overrides.insert("capacity".to_string(), Value::String(capacity.to_string()));
        }
        // Filtered rows still count towards the modification watermark.
        let record = table_dictize(row, context, overrides);
        if context.is_active() && !matches!(row.state(), None | Some("active") | Some("pending")) {
            continue;
        }
        records.push(record);
    }
    records.sort_by_key(|record| sort_key(record));
    records
}

/// Renders every row of a keyed collection, sorted by `sort_key`.
pub fn obj_dict_dictize<'a, I, Q, K, F>(rows: I, context: &mut Context, sort_key: F) -> Vec<Map<String, Value>>
where
    I: IntoIterator<Item = (Q, &'a EntityRow)>,
    K: Ord,
    F: Fn(&Map<String, Value>) -> K,
{
    let mut records: Vec<Map<String, Value>> = rows
        .into_iter()
        .map(|(_, row)| table_dictize(row, context, Map::new()))
        .collect();
    records.sort_by_key(|record| sort_key(record));
    records
}

/// Sorts records by the text of one field; records without it sort first.
pub fn by_field(field: &str) -> impl Fn(&Map<String, Value>) -> String + '_ {
    move |record| match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
