//! Writing validated records back to rows.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::StoreError;
use crate::model::{Cell, EntityKind, EntityRow, Session};

/// How [`table_dict_save`] found the row it updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    ById,
    ByUniqueConstraint,
    Created,
}

/// The unique column sets of `kind`, in declaration order.
pub fn get_unique_constraints(kind: &EntityKind) -> &[Vec<String>] {
    kind.unique_constraints()
}

/// Finds or creates the row a record describes, assigns its fields and
/// stages it in the context's session.
///
/// The row is looked up by `id` first, then by each unique constraint whose
/// columns all appear in the record. When nothing matches a new row is
/// created. List-valued fields and fields that are not columns of `kind` are
/// left alone. Under a pending context a changed row is marked `pending`, or
/// `pending-deleted` when the record's state is `deleted`.
///
/// The session is never committed here.
///
/// # Errors
///
/// Returns [`StoreError::NoSession`] without a session,
/// [`StoreError::Coercion`] when a field does not fit its column, and any
/// error the session reports.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use dictize::{table_dict_save, ColumnType, Context, EntityKind, MemorySession, Session};
/// use serde_json::json;
///
/// let kind = EntityKind::new("tag").column("name", ColumnType::Text).unique(["name"]);
/// let session = Arc::new(MemorySession::new());
/// let context = Context::new().with_session(session.clone());
///
/// let record = json!({"name": "economy"});
/// let first = table_dict_save(record.as_object().unwrap(), &kind, &context).unwrap();
/// let again = table_dict_save(record.as_object().unwrap(), &kind, &context).unwrap();
///
/// assert_eq!(first.id(), again.id());
/// assert_eq!(session.staged_len(), 1);
/// ```
pub fn table_dict_save(
    table_dict: &Map<String, Value>,
    kind: &EntityKind,
    context: &Context,
) -> Result<EntityRow, StoreError> {
    let session = context.require_session()?;

    let (mut row, resolution) = match find_existing(table_dict, kind, session)? {
        Some((row, resolution)) => (row, resolution),
        None => (EntityRow::new(kind), Resolution::Created),
    };
    if row.kind() != kind.name() {
        return Err(StoreError::KindMismatch {
            expected: kind.name().to_string(),
            found: row.kind().to_string(),
        });
    }

    for (name, value) in table_dict {
        if value.is_array() {
            continue;
        }
        let Some(ty) = kind.column_type(name) else {
            trace!(kind = kind.name(), field = %name, "skipping field with no column");
            continue;
        };
        let cell = Cell::coerce(value, ty).ok_or_else(|| StoreError::Coercion {
            kind: kind.name().to_string(),
            column: name.clone(),
            expected: ty.as_str(),
            found: Cell::describe(value),
        })?;
        row.set(name.as_str(), cell);
    }

    if context.is_pending() && row.is_modified() {
        let state = match table_dict.get("state").and_then(Value::as_str) {
            Some("deleted") => "pending-deleted",
            _ => "pending",
        };
        row.set("state", Cell::from(state));
    }

    debug!(
        kind = kind.name(),
        id = row.id().unwrap_or_default(),
        ?resolution,
        modified = row.is_modified(),
        "saving row"
    );
    session.add(row.clone())?;
    Ok(row)
}

fn find_existing(
    table_dict: &Map<String, Value>,
    kind: &EntityKind,
    session: &dyn Session,
) -> Result<Option<(EntityRow, Resolution)>, StoreError> {
    if let Some(id) = table_dict.get(kind.primary_key()).and_then(id_text) {
        if let Some(row) = session.get(kind, &id)? {
            return Ok(Some((row, Resolution::ById)));
        }
    }

    for constraint in get_unique_constraints(kind) {
        let Some(filter) = constraint_filter(table_dict, kind, constraint) else {
            continue;
        };
        if let Some(row) = session.find_first(kind, &filter)? {
            return Ok(Some((row, Resolution::ByUniqueConstraint)));
        }
    }
    Ok(None)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The `(column, value)` filter for a constraint, or `None` when the record
/// lacks one of its columns or a value does not fit.
fn constraint_filter(
    table_dict: &Map<String, Value>,
    kind: &EntityKind,
    constraint: &[String],
) -> Option<Vec<(String, Cell)>> {
    constraint
        .iter()
        .map(|column| {
            let value = table_dict.get(column)?;
            let cell = Cell::coerce(value, kind.column_type(column)?)?;
            Some((column.clone(), cell))
        })
        .collect()
}
