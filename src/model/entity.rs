//! Entity kinds and rows.

use indexmap::IndexMap;
use uuid::Uuid;

use super::cell::{Cell, ColumnType};

/// The table description of an entity kind.
///
/// ```rust
/// use dictize::{ColumnType, EntityKind};
///
/// let package = EntityKind::new("package")
///     .column("name", ColumnType::Text)
///     .column("metadata_modified", ColumnType::DateTime)
///     .unique(["name"]);
///
/// assert_eq!(package.primary_key(), "id");
/// assert_eq!(package.column_type("id"), Some(ColumnType::Text));
/// assert_eq!(package.unique_constraints().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityKind {
    name: String,
    primary_key: String,
    columns: IndexMap<String, ColumnType>,
    unique_constraints: Vec<Vec<String>>,
}

impl EntityKind {
    /// Creates a kind with a text primary key column named `id`.
    pub fn new(name: impl Into<String>) -> Self {
        let mut columns = IndexMap::new();
        columns.insert("id".to_string(), ColumnType::Text);
        Self {
            name: name.into(),
            primary_key: "id".to_string(),
            columns,
            unique_constraints: Vec::new(),
        }
    }

    /// Declares a column.
    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.insert(name.into(), ty);
        self
    }

    /// Declares a unique constraint over one or more columns.
    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_constraints
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    pub fn unique_constraints(&self) -> &[Vec<String>] {
        &self.unique_constraints
    }
}

/// One stored or staged entity.
///
/// A row tracks whether it has been changed since it was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    kind: String,
    values: IndexMap<String, Cell>,
    modified: bool,
}

impl EntityRow {
    /// Creates a new row with every column null and a fresh id.
    ///
    /// A new row counts as modified.
    pub fn new(kind: &EntityKind) -> Self {
        let mut values: IndexMap<String, Cell> = kind
            .columns()
            .map(|(name, _)| (name.to_string(), Cell::Null))
            .collect();
        values.insert(
            kind.primary_key().to_string(),
            Cell::Text(Uuid::new_v4().to_string()),
        );
        Self {
            kind: kind.name().to_string(),
            values,
            modified: true,
        }
    }

    /// Builder form of [`EntityRow::set`].
    pub fn with(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.set(column, cell);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The `id` column as text.
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Cell::as_text)
    }

    /// The `state` column as text.
    pub fn state(&self) -> Option<&str> {
        self.get("state").and_then(Cell::as_text)
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.values.get(column)
    }

    /// Sets a column, marking the row modified if the value changed.
    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        let column = column.into();
        if self.values.get(&column) != Some(&cell) {
            self.values.insert(column, cell);
            self.modified = true;
        }
    }

    /// Columns in declaration order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.values.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the modified flag, as after loading or flushing.
    pub fn mark_clean(&mut self) {
        self.modified = false;
    }

    /// Returns true if every `(column, value)` pair matches.
    pub fn matches(&self, filter: &[(String, Cell)]) -> bool {
        filter
            .iter()
            .all(|(column, cell)| self.values.get(column) == Some(cell))
    }
}
