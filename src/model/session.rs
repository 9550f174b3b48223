//! The storage collaborator and an in-memory implementation.

use std::collections::HashMap;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use super::cell::Cell;
use super::entity::{EntityKind, EntityRow};
use crate::error::StoreError;

/// Row lookup and staging for dictize and save.
///
/// Rows handed out are copies; changes reach storage only through
/// [`Session::add`].
pub trait Session: Send + Sync {
    /// Loads the `kind` row with primary key `id`.
    fn get(&self, kind: &EntityKind, id: &str) -> Result<Option<EntityRow>, StoreError>;

    /// Loads the first `kind` row whose columns equal every filter pair.
    fn find_first(
        &self,
        kind: &EntityKind,
        filter: &[(String, Cell)],
    ) -> Result<Option<EntityRow>, StoreError>;

    /// Stages a new or changed row.
    fn add(&self, row: EntityRow) -> Result<(), StoreError>;
}

type Tables = HashMap<String, IndexMap<String, EntityRow>>;

/// A session over in-memory tables.
///
/// Staged rows shadow committed rows with the same id until [`commit`] or
/// [`rollback`].
///
/// [`commit`]: MemorySession::commit
/// [`rollback`]: MemorySession::rollback
///
/// ```rust
/// use dictize::{Cell, EntityKind, EntityRow, MemorySession, Session};
///
/// let kind = EntityKind::new("tag");
/// let session = MemorySession::new();
///
/// let row = EntityRow::new(&kind).with("id", Cell::from("t1"));
/// session.add(row).unwrap();
/// assert!(session.get(&kind, "t1").unwrap().is_some());
///
/// session.rollback();
/// assert!(session.get(&kind, "t1").unwrap().is_none());
/// ```
#[derive(Default)]
pub struct MemorySession {
    committed: RwLock<Tables>,
    staged: RwLock<Tables>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row straight into committed storage.
    pub fn seed(&self, mut row: EntityRow) {
        row.mark_clean();
        let id = row.id().unwrap_or_default().to_string();
        self.committed
            .write()
            .entry(row.kind().to_string())
            .or_default()
            .insert(id, row);
    }

    /// Makes every staged row durable.
    pub fn commit(&self) {
        let staged = std::mem::take(&mut *self.staged.write());
        let mut committed = self.committed.write();
        for (kind, rows) in staged {
            let count = rows.len();
            committed.entry(kind.clone()).or_default().extend(rows);
            debug!(kind = %kind, rows = count, "committed rows");
        }
    }

    /// Discards every staged row.
    pub fn rollback(&self) {
        self.staged.write().clear();
    }

    /// Number of rows currently staged.
    pub fn staged_len(&self) -> usize {
        self.staged.read().values().map(IndexMap::len).sum()
    }

    /// Every visible `kind` row, staged rows first.
    pub fn rows(&self, kind: &str) -> Vec<EntityRow> {
        let staged = self.staged.read();
        let committed = self.committed.read();
        let staged_rows = staged.get(kind);
        let mut rows: Vec<EntityRow> = staged_rows.into_iter().flat_map(|t| t.values().cloned()).collect();
        if let Some(table) = committed.get(kind) {
            rows.extend(
                table
                    .iter()
                    .filter(|(id, _)| !staged_rows.is_some_and(|s| s.contains_key(*id)))
                    .map(|(_, row)| row.clone()),
            );
        }
        rows
    }
}

impl Session for MemorySession {
    fn get(&self, kind: &EntityKind, id: &str) -> Result<Option<EntityRow>, StoreError> {
        if let Some(row) = self.staged.read().get(kind.name()).and_then(|t| t.get(id)) {
            return Ok(Some(row.clone()));
        }
        Ok(self
            .committed
            .read()
            .get(kind.name())
            .and_then(|t| t.get(id))
            .cloned())
    }

    fn find_first(
        &self,
        kind: &EntityKind,
        filter: &[(String, Cell)],
    ) -> Result<Option<EntityRow>, StoreError> {
        Ok(self
            .rows(kind.name())
            .into_iter()
            .find(|row| row.matches(filter)))
    }

    fn add(&self, mut row: EntityRow) -> Result<(), StoreError> {
        let id = row
            .id()
            .map(String::from)
            .ok_or_else(|| StoreError::Backend(format!("{} row has no id", row.kind())))?;
        row.mark_clean();
        self.staged
            .write()
            .entry(row.kind().to_string())
            .or_default()
            .insert(id, row);
        Ok(())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<MemorySession>();
    assert_sync::<MemorySession>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    fn kind() -> EntityKind {
        EntityKind::new("package").column("name", ColumnType::Text)
    }

    fn row(id: &str, name: &str) -> EntityRow {
        EntityRow::new(&kind())
            .with("id", Cell::from(id))
            .with("name", Cell::from(name))
    }

    #[test]
    fn test_staged_rows_shadow_committed() {
        let session = MemorySession::new();
        session.seed(row("p1", "old"));
        session.add(row("p1", "new")).unwrap();

        let found = session.get(&kind(), "p1").unwrap().unwrap();
        assert_eq!(found.get("name"), Some(&Cell::from("new")));
        assert_eq!(session.rows("package").len(), 1);

        session.rollback();
        let found = session.get(&kind(), "p1").unwrap().unwrap();
        assert_eq!(found.get("name"), Some(&Cell::from("old")));
    }

    #[test]
    fn test_commit_moves_staged_rows() {
        let session = MemorySession::new();
        session.add(row("p1", "a")).unwrap();
        assert_eq!(session.staged_len(), 1);

        session.commit();
        assert_eq!(session.staged_len(), 0);
        assert!(session.get(&kind(), "p1").unwrap().is_some());
    }

    #[test]
    fn test_find_first() {
        let session = MemorySession::new();
        session.seed(row("p1", "a"));
        session.seed(row("p2", "b"));

        let found = session
            .find_first(&kind(), &[("name".into(), Cell::from("b"))])
            .unwrap();
        assert_eq!(found.and_then(|r| r.id().map(String::from)), Some("p2".to_string()));
        assert!(session
            .find_first(&kind(), &[("name".into(), Cell::from("c"))])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_loaded_rows_are_clean() {
        let session = MemorySession::new();
        session.add(row("p1", "a")).unwrap();
        assert!(!session.get(&kind(), "p1").unwrap().unwrap().is_modified());
    }
}
