//! The row model dictize and save work against.
//!
//! - [`EntityKind`]: a table description with typed columns and unique
//!   constraints
//! - [`EntityRow`]: one row of typed [`Cell`]s
//! - [`Session`]: row lookup and staging, with [`MemorySession`] as the
//!   in-memory implementation

mod cell;
mod entity;
mod session;

pub use cell::{Cell, ColumnType};
pub use entity::{EntityKind, EntityRow};
pub use session::{MemorySession, Session};
