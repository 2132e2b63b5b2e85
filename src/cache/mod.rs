//! Local snapshot of the project list for fast first paint.
//!
//! This module provides:
//! - A storage seam (`SnapshotStorage`) with SQLite and no-op backends
//! - `SnapshotCache`, a best-effort load/save wrapper that never fails the caller

mod snapshot;
mod storage;

pub use snapshot::{SnapshotCache, PROJECTS_SNAPSHOT_KEY};
pub use storage::{NoopStorage, SnapshotStorage, SqliteStorage};

#[cfg(test)]
pub(crate) use snapshot::testing;
