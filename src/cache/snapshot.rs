use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::storage::SnapshotStorage;

/// Key the admin project list is stored under.
pub const PROJECTS_SNAPSHOT_KEY: &str = "admin_projects_cache";

/// Best-effort mirror of the last list fetched from the backend.
///
/// Nothing here ever fails the caller: storage and decode errors are logged
/// and treated as "no snapshot".
pub struct SnapshotCache<S: SnapshotStorage> {
  storage: S,
  key: String,
}

impl<S: SnapshotStorage> SnapshotCache<S> {
  pub fn new(storage: S, key: impl Into<String>) -> Self {
    Self {
      storage,
      key: key.into(),
    }
  }

  /// The most recently saved list, or an empty one.
  pub fn load<T: DeserializeOwned>(&self) -> Vec<T> {
    let blob = match self.storage.read(&self.key) {
      Ok(Some(blob)) => blob,
      Ok(None) => {
        tracing::debug!(key = %self.key, "no snapshot stored");
        return Vec::new();
      }
      Err(e) => {
        tracing::warn!(key = %self.key, error = %e, "snapshot read failed");
        return Vec::new();
      }
    };

    // A stored `null` decodes as no snapshot as well
    match serde_json::from_str::<Option<Vec<T>>>(&blob) {
      Ok(entities) => entities.unwrap_or_default(),
      Err(e) => {
        tracing::warn!(key = %self.key, error = %e, "snapshot is corrupt, ignoring");
        Vec::new()
      }
    }
  }

  /// Overwrite the snapshot. Failures are dropped.
  pub fn save<T: Serialize>(&self, entities: &[T]) {
    let blob = match serde_json::to_string(entities) {
      Ok(blob) => blob,
      Err(e) => {
        tracing::warn!(key = %self.key, error = %e, "snapshot encode failed");
        return;
      }
    };

    if let Err(e) = self.storage.write(&self.key, &blob) {
      tracing::warn!(key = %self.key, error = %e, "snapshot write failed");
    }
  }

  pub fn saved_at(&self) -> Option<DateTime<Utc>> {
    self.storage.saved_at(&self.key).ok().flatten()
  }
}
