//! Durable snapshot persistence.
//!
//! The store writes its full state through a `SnapshotStore` after every
//! mutation, before control returns to the caller. The file implementation
//! is the `localStorage` analog: one JSON document, written atomically via
//! a temp file and rename.

use async_trait::async_trait;
use rsvpd_core::{CoreError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::state::StoreSnapshot;

/// Persistence backend for the store snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, or `None` when nothing was persisted
    /// yet.
    async fn load(&self) -> Result<Option<StoreSnapshot>>;

    /// Persist the snapshot durably. Must not return before the write is
    /// complete.
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// File-backed snapshot store.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let snapshot = serde_json::from_slice(&bytes)?;
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::persistence(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        // Write-then-rename so a crash mid-write never truncates the
        // snapshot.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            CoreError::persistence(format!("write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            CoreError::persistence(format!("rename {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot saved");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// No-op snapshot store for ephemeral deployments and tests.
#[derive(Debug, Default)]
pub struct NullSnapshotStore;

#[async_trait]
impl SnapshotStore for NullSnapshotStore {
    async fn load(&self) -> Result<Option<StoreSnapshot>> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &StoreSnapshot) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "null"
    }
}
