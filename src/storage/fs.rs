//! Filesystem-backed store
//!
//! Mirrors remote paths below a root directory, creating intermediate
//! directories on demand.

use crate::storage::traits::{Store, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Writes mirrored resources below `root`
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative_path` below the root, refusing anything that could escape it
    fn resolve(&self, relative_path: &Path) -> StorageResult<PathBuf> {
        let escapes = relative_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StorageError::OutsideRoot(relative_path.to_path_buf()));
        }
        Ok(self.root.join(relative_path))
    }
}

#[async_trait]
impl Store for FsStore {
    async fn save(&self, relative_path: &Path, body: &[u8]) -> StorageResult<()> {
        let target = self.resolve(relative_path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&target, body)
            .await
            .map_err(|source| StorageError::Write {
                path: target.clone(),
                source,
            })?;

        tracing::trace!("Saved {} bytes to {}", body.len(), target.display());
        Ok(())
    }
}
