//! Storage traits and error types
//!
//! This module defines the trait interface for persistence backends and
//! associated error types.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path escapes the output root: {0}")]
    OutsideRoot(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persistence backend implementations
///
/// A store receives every fetched body exactly once. Failures are terminal for
/// the URL being saved and never for the crawl.
#[async_trait]
pub trait Store: Send + Sync {
    /// Saves `body` at `relative_path` below the store's root
    async fn save(&self, relative_path: &Path, body: &[u8]) -> StorageResult<()>;
}
