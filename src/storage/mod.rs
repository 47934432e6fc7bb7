//! Storage module for persisting mirrored resources
//!
//! The crawler only talks to the [`Store`] trait. [`FsStore`] is the default
//! backend and writes into a directory tree; tests substitute in-memory
//! stores.

mod fs;
mod traits;

pub use fs::FsStore;
pub use traits::{Store, StorageError, StorageResult};
