//! Caller-supplied processing hooks
//!
//! `pre_process` sees every fetched resource before it is saved and may veto
//! the save; a veto counts as a failure for that URL. `post_process` sees every
//! resource after it has been saved.

use crate::state::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// A fetched resource on its way to, or back from, the store
#[derive(Debug, Clone)]
pub struct Resource {
    /// Canonical URL the resource was requested as
    pub url: String,

    /// URL the response came from after redirects; the saved path still follows `url`
    pub final_url: String,

    /// Kind after content-type routing
    pub kind: ResourceKind,

    pub status_code: u16,

    pub content_type: Option<String>,

    /// Path below the output root the body is saved at
    pub path: PathBuf,

    pub body: Vec<u8>,
}

/// A pre-process hook refused a resource
#[derive(Debug, Error)]
#[error("pre-process rejected {url}: {reason}")]
pub struct HookError {
    pub url: String,
    pub reason: String,
}

impl HookError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Processing hooks around each save
pub trait ResourceHooks: Send + Sync {
    fn pre_process(&self, _resource: &Resource) -> Result<(), HookError> {
        Ok(())
    }

    fn post_process(&self, _resource: &Resource) {}
}

/// Accepts everything and does nothing afterwards
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ResourceHooks for NoopHooks {}
