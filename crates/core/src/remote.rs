// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote account snapshots.
//!
//! A [`Remote`] produces a full [`Snapshot`] of the account. Only `file:`
//! remotes are built in; other transports plug in through the trait.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{List, Task, User};
use crate::reconcile::ReconcileError;

/// Full state of the remote account at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Revision of the remote root aggregate.
    pub revision: i64,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// Source of remote account state.
pub trait Remote {
    /// Fetch the current snapshot. Blocking.
    fn fetch(&self) -> Result<Snapshot, ReconcileError>;
}

impl<R: Remote + ?Sized> Remote for Box<R> {
    fn fetch(&self) -> Result<Snapshot, ReconcileError> {
        (**self).fetch()
    }
}

/// Remote backed by a JSON snapshot file.
#[derive(Debug, Clone)]
pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRemote { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Remote for FileRemote {
    fn fetch(&self) -> Result<Snapshot, ReconcileError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                ReconcileError::Unauthorized(format!("{}: {}", self.path.display(), e))
            }
            _ => ReconcileError::Network(format!("{}: {}", self.path.display(), e)),
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ReconcileError::InvalidSnapshot(format!("{}: {}", self.path.display(), e)))
    }
}

/// Open a remote from its configured URL.
///
/// Supported: `file:<path>`.
pub fn open(url: &str) -> Result<Box<dyn Remote>, ReconcileError> {
    match url.strip_prefix("file:") {
        Some(path) if !path.is_empty() => Ok(Box::new(FileRemote::new(path))),
        _ => Err(ReconcileError::UnsupportedUrl(url.to_string())),
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
