// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote/local reconciliation.
//!
//! [`Reconcile`] is the blocking "sync the cache now" capability. [`Root`]
//! is the built-in implementation: it mirrors a [`Remote`] snapshot into the
//! store wholesale, skipping the pass when the root revision is unchanged.

use chrono::Utc;
use std::collections::HashSet;

use crate::db::Database;
use crate::remote::{Remote, Snapshot};

/// Errors raised by a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The remote rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Remote state is inconsistent with itself or with the cache.
    #[error("sync conflict: {0}")]
    Conflict(String),

    /// The remote returned data that could not be decoded.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("no remote configured\n  hint: add a [remote] section with url = \"file:<path>\" to config.toml")]
    NotConfigured,

    #[error("unsupported remote url '{0}'\n  hint: supported form is file:<path>")]
    UnsupportedUrl(String),

    /// Reading or writing the local store failed.
    #[error("store error: {0}")]
    Store(#[from] crate::Error),
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Remote revision the cache now reflects.
    pub revision: i64,
    pub lists: usize,
    pub tasks: usize,
    pub users: usize,
    /// Rows deleted because the remote no longer has them.
    pub removed: usize,
    /// True if the cache was already at the remote revision.
    pub skipped: bool,
}

/// A full, blocking remote/local reconciliation.
pub trait Reconcile {
    fn sync(&self, db: &mut Database) -> Result<SyncSummary, ReconcileError>;
}

/// Root aggregate of the account: reconciles everything below it.
pub struct Root<R> {
    remote: R,
}

impl<R: Remote> Root<R> {
    pub fn new(remote: R) -> Self {
        Root { remote }
    }
}

impl<R: Remote> Reconcile for Root<R> {
    fn sync(&self, db: &mut Database) -> Result<SyncSummary, ReconcileError> {
        let snapshot = self.remote.fetch()?;

        if let Some(state) = db.root_state()? {
            if state.revision == snapshot.revision {
                tracing::debug!(revision = state.revision, "root revision unchanged");
                let counts = db.counts()?;
                return Ok(SyncSummary {
                    revision: state.revision,
                    lists: counts.lists,
                    tasks: counts.tasks,
                    users: counts.users,
                    removed: 0,
                    skipped: true,
                });
            }
        }

        check_consistency(&snapshot)?;

        let removed = db.replace_all(
            snapshot.revision,
            Utc::now(),
            &snapshot.lists,
            &snapshot.tasks,
            &snapshot.users,
        )?;

        tracing::info!(
            revision = snapshot.revision,
            lists = snapshot.lists.len(),
            tasks = snapshot.tasks.len(),
            users = snapshot.users.len(),
            removed,
            "reconciled"
        );

        Ok(SyncSummary {
            revision: snapshot.revision,
            lists: snapshot.lists.len(),
            tasks: snapshot.tasks.len(),
            users: snapshot.users.len(),
            removed,
            skipped: false,
        })
    }
}

/// Reject snapshots with duplicate ids or tasks pointing at unknown lists.
fn check_consistency(snapshot: &Snapshot) -> Result<(), ReconcileError> {
    let mut list_ids = HashSet::new();
    for list in &snapshot.lists {
        if !list_ids.insert(list.id) {
            return Err(ReconcileError::Conflict(format!("duplicate list id {}", list.id)));
        }
    }

    let mut task_ids = HashSet::new();
    for task in &snapshot.tasks {
        if !task_ids.insert(task.id) {
            return Err(ReconcileError::Conflict(format!("duplicate task id {}", task.id)));
        }
        if !list_ids.contains(&task.list_id) {
            return Err(ReconcileError::Conflict(format!(
                "task {} belongs to unknown list {}",
                task.id, task.list_id
            )));
        }
    }

    let mut user_ids = HashSet::new();
    for user in &snapshot.users {
        if !user_ids.insert(user.id) {
            return Err(ReconcileError::Conflict(format!("duplicate user id {}", user.id)));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
