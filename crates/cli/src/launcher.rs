// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Non-blocking, de-duplicated background sync requests.
//!
//! [`SyncLauncher::request_background_sync`] is safe to call as often as the
//! host likes (e.g. on every keystroke): it asks the [`JobTracker`] whether a
//! `sync` job is alive and, if not, starts `<entry> sync --commit` detached.
//! It never waits for the job and never returns an error.
//!
//! Uniqueness is entirely the tracker's business. The launcher keeps no state
//! between calls, so duplicate prevention is exactly as strong as the
//! tracker's check-and-spawn (see `td_core::jobs`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use td_core::{JobTracker, SpawnOutcome};

use crate::env;

/// Job identity of the background sync.
pub const SYNC_JOB: &str = "sync";

/// What a background sync request did. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new sync process was started.
    Spawned { pid: u32 },
    /// A sync was already in flight; nothing was started.
    AlreadyRunning,
    /// The request could not be carried out; already logged.
    Failed,
}

/// Command line of a blocking sync run of `entry`.
pub fn sync_command(entry: &Path) -> Vec<OsString> {
    vec![entry.into(), "sync".into(), "--commit".into()]
}

/// Name looked up on `PATH` when no better entry is known.
const ENTRY_NAME: &str = "todosync";

/// Find the executable to re-invoke for a background sync.
///
/// `$TODOSYNC_BINARY`, then the current executable, then `todosync` on PATH.
pub fn find_entry_binary() -> PathBuf {
    resolve_entry(env::entry_binary(), std::env::current_exe().ok(), || {
        which::which(ENTRY_NAME).ok()
    })
}

fn resolve_entry(
    override_path: Option<PathBuf>,
    current_exe: Option<PathBuf>,
    search_path: impl FnOnce() -> Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = override_path.or(current_exe) {
        return path;
    }
    if let Some(path) = search_path() {
        return path;
    }
    tracing::warn!(
        "could not resolve the todosync executable, relying on PATH at spawn time"
    );
    PathBuf::from(ENTRY_NAME)
}

/// Starts background syncs through a [`JobTracker`].
pub struct SyncLauncher<J> {
    jobs: J,
    command: Vec<OsString>,
}

impl<J: JobTracker> SyncLauncher<J> {
    /// Launcher that re-invokes `entry` with `sync --commit`.
    pub fn new(jobs: J, entry: &Path) -> Self {
        SyncLauncher {
            jobs,
            command: sync_command(entry),
        }
    }

    /// The command a background sync runs.
    pub fn command(&self) -> &[OsString] {
        &self.command
    }

    /// Start a background sync unless one is already running.
    ///
    /// Returns as soon as the spawn decision is made. Failures are logged
    /// and reported as [`LaunchOutcome::Failed`], never raised.
    pub fn request_background_sync(&self) -> LaunchOutcome {
        match self.jobs.is_job_running(SYNC_JOB) {
            Ok(true) => {
                tracing::debug!("sync already running, not starting another");
                return LaunchOutcome::AlreadyRunning;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("could not check for a running sync: {}", e);
                return LaunchOutcome::Failed;
            }
        }

        match self.jobs.spawn_detached(SYNC_JOB, &self.command) {
            Ok(SpawnOutcome::Spawned { pid }) => {
                tracing::info!(pid, "background sync started");
                LaunchOutcome::Spawned { pid }
            }
            Ok(SpawnOutcome::AlreadyRunning) => LaunchOutcome::AlreadyRunning,
            Err(e) => {
                tracing::warn!("failed to start background sync: {}", e);
                LaunchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
