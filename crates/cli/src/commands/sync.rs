// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync commands.
//!
//! - `todosync sync --commit` runs one blocking sync pass under the job lock.
//! - `todosync sync` asks for a background sync and returns immediately.

use std::path::Path;

use td_core::{Database, ProcessJobs, Root, SyncSummary};

use crate::config::{get_db_path, state_dir, Config};
use crate::env::vars;
use crate::error::{Error, Result};
use crate::launcher::{find_entry_binary, LaunchOutcome, SyncLauncher, SYNC_JOB};
use crate::sync::run_sync;

/// Run a blocking sync now.
pub fn commit() -> Result<()> {
    let summary = commit_in(&state_dir())?;
    if summary.skipped {
        println!("Already up to date (revision {}).", summary.revision);
    } else {
        println!(
            "Synced revision {}: {} lists, {} tasks, {} users ({} removed).",
            summary.revision, summary.lists, summary.tasks, summary.users, summary.removed
        );
    }
    Ok(())
}

/// Blocking sync against the store in `state_dir`.
///
/// Holds the `sync` job lock for the whole pass, so a second run (foreground
/// or background) fails with [`Error::SyncInProgress`] instead of racing.
pub(crate) fn commit_in(state_dir: &Path) -> Result<SyncSummary> {
    let config = Config::load(state_dir)?;
    let jobs = ProcessJobs::new(state_dir);
    let Some(_guard) = jobs.acquire(SYNC_JOB)? else {
        return Err(Error::SyncInProgress);
    };

    let reconciler = Root::new(config.open_remote()?);
    let mut db = open_store(&get_db_path(state_dir))?;
    run_sync(&mut db, &reconciler)
}

/// Open the store for a sync pass. A store SQLite cannot open is reported
/// like any other schema failure; the state directory already exists once
/// the job lock is held.
fn open_store(path: &Path) -> Result<Database> {
    Database::open(path).map_err(|e| match e {
        td_core::Error::Database(e) => Error::Schema(e),
        other => other.into(),
    })
}

/// Request a background sync without waiting for it.
pub fn request() -> Result<()> {
    match request_in(&state_dir(), &find_entry_binary()) {
        LaunchOutcome::Spawned { pid } => println!("Sync started in background (PID: {})", pid),
        LaunchOutcome::AlreadyRunning => println!("Sync already running."),
        // Already logged; a sync request never fails the caller
        LaunchOutcome::Failed => {}
    }
    Ok(())
}

/// Launch `entry sync --commit` for the store in `state_dir` unless a sync
/// job is alive.
pub(crate) fn request_in(state_dir: &Path, entry: &Path) -> LaunchOutcome {
    // The job must resolve the same state directory as its requester
    let jobs = ProcessJobs::new(state_dir).env(vars::TODOSYNC_STATE_DIR, state_dir);
    SyncLauncher::new(jobs, entry).request_background_sync()
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
