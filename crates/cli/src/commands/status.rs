// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync status command.

use std::path::Path;

use chrono::{DateTime, Utc};
use td_core::{Database, ProcessJobs, StoreCounts};

use crate::config::{get_db_path, state_dir, Config};
use crate::error::Result;
use crate::launcher::SYNC_JOB;

/// Snapshot of sync state shown by `todosync status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusReport {
    /// Pid of the running sync job, if any.
    pub running: Option<u32>,
    pub remote_url: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
    pub revision: Option<i64>,
    pub counts: StoreCounts,
}

/// Show sync status.
pub fn run() -> Result<()> {
    let report = report(&state_dir())?;

    match report.running {
        Some(pid) => println!("Sync: running (PID: {})", pid),
        None => println!("Sync: idle"),
    }
    println!(
        "Remote: {}",
        report.remote_url.as_deref().unwrap_or("not configured")
    );
    match report.last_sync {
        Some(ts) => println!("Last sync: {}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last sync: never"),
    }
    if let Some(revision) = report.revision {
        println!("Revision: {}", revision);
    }
    println!(
        "Cached: {} lists, {} tasks, {} users",
        report.counts.lists, report.counts.tasks, report.counts.users
    );

    Ok(())
}

pub(crate) fn report(state_dir: &Path) -> Result<StatusReport> {
    let config = Config::load(state_dir)?;
    let running = ProcessJobs::new(state_dir).pid(SYNC_JOB)?;

    let mut report = StatusReport {
        running,
        remote_url: config.remote_url().map(str::to_string),
        last_sync: None,
        revision: None,
        counts: StoreCounts::default(),
    };

    let db_path = get_db_path(state_dir);
    if !db_path.exists() {
        return Ok(report);
    }

    // Read-only: a store without the tables reports as empty
    let db = Database::open(&db_path)?;
    if !db.has_schema()? {
        return Ok(report);
    }
    if let Some(root) = db.root_state()? {
        report.last_sync = Some(root.synced_at);
        report.revision = Some(root.revision);
    }
    report.counts = db.counts()?;

    Ok(report)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
