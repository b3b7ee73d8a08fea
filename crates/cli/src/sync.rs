// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync: one complete, blocking pass.

use td_core::{Database, Reconcile, SyncSummary};

use crate::error::Result;

/// Ensure the schema exists, then run `reconciler` exactly once.
///
/// Schema failures abort before reconciliation. Reconciliation errors are
/// returned as [`Error::Reconcile`](crate::Error::Reconcile) wrapping the
/// reconciler's error unchanged; nothing written before the failure is
/// rolled back here.
pub fn run_sync(db: &mut Database, reconciler: &dyn Reconcile) -> Result<SyncSummary> {
    db.ensure_schema()?;
    let summary = reconciler.sync(db)?;
    Ok(summary)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
