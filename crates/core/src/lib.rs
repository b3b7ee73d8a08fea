// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! td-core: Shared library for the todosync task-list cache
//!
//! This crate provides the local store, the reconciliation capability and the
//! background job tracker used by the todosync CLI.

pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod reconcile;
pub mod remote;

pub use db::Database;
pub use error::{Error, Result};
pub use jobs::{JobError, JobGuard, JobTracker, ProcessJobs, SpawnOutcome};
pub use models::{List, RootState, StoreCounts, Task, User};
pub use reconcile::{Reconcile, ReconcileError, Root, SyncSummary};
pub use remote::{FileRemote, Remote, Snapshot};
