// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use td_core::{JobError, ReconcileError};

/// All possible errors that can occur in the tdsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Creating the tables, or opening the store for a sync, failed.
    #[error("failed to create schema: {0}\n  hint: check that the state directory is writable")]
    Schema(#[source] rusqlite::Error),

    #[error("sync failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("{0}")]
    Job(#[from] JobError),

    #[error("a sync is already in progress\n  hint: run 'todosync status' to see it")]
    SyncInProgress,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corrupted data in database: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for tdsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<td_core::Error> for Error {
    fn from(e: td_core::Error) -> Self {
        match e {
            td_core::Error::Schema(e) => Error::Schema(e),
            td_core::Error::Database(e) => Error::Database(e),
            td_core::Error::Io(e) => Error::Io(e),
            td_core::Error::Json(e) => Error::CorruptedData(e.to_string()),
            td_core::Error::CorruptedData(s) => Error::CorruptedData(s),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
