// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for td-core store operations.

use thiserror::Error;

/// All possible errors that can occur while working with the local store.
#[derive(Debug, Error)]
pub enum Error {
    /// Creating the required tables failed. Fatal for a sync attempt.
    #[error("failed to create schema: {0}\n  hint: check that the state directory is writable")]
    Schema(#[source] rusqlite::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for td-core store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
