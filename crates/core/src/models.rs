// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Row types mirrored from the remote to-do service.
//!
//! These are plain records: the cache stores whatever the remote reports,
//! keyed by the remote's numeric ids.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A task list (the remote's "list" entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub title: String,
    /// Sort position within the account.
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub revision: i64,
}

/// A single to-do item belonging to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub revision: i64,
}

/// A user visible to the account (owner or collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub revision: i64,
}

/// State of the root aggregate: which remote revision the cache reflects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootState {
    pub revision: i64,
    pub synced_at: DateTime<Utc>,
}

/// Number of cached rows per entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub lists: usize,
    pub tasks: usize,
    pub users: usize,
}
