// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed cache of the remote task lists.
//!
//! The [`Database`] struct is the single store handle of a process. It is
//! opened once by the caller and passed explicitly to the schema initializer
//! and to the reconciler; nothing in this crate keeps a global connection.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{List, RootState, StoreCounts, Task, User};

/// Tables that must exist before any sync activity.
pub const TABLES: [&str; 4] = ["root", "lists", "tasks", "users"];

/// SQL schema for the task-list cache.
///
/// Every statement is `IF NOT EXISTS`: applying it never alters or drops
/// an existing table.
pub const SCHEMA: &str = r#"
-- Root aggregate: single row recording the mirrored remote revision
CREATE TABLE IF NOT EXISTS root (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    revision INTEGER NOT NULL,
    synced_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lists (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    revision INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    list_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    starred INTEGER NOT NULL DEFAULT 0,
    due_date TEXT,                -- YYYY-MM-DD
    revision INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    revision INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id);
"#;

/// Create the required tables if they are absent.
///
/// Safe to call on every startup. Any failure is reported as
/// [`Error::Schema`].
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(Error::Schema)
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse an optional `YYYY-MM-DD` date from the database.
fn parse_date_opt(value: Option<String>) -> std::result::Result<Option<NaiveDate>, rusqlite::Error> {
    match value {
        None => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!("invalid due date '{s}'"))),
            )
        }),
    }
}

/// SQLite database connection with cache operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path.
    ///
    /// Does not create any tables; call [`Database::ensure_schema`] first.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL so a status read never blocks behind a background sync
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database { conn })
    }

    /// Create the required tables if they are absent.
    pub fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.conn)
    }

    /// Names of all user tables currently present, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Do all tables in [`TABLES`] exist?
    pub fn has_schema(&self) -> Result<bool> {
        let names = self.table_names()?;
        Ok(TABLES.iter().all(|t| names.iter().any(|n| n == t)))
    }

    /// The mirrored remote revision, or `None` if the cache was never synced.
    pub fn root_state(&self) -> Result<Option<RootState>> {
        let state = self
            .conn
            .query_row(
                "SELECT revision, synced_at FROM root WHERE id = 1",
                [],
                |row| {
                    let synced_str: String = row.get(1)?;
                    Ok(RootState {
                        revision: row.get(0)?,
                        synced_at: parse_timestamp(&synced_str, "synced_at")?,
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    /// Get all cached lists ordered by position.
    pub fn get_lists(&self) -> Result<Vec<List>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, position, revision FROM lists ORDER BY position, id")?;
        let lists = stmt
            .query_map([], |row| {
                Ok(List {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    position: row.get(2)?,
                    revision: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// Get all cached tasks ordered by id.
    pub fn get_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, list_id, title, completed, starred, due_date, revision
             FROM tasks ORDER BY id",
        )?;
        let tasks = stmt
            .query_map([], |row| {
                let due: Option<String> = row.get(5)?;
                Ok(Task {
                    id: row.get(0)?,
                    list_id: row.get(1)?,
                    title: row.get(2)?,
                    completed: row.get(3)?,
                    starred: row.get(4)?,
                    due_date: parse_date_opt(due)?,
                    revision: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Get all cached users ordered by id.
    pub fn get_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, revision FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    revision: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Count cached rows per entity table.
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
            Ok(usize::try_from(n).unwrap_or(0))
        };
        Ok(StoreCounts {
            lists: count("lists")?,
            tasks: count("tasks")?,
            users: count("users")?,
        })
    }

    /// Replace the cached contents with the given rows in one transaction.
    ///
    /// Rows are upserted by id; rows whose id is absent from the input are
    /// deleted. The root row is set to `revision` and `synced_at`. Returns
    /// the number of deleted rows.
    pub fn replace_all(
        &mut self,
        revision: i64,
        synced_at: DateTime<Utc>,
        lists: &[List],
        tasks: &[Task],
        users: &[User],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;

        for list in lists {
            tx.execute(
                "INSERT INTO lists (id, title, position, revision) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     position = excluded.position,
                     revision = excluded.revision",
                params![list.id, list.title, list.position, list.revision],
            )?;
        }
        for task in tasks {
            tx.execute(
                "INSERT INTO tasks (id, list_id, title, completed, starred, due_date, revision)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     list_id = excluded.list_id,
                     title = excluded.title,
                     completed = excluded.completed,
                     starred = excluded.starred,
                     due_date = excluded.due_date,
                     revision = excluded.revision",
                params![
                    task.id,
                    task.list_id,
                    task.title,
                    task.completed,
                    task.starred,
                    task.due_date.map(|d| d.to_string()),
                    task.revision,
                ],
            )?;
        }
        for user in users {
            tx.execute(
                "INSERT INTO users (id, name, email, revision) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     email = excluded.email,
                     revision = excluded.revision",
                params![user.id, user.name, user.email, user.revision],
            )?;
        }

        let mut removed = 0;
        removed += prune(&tx, "lists", lists.iter().map(|l| l.id).collect())?;
        removed += prune(&tx, "tasks", tasks.iter().map(|t| t.id).collect())?;
        removed += prune(&tx, "users", users.iter().map(|u| u.id).collect())?;

        tx.execute(
            "INSERT INTO root (id, revision, synced_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                 revision = excluded.revision,
                 synced_at = excluded.synced_at",
            params![revision, synced_at.to_rfc3339()],
        )?;

        tx.commit()?;
        Ok(removed)
    }
}

/// Delete rows of `table` whose id is not in `keep`.
fn prune(conn: &Connection, table: &str, keep: HashSet<i64>) -> Result<usize> {
    let existing: Vec<i64> = {
        let mut stmt = conn.prepare(&format!("SELECT id FROM {table}"))?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        ids
    };

    let mut removed = 0;
    for id in existing.into_iter().filter(|id| !keep.contains(id)) {
        removed += conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
