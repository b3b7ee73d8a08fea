// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `todosync` bound to the given state directory.
pub fn todosync(state_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("todosync");
    cmd.env("TODOSYNC_STATE_DIR", state_dir)
        .env_remove("TODOSYNC_BINARY")
        .env_remove("RUST_LOG");
    cmd
}

/// Remote account snapshot at revision 7: 2 lists, 3 tasks, 1 user.
pub fn snapshot() -> String {
    serde_json::json!({
        "revision": 7,
        "lists": [
            { "id": 1, "title": "Inbox", "position": 0 },
            { "id": 2, "title": "Groceries", "position": 1 }
        ],
        "tasks": [
            { "id": 10, "list_id": 1, "title": "Call mom", "starred": true },
            { "id": 11, "list_id": 2, "title": "Milk" },
            { "id": 12, "list_id": 2, "title": "Eggs", "completed": true }
        ],
        "users": [{ "id": 100, "name": "alice" }]
    })
    .to_string()
}

/// Write `snapshot` next to the state dir and point the config at it.
pub fn configure_remote(temp: &TempDir, snapshot: &str) -> PathBuf {
    let state_dir = temp.path().join("state");
    std::fs::create_dir_all(&state_dir).unwrap();
    let snapshot_path = temp.path().join("remote.json");
    std::fs::write(&snapshot_path, snapshot).unwrap();
    std::fs::write(
        state_dir.join("config.toml"),
        format!("[remote]\nurl = \"file:{}\"\n", snapshot_path.display()),
    )
    .unwrap();
    state_dir
}

/// Poll until `check` passes or the timeout elapses.
pub fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    check()
}

/// stdout of `todosync status`.
pub fn status_output(state_dir: &Path) -> String {
    let output = todosync(state_dir).arg("status").output().unwrap();
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Wait until no sync job is alive for `state_dir`.
pub fn wait_idle(state_dir: &Path) -> bool {
    wait_for(Duration::from_secs(10), || {
        status_output(state_dir).contains("Sync: idle")
    })
}
