// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

use std::time::{Duration, Instant};

#[test]
fn commit_populates_cache() {
    let temp = TempDir::new().unwrap();
    let state_dir = configure_remote(&temp, &snapshot());

    todosync(&state_dir)
        .args(["sync", "--commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Synced revision 7: 2 lists, 3 tasks, 1 users (0 removed).",
        ));

    assert!(state_dir.join("tasks.db").exists());
    assert!(status_output(&state_dir).contains("Cached: 2 lists, 3 tasks, 1 users"));
}

#[test]
fn commit_twice_reports_up_to_date() {
    let temp = TempDir::new().unwrap();
    let state_dir = configure_remote(&temp, &snapshot());

    todosync(&state_dir).args(["sync", "--commit"]).assert().success();
    todosync(&state_dir)
        .args(["sync", "--commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date (revision 7)."));
}

#[test]
fn commit_without_remote_fails() {
    let temp = TempDir::new().unwrap();

    todosync(temp.path())
        .args(["sync", "--commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"));
}

#[test]
fn commit_with_unreadable_snapshot_fails() {
    let temp = TempDir::new().unwrap();
    let state_dir = configure_remote(&temp, "not json");

    todosync(&state_dir)
        .args(["sync", "--commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid snapshot"));
}

#[test]
fn commit_with_bad_config_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "[remote\n").unwrap();

    todosync(temp.path())
        .args(["sync", "--commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn background_sync_returns_and_populates_cache() {
    let temp = TempDir::new().unwrap();
    let state_dir = configure_remote(&temp, &snapshot());

    let start = Instant::now();
    todosync(&state_dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync started in background"));
    assert!(start.elapsed() < Duration::from_secs(5));

    assert!(wait_for(Duration::from_secs(10), || {
        status_output(&state_dir).contains("Cached: 2 lists, 3 tasks, 1 users")
    }));
    assert!(wait_idle(&state_dir));
}

#[test]
fn background_sync_without_remote_still_succeeds() {
    let temp = TempDir::new().unwrap();

    // The request itself never fails; the job's error lands in its log
    todosync(temp.path()).arg("sync").assert().success();

    assert!(wait_idle(temp.path()));
    assert!(wait_for(Duration::from_secs(5), || {
        std::fs::read_to_string(temp.path().join("sync.log"))
            .is_ok_and(|log| log.contains("no remote configured"))
    }));
}

#[test]
fn background_sync_with_missing_entry_binary_succeeds() {
    let temp = TempDir::new().unwrap();
    let state_dir = configure_remote(&temp, &snapshot());

    todosync(&state_dir)
        .env("TODOSYNC_BINARY", temp.path().join("no-such-binary"))
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync started").not());

    assert!(!state_dir.join("tasks.db").exists());
}

#[test]
fn completion_bash() {
    let temp = TempDir::new().unwrap();

    todosync(temp.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("todosync"));
}
