// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use std::time::Instant;
use tempfile::TempDir;

const JOB: &str = "sync";

fn cmd(parts: &[&str]) -> Vec<OsString> {
    parts.iter().map(OsString::from).collect()
}

/// Poll until `check` passes or the timeout elapses.
fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// Pid of a process that has already exited and been reaped.
fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

#[test]
fn not_running_without_state_files() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    assert!(!jobs.is_job_running(JOB).unwrap());
    assert_eq!(jobs.pid(JOB).unwrap(), None);
}

#[test]
fn guard_marks_job_running_until_dropped() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let guard = jobs.acquire(JOB).unwrap().unwrap();
    assert_eq!(guard.pid(), std::process::id());
    assert!(jobs.is_job_running(JOB).unwrap());
    assert_eq!(jobs.pid(JOB).unwrap(), Some(std::process::id()));

    drop(guard);
    assert!(!jobs.is_job_running(JOB).unwrap());
    assert!(!jobs.pid_path(JOB).exists());
}

#[test]
fn second_acquire_fails_while_guard_held() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let _guard = jobs.acquire(JOB).unwrap().unwrap();
    assert!(jobs.acquire(JOB).unwrap().is_none());
}

#[test]
fn guards_for_different_jobs_are_independent() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let _sync = jobs.acquire("sync").unwrap().unwrap();
    assert!(jobs.acquire("export").unwrap().is_some());
}

#[test]
fn dead_registration_is_stale_and_removed() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());
    fs::write(jobs.pid_path(JOB), dead_pid().to_string()).unwrap();

    assert!(!jobs.is_job_running(JOB).unwrap());
    assert!(!jobs.pid_path(JOB).exists());
}

#[test]
fn registration_past_grace_without_lock_is_stale() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path()).with_startup_grace(Duration::ZERO);
    // Alive, but never took the lock
    fs::write(jobs.pid_path(JOB), std::process::id().to_string()).unwrap();

    assert!(!jobs.is_job_running(JOB).unwrap());
    assert!(!jobs.pid_path(JOB).exists());
}

#[test]
fn fresh_registration_of_live_process_counts_as_running() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());
    fs::write(jobs.pid_path(JOB), std::process::id().to_string()).unwrap();

    assert!(jobs.is_job_running(JOB).unwrap());
}

#[test]
fn garbage_pid_file_is_ignored() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());
    fs::write(jobs.pid_path(JOB), "not-a-pid").unwrap();

    assert!(!jobs.is_job_running(JOB).unwrap());
}

#[test]
fn spawn_registers_pid_and_returns_immediately() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let start = Instant::now();
    let outcome = jobs.spawn_detached(JOB, &cmd(&["sleep", "5"])).unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));

    let SpawnOutcome::Spawned { pid } = outcome else {
        panic!("expected a spawn, got {outcome:?}");
    };
    assert_eq!(fs::read_to_string(jobs.pid_path(JOB)).unwrap(), pid.to_string());
    assert!(jobs.is_job_running(JOB).unwrap());
}

#[test]
fn spawn_while_running_is_noop() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let first = jobs.spawn_detached(JOB, &cmd(&["sleep", "3"])).unwrap();
    let second = jobs.spawn_detached(JOB, &cmd(&["sleep", "3"])).unwrap();

    assert!(matches!(first, SpawnOutcome::Spawned { .. }));
    assert_eq!(second, SpawnOutcome::AlreadyRunning);
}

#[test]
fn finished_job_allows_next_spawn() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let first = jobs.spawn_detached(JOB, &cmd(&["true"])).unwrap();
    assert!(matches!(first, SpawnOutcome::Spawned { .. }));

    // Well inside the startup grace window, so only reaping ends the job
    assert!(wait_for(Duration::from_secs(5), || {
        !jobs.is_job_running(JOB).unwrap()
    }));
    assert!(!jobs.pid_path(JOB).exists());

    let second = jobs.spawn_detached(JOB, &cmd(&["sleep", "1"])).unwrap();
    assert!(matches!(second, SpawnOutcome::Spawned { .. }));
}

#[test]
fn spawn_while_guard_held_is_noop() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());
    let _guard = jobs.acquire(JOB).unwrap().unwrap();

    let outcome = jobs.spawn_detached(JOB, &cmd(&["true"])).unwrap();
    assert_eq!(outcome, SpawnOutcome::AlreadyRunning);
}

#[test]
fn spawn_passes_env_and_logs_stderr() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.txt");
    let jobs = ProcessJobs::new(temp.path().join("jobs")).env("TD_JOB_MARKER", "hello");

    let script = format!("echo $TD_JOB_MARKER > {}; echo oops >&2", out.display());
    jobs.spawn_detached(JOB, &cmd(&["sh", "-c", &script]))
        .unwrap();

    assert!(wait_for(Duration::from_secs(5), || {
        fs::read_to_string(&out).is_ok_and(|s| s.trim() == "hello")
    }));
    assert!(wait_for(Duration::from_secs(5), || {
        fs::read_to_string(jobs.log_path(JOB)).is_ok_and(|s| s.contains("oops"))
    }));
}

#[test]
fn spawn_empty_command_is_error() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let err = jobs.spawn_detached(JOB, &[]).unwrap_err();
    assert!(matches!(err, JobError::EmptyCommand(_)));
}

#[test]
fn spawn_missing_program_is_spawn_error() {
    let temp = TempDir::new().unwrap();
    let jobs = ProcessJobs::new(temp.path());

    let err = jobs
        .spawn_detached(JOB, &cmd(&["/nonexistent/todosync-entry", "sync", "--commit"]))
        .unwrap_err();

    assert!(matches!(err, JobError::Spawn { .. }));
    assert!(err.to_string().contains("/nonexistent/todosync-entry"));
    assert!(!jobs.pid_path(JOB).exists());
    assert!(!jobs.is_job_running(JOB).unwrap());
}
