// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background job tracking: "is it running?" and detached spawning.
//!
//! [`ProcessJobs`] keeps three files per job identity in its directory:
//!
//! - `<job>.lock` - exclusive flock held by the running job for its whole
//!   lifetime (see [`JobGuard`]); the kernel drops it when the process dies.
//! - `<job>.pid` - pid registered by the spawner right after `spawn`, then
//!   rewritten by the job once it holds the lock.
//! - `<job>.spawn.lock` - flock serializing re-check, spawn and register
//!   among concurrent spawners.
//!
//! A job counts as running while its lock is held, or while a freshly
//! registered pid is alive and the job has not yet taken the lock. Two
//! spawners racing outside this adapter can still both spawn; the loser then
//! fails to take the job lock, so at most one job body runs at a time.
//!
//! Spawned children are reaped on a background thread, so a finished job
//! does not linger as a zombie in a long-lived spawner.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use fs2::FileExt;

/// How long a registered pid counts as "starting up" without holding the lock.
pub const STARTUP_GRACE: Duration = Duration::from_secs(10);

/// Attempts made by [`ProcessJobs::acquire`] before giving up.
const ACQUIRE_ATTEMPTS: u32 = 25;
/// Delay between lock attempts.
const ACQUIRE_INTERVAL: Duration = Duration::from_millis(10);

/// Error type for job tracking operations.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Reading or writing the job files failed.
    #[error("job state error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty command for job '{0}'")]
    EmptyCommand(String),

    /// The OS refused to create the process.
    #[error("failed to start job '{job}' ({program}): {source}")]
    Spawn {
        job: String,
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for job tracking operations.
pub type JobResult<T> = Result<T, JobError>;

/// What a spawn request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// A new detached process was started.
    Spawned { pid: u32 },
    /// A job with this identity was already alive; nothing was started.
    AlreadyRunning,
}

/// Tracks and launches background jobs by identity.
pub trait JobTracker {
    /// Is a job tagged `job` currently alive?
    fn is_job_running(&self, job: &str) -> JobResult<bool>;

    /// Start `command` as a detached process tagged `job`, unless one is
    /// already alive. Returns without waiting for the process.
    fn spawn_detached(&self, job: &str, command: &[OsString]) -> JobResult<SpawnOutcome>;
}

/// [`JobTracker`] backed by OS processes plus lock and pid files.
#[derive(Debug, Clone)]
pub struct ProcessJobs {
    dir: PathBuf,
    envs: Vec<(OsString, OsString)>,
    startup_grace: Duration,
}

impl ProcessJobs {
    /// Track jobs with state files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ProcessJobs {
            dir: dir.into(),
            envs: Vec::new(),
            startup_grace: STARTUP_GRACE,
        }
    }

    /// Set an environment variable for every spawned job.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Override [`STARTUP_GRACE`].
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lock_path(&self, job: &str) -> PathBuf {
        self.dir.join(format!("{job}.lock"))
    }

    pub fn pid_path(&self, job: &str) -> PathBuf {
        self.dir.join(format!("{job}.pid"))
    }

    pub fn spawn_lock_path(&self, job: &str) -> PathBuf {
        self.dir.join(format!("{job}.spawn.lock"))
    }

    /// Where a spawned job's stderr goes.
    pub fn log_path(&self, job: &str) -> PathBuf {
        self.dir.join(format!("{job}.log"))
    }

    /// Pid of the running job, if any.
    pub fn pid(&self, job: &str) -> JobResult<Option<u32>> {
        if !self.is_job_running(job)? {
            return Ok(None);
        }
        Ok(read_pid_file(&self.pid_path(job)))
    }

    /// Take the job lock for the current process.
    ///
    /// Retries briefly so a concurrent status probe does not make the job
    /// give up. Returns `None` if another live process holds the lock.
    pub fn acquire(&self, job: &str) -> JobResult<Option<JobGuard>> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path(job))?;

        for _ in 0..ACQUIRE_ATTEMPTS {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    let pid = std::process::id();
                    let pid_path = self.pid_path(job);
                    write_pid_file(&pid_path, pid)?;
                    tracing::debug!(job, pid, "acquired job lock");
                    return Ok(Some(JobGuard {
                        file,
                        pid_path,
                        pid,
                    }));
                }
                Err(e) if is_contended(&e) => std::thread::sleep(ACQUIRE_INTERVAL),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(None)
    }

    /// Is the job lock held by some process?
    fn lock_held(&self, job: &str) -> JobResult<bool> {
        let lock_path = self.lock_path(job);
        if !lock_path.exists() {
            return Ok(false);
        }

        let file = File::open(&lock_path)?;
        match FileExt::try_lock_shared(&file) {
            Ok(()) => {
                let _ = FileExt::unlock(&file);
                Ok(false)
            }
            Err(e) if is_contended(&e) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Is there a fresh registration for a live process? Cleans up stale ones.
    fn registration_alive(&self, job: &str) -> JobResult<bool> {
        let pid_path = self.pid_path(job);
        let Some(pid) = read_pid_file(&pid_path) else {
            return Ok(false);
        };

        let age = match fs::metadata(&pid_path).and_then(|m| m.modified()) {
            Ok(modified) => modified.elapsed().unwrap_or(Duration::ZERO),
            Err(_) => return Ok(false),
        };

        if age < self.startup_grace && process_alive(pid) {
            return Ok(true);
        }

        tracing::debug!(job, pid, "removing stale pid file");
        let _ = fs::remove_file(&pid_path);
        Ok(false)
    }
}

impl JobTracker for ProcessJobs {
    fn is_job_running(&self, job: &str) -> JobResult<bool> {
        Ok(self.lock_held(job)? || self.registration_alive(job)?)
    }

    fn spawn_detached(&self, job: &str, command: &[OsString]) -> JobResult<SpawnOutcome> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| JobError::EmptyCommand(job.to_string()))?;

        fs::create_dir_all(&self.dir)?;

        // Held until return: re-check, spawn and register happen as one unit
        let spawn_lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.spawn_lock_path(job))?;
        match FileExt::try_lock_exclusive(&spawn_lock) {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                tracing::debug!(job, "another spawner is starting this job");
                return Ok(SpawnOutcome::AlreadyRunning);
            }
            Err(e) => return Err(e.into()),
        }

        if self.is_job_running(job)? {
            return Ok(SpawnOutcome::AlreadyRunning);
        }

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(job))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log));
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: terminal signals to the caller don't reach the job
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| JobError::Spawn {
            job: job.to_string(),
            program: program.to_string_lossy().into_owned(),
            source,
        })?;
        let pid = child.id();

        if let Err(e) = write_pid_file(&self.pid_path(job), pid) {
            // The job registers itself once it holds the lock
            tracing::warn!(job, pid, "failed to register job pid: {}", e);
        }

        // Reap the child once it exits; a zombie still answers kill(pid, 0)
        let reaper = std::thread::Builder::new()
            .name(format!("reap-{job}"))
            .spawn(move || {
                let _ = child.wait();
            });
        if let Err(e) = reaper {
            tracing::warn!(job, pid, "failed to start reaper thread: {}", e);
        }

        tracing::info!(job, pid, "spawned detached job");
        Ok(SpawnOutcome::Spawned { pid })
    }
}

/// Proof that the current process is the running instance of a job.
///
/// Dropping the guard releases the lock and removes the pid file.
#[derive(Debug)]
pub struct JobGuard {
    file: File,
    pid_path: PathBuf,
    pid: u32,
}

impl JobGuard {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        // Leave a newer registration alone
        if read_pid_file(&self.pid_path) == Some(self.pid) {
            let _ = fs::remove_file(&self.pid_path);
        }
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Read PID from the PID file.
fn read_pid_file(pid_path: &Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|pid| *pid > 0)
}

fn write_pid_file(pid_path: &Path, pid: u32) -> std::io::Result<()> {
    fs::write(pid_path, format!("{pid}"))
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None::<Signal>) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
