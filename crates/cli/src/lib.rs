// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tdsync - command-line front end for the todosync task-list cache.
//!
//! This crate wires the `todosync` binary to the store, reconciler and job
//! tracker in `td-core`.
//!
//! # Main Components
//!
//! - [`SyncLauncher`] - fire-and-forget background sync requests
//! - [`run_sync`] - one blocking reconciliation pass
//! - [`Config`] - state directory configuration (remote URL)
//! - [`Error`] - Error types for all operations
//!
//! # Requesting a sync
//!
//! ```rust,ignore
//! use tdsync::{find_entry_binary, state_dir, LaunchOutcome, SyncLauncher};
//! use td_core::ProcessJobs;
//!
//! let launcher = SyncLauncher::new(ProcessJobs::new(state_dir()), &find_entry_binary());
//! match launcher.request_background_sync() {
//!     LaunchOutcome::Spawned { pid } => println!("started {pid}"),
//!     LaunchOutcome::AlreadyRunning | LaunchOutcome::Failed => {}
//! }
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod sync;

pub use cli::{Cli, Command};
pub use config::{get_db_path, state_dir, Config, RemoteConfig};
pub use error::{Error, Result};
pub use launcher::{find_entry_binary, sync_command, LaunchOutcome, SyncLauncher, SYNC_JOB};
pub use sync::run_sync;

use clap::CommandFactory;
use clap_complete::generate;

/// Execute a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Sync { commit: true } => commands::sync::commit(),
        Command::Sync { commit: false } => commands::sync::request(),
        Command::Status => commands::status::run(),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "todosync", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
