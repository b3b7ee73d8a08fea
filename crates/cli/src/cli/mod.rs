// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "todosync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep a local cache of your remote to-do lists in sync")]
#[command(
    long_about = "Keep a local cache of your remote to-do lists in sync.\n\n\
    'todosync sync' returns immediately and syncs in the background; at most one \
    sync runs at a time no matter how often it is requested."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sync the local cache with the remote
    #[command(after_help = "\
Examples:
  todosync sync             Start a background sync and return immediately
  todosync sync --commit    Sync now and wait for it to finish")]
    Sync {
        /// Run the sync in this process and wait for it to finish
        #[arg(long)]
        commit: bool,
    },

    /// Show sync status and cache contents
    Status,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Command {
    /// Log level used when `RUST_LOG` is unset.
    ///
    /// Blocking syncs usually run detached with stderr going to the job log,
    /// so they log progress; interactive commands only log problems.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Command::Sync { commit: true } => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
