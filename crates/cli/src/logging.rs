// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! Logs go to stderr. For a background sync job stderr is the job log file,
//! so the same setup serves both interactive and detached runs.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::env::vars;

/// Install the global subscriber. `RUST_LOG` overrides `default_level`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(vars::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}
