// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use tdsync::Cli;

fn main() {
    let cli = Cli::parse();
    tdsync::logging::init(cli.command.default_log_level());
    if let Err(e) = tdsync::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
