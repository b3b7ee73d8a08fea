// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use clap::{CommandFactory, Parser};
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("todosync").chain(args.iter().copied()))
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn sync_defaults_to_background() {
    let cli = parse(&["sync"]).unwrap();
    assert!(matches!(cli.command, Command::Sync { commit: false }));
}

#[test]
fn sync_commit_flag() {
    let cli = parse(&["sync", "--commit"]).unwrap();
    assert!(matches!(cli.command, Command::Sync { commit: true }));
}

#[test]
fn status_takes_no_arguments() {
    assert!(matches!(parse(&["status"]).unwrap().command, Command::Status));
    assert!(parse(&["status", "extra"]).is_err());
}

#[test]
fn completion_requires_known_shell() {
    let cli = parse(&["completion", "zsh"]).unwrap();
    match cli.command {
        Command::Completion { shell } => assert_eq!(shell, clap_complete::Shell::Zsh),
        _ => panic!("expected completion command"),
    }
    assert!(parse(&["completion", "tcsh"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(parse(&[]).is_err());
}

#[parameterized(
    blocking_sync = { &["sync", "--commit"], "info" },
    background_sync = { &["sync"], "warn" },
    status = { &["status"], "warn" },
    completion = { &["completion", "bash"], "warn" },
)]
fn default_log_level(args: &[&str], expected: &str) {
    assert_eq!(parse(args).unwrap().command.default_log_level(), expected);
}
