// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration and state directory management.
//!
//! Everything todosync persists lives in one state directory
//! (`~/.local/state/todosync/` by default):
//! - `config.toml`: optional settings, currently just the `[remote]` section
//! - `tasks.db`: the SQLite cache
//! - `sync.lock`, `sync.pid`, `sync.log`: background sync job state

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use td_core::{ReconcileError, Remote};

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "todosync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "tasks.db";

/// Settings stored in `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote to mirror (optional - without it, sync has nothing to pull).
    pub remote: Option<RemoteConfig>,
}

/// Remote account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote URL. Formats:
    /// - `file:<path>` - JSON snapshot of the account
    pub url: String,
}

impl RemoteConfig {
    /// Validates that the URL is in a recognized format.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        match self.url.strip_prefix("file:") {
            Some(path) if !path.is_empty() => None,
            Some(_) => Some("file: URL requires a path".to_string()),
            None => Some(format!(
                "invalid remote URL '{}': must be file:<path>",
                self.url
            )),
        }
    }
}

impl Config {
    /// Loads configuration from the given state directory.
    ///
    /// A missing `config.toml` yields the default configuration.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given state directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Returns the remote URL if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Open the configured remote.
    pub fn open_remote(&self) -> Result<Box<dyn Remote>> {
        let remote = self.remote.as_ref().ok_or(ReconcileError::NotConfigured)?;
        if let Some(error_msg) = remote.validate_url() {
            return Err(Error::Config(error_msg));
        }
        Ok(td_core::remote::open(&remote.url)?)
    }
}

/// Get the todosync state directory.
///
/// Uses `$TODOSYNC_STATE_DIR` if set, otherwise
/// `$XDG_STATE_HOME/todosync` or `~/.local/state/todosync`.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(APP_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(APP_DIR_NAME))
}

/// Get the database path inside the state directory.
pub fn get_db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
