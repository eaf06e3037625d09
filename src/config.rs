//! Resolved runtime configuration.
//!
//! Values come from the command line (or the matching environment variables,
//! see `main.rs`); everything else is derived from the config directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};

use crate::store::MAX_ENTRIES;

pub const CONFIG_DIR_NAME: &str = "clipboard_manager";
pub const HISTORY_FILE_NAME: &str = "clipboard_history.json";
pub const PID_FILE_NAME: &str = "listener.pid";
pub const LOG_DIR_NAME: &str = "logs";

/// Default sampling period: 10 polls per second.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub max_entries: usize,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            max_entries: MAX_ENTRIES,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// `~/.config/clipboard_manager`, falling back to the working directory
/// when `HOME` is unset.
pub fn default_config_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join(CONFIG_DIR_NAME)
}

impl Config {
    pub fn new(config_dir: Option<PathBuf>, max_entries: usize, poll_interval_ms: u64) -> Result<Self> {
        if max_entries == 0 {
            bail!("--max-entries must be at least 1");
        }
        if poll_interval_ms == 0 {
            bail!("--poll-interval-ms must be at least 1");
        }
        Ok(Self {
            config_dir: config_dir.unwrap_or_else(default_config_dir),
            max_entries,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }

    pub fn history_path(&self) -> PathBuf {
        self.config_dir.join(HISTORY_FILE_NAME)
    }

    pub fn pid_path(&self) -> PathBuf {
        self.config_dir.join(PID_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join(LOG_DIR_NAME)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Global options that reproduce this configuration in a child process.
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("--config-dir"),
            self.config_dir.clone().into_os_string(),
            OsString::from("--max-entries"),
            OsString::from(self.max_entries.to_string()),
            OsString::from("--poll-interval-ms"),
            OsString::from(self.poll_interval.as_millis().to_string()),
        ]
    }
}
