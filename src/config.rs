// src/config.rs

//! Configuration for the keystroke reader.
//!
//! Every struct carries `#[serde(default)]`, so a configuration file only
//! needs the settings it changes. The file is JSON and is located through the
//! `GETCH_TERM_CONFIG` environment variable; without it the defaults apply.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backends::DEFAULT_BATCH_CAPACITY;
use crate::error::{GetchError, Result};
use log::{info, warn};
use once_cell::sync::Lazy;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "GETCH_TERM_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

/// Root of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Input-stream settings.
    pub input: InputConfig,
}

/// Settings for how terminal input is acquired and read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum number of records pulled from the OS per read.
    pub batch_capacity: usize,
    /// Terminal device opened by the Unix backend. Ignored on Windows,
    /// which always reads the console input buffer.
    pub device: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            device: PathBuf::from("/dev/tty"),
        }
    }
}

impl Config {
    /// Parses a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GetchError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Self::from_json(&text)
            .map_err(|e| GetchError::Config {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
            .map(Config::sanitized)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Loads the file named by `GETCH_TERM_CONFIG`, falling back to defaults
    /// (with a warning) when it is unset or unusable.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Config::default();
        };
        let path = PathBuf::from(path);
        match Config::from_file(&path) {
            Ok(config) => {
                info!("config: loaded {}", path.display());
                config
            }
            Err(e) => {
                warn!("config: {}. Using defaults.", e);
                Config::default()
            }
        }
    }

    /// Clamps values that would stall the reader.
    pub fn sanitized(mut self) -> Self {
        if self.input.batch_capacity == 0 {
            warn!("config: batch_capacity must be at least 1, using 1");
            self.input.batch_capacity = 1;
        }
        self
    }
}
