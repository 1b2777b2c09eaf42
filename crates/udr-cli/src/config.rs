//! Config file loading
//!
//! The config file is optional. The first of these that exists is used:
//! 1. The path given with `--config` (must exist)
//! 2. `./udr.toml`
//! 3. `<config_dir>/udr/config.toml` (`~/.config/udr/config.toml` on Linux)
//!
//! Files are not merged. Values here sit below flags and `UDR_*` variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CliError, Result};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG: &str = "udr.toml";

/// Which route table backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON documents under a directory
    File,
    /// Azure Resource Manager
    Arm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub source: SourceConfig,
    pub backend: BackendConfig,
}

/// `[defaults]`: reconciliation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub cloud: Option<String>,
    pub prefix: Option<String>,
    pub capacity: Option<usize>,
    pub family: Option<String>,
}

/// `[source]`: where the service tag snapshot comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub timeout_secs: Option<u64>,
    pub document_url: Option<String>,
    pub download_page: Option<String>,
}

/// `[backend]`: where route tables live
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: Option<BackendKind>,
    pub table_dir: Option<PathBuf>,
    pub subscription: Option<String>,
    pub endpoint: Option<String>,
}

impl Config {
    /// Parses TOML config text; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Finds and loads the config file, or returns an empty config.
    ///
    /// `global_dir` is the per-user directory holding `config.toml`.
    pub fn discover(explicit: Option<&Path>, cwd: &Path, global_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading config from --config");
            return Self::load(path);
        }

        let local = cwd.join(LOCAL_CONFIG);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "Loading local config");
            return Self::load(&local);
        }

        if let Some(global) = global_dir.map(|d| d.join("config.toml"))
            && global.is_file()
        {
            tracing::debug!(path = %global.display(), "Loading user config");
            return Self::load(&global);
        }

        tracing::debug!("No config file found; using built-in defaults");
        Ok(Self::default())
    }
}

/// The per-user config directory, `<config_dir>/udr`.
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("udr"))
}
