//! Upload configuration.
//!
//! Values are layered with increasing precedence:
//!
//! 1. Built-in defaults
//! 2. Global config file (`sheetsplit.toml` in the platform config directory)
//! 3. Explicit `--config` file
//! 4. Environment variables (`SHEETSPLIT_*` prefix)
//! 5. Command-line flags (applied by the caller)

use crate::error::{Error, Result};
use crate::partition::DEFAULT_MAX_CELLS;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 100_000;
pub const CONFIG_FILE_NAME: &str = "sheetsplit.toml";

/// Get the directory holding the global configuration file
pub fn get_global_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "sheetsplit", "sheetsplit")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// OAuth client secrets downloaded from the Google Cloud console.
    pub credentials: PathBuf,
    /// Cached authorized-user token.
    pub token: PathBuf,
    /// Where the list of spreadsheet URLs is written. Derived from the CSV
    /// file name when unset.
    pub output: Option<PathBuf>,
    pub max_cells: usize,
    /// Rows per values-update request.
    pub batch_size: usize,
    /// Grant "anyone with the link" access to each new spreadsheet.
    pub share: bool,
    pub share_role: String,
    /// Title of the first sheet in a newly created spreadsheet.
    pub sheet_title: String,
    /// Prefix for spreadsheet titles. Defaults to the CSV file stem.
    pub title_prefix: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("oauth_credentials.json"),
            token: PathBuf::from("token.json"),
            output: None,
            max_cells: DEFAULT_MAX_CELLS,
            batch_size: DEFAULT_BATCH_SIZE,
            share: true,
            share_role: "writer".to_string(),
            sheet_title: "Sheet1".to_string(),
            title_prefix: None,
        }
    }
}

impl UploadConfig {
    /// Load defaults, the global config file if present, then `explicit`
    /// when given, then environment overrides.
    ///
    /// Not validated: the caller applies command-line flags first and then
    /// calls [`UploadConfig::validate`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_files(explicit)?;
        config.merge_env_vars(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Like [`UploadConfig::load`], but only the credential and token paths
    /// are taken from the environment. Upload settings are left unparsed.
    pub fn load_for_auth(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_files(explicit)?;
        config.merge_auth_env_vars(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_files(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match get_global_config_dir() {
            Ok(dir) if dir.join(CONFIG_FILE_NAME).exists() => {
                Self::from_file(&dir.join(CONFIG_FILE_NAME))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `SHEETSPLIT_*` overrides. `lookup` is injected so tests do not
    /// touch the process environment.
    pub fn merge_env_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.merge_auth_env_vars(&lookup);

        if let Some(value) = lookup("SHEETSPLIT_MAX_CELLS") {
            self.max_cells = parse_env("SHEETSPLIT_MAX_CELLS", &value)?;
        }

        if let Some(value) = lookup("SHEETSPLIT_BATCH_SIZE") {
            self.batch_size = parse_env("SHEETSPLIT_BATCH_SIZE", &value)?;
        }

        if let Some(value) = lookup("SHEETSPLIT_SHARE") {
            self.share = parse_env("SHEETSPLIT_SHARE", &value)?;
        }

        Ok(())
    }

    /// Apply `SHEETSPLIT_CREDENTIALS` and `SHEETSPLIT_TOKEN` only.
    pub fn merge_auth_env_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SHEETSPLIT_CREDENTIALS") {
            self.credentials = PathBuf::from(path);
        }

        if let Some(path) = lookup("SHEETSPLIT_TOKEN") {
            self.token = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cells == 0 {
            return Err(Error::Config("max_cells must be greater than 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than 0".to_string()));
        }
        if self.sheet_title.is_empty() {
            return Err(Error::Config("sheet_title must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {key}: {value:?}")))
}
