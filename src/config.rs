//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. Environment variables prefixed `DUPEFINDER_` (e.g. `DUPEFINDER_IO_THREADS=4`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! recursive = true
//! min_size = 1024
//! extensions = [".jpg", ".png"]
//! io_threads = 4
//! paranoid = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::FinderConfig;
use crate::scanner::{ExtensionFilter, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPEFINDER_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Minimum file size in bytes (inclusive).
    pub min_size: u64,
    /// Extensions to include; empty means all files.
    pub extensions: Vec<String>,
    /// Hashing workers; 1 hashes sequentially.
    pub io_threads: usize,
    /// Verify duplicate groups byte by byte.
    pub paranoid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursive: true,
            min_size: 0,
            extensions: Vec::new(),
            io_threads: 1,
            paranoid: false,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The merged configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The platform config directory cannot be determined.
    #[error("Failed to determine project directories")]
    NoProjectDirs,
}

impl Config {
    /// Load the layered configuration.
    ///
    /// With `explicit` set, that file must exist and parse. Otherwise the
    /// platform default file is used when present, and a broken default file
    /// falls back to defaults plus environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing or invalid explicit file, or
    /// invalid environment values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            log::debug!("Loading config from {}", path.display());
            return Ok(Self::figment(Some(path)).extract().map_err(Box::new)?);
        }

        let default_path = Self::default_path().ok().filter(|p| p.is_file());
        if let Some(ref path) = default_path {
            match Self::figment(Some(path)).extract() {
                Ok(config) => return Ok(config),
                Err(e) => log::debug!(
                    "Ignoring invalid config file {}: {}",
                    path.display(),
                    e
                ),
            }
        }

        Ok(Self::figment(None).extract().map_err(Box::new)?)
    }

    /// Defaults, then the optional file, then the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Platform-specific location of `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoProjectDirs`] if no home directory is known.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let project_dirs =
            ProjectDirs::from("", "", "dupefinder").ok_or(ConfigError::NoProjectDirs)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Walker settings described by this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.recursive,
            self.min_size,
            ExtensionFilter::new(self.extensions.iter().map(String::as_str)),
        )
    }

    /// Finder settings described by this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_walker_config(self.walker_config())
            .with_io_threads(self.io_threads)
            .with_paranoid(self.paranoid)
    }
}
