//! Config file access

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use pettrac_core::config::Config;
use thiserror::Error;

/// Config path used when neither the command line nor the environment
/// names one
pub const DEFAULT_PATH: &str = "/etc/pettrac/pettrac.toml";

/// Environment variable overriding [`DEFAULT_PATH`]
pub const CONFIG_ENV: &str = "PETTRAC_CONFIG";

/// Bundled default configuration
pub const DEFAULT_CONFIG: &str = include_str!("../../pettrac.toml");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pick the config path: first argument, then `PETTRAC_CONFIG`, then
/// [`DEFAULT_PATH`]
pub fn config_path(arg: Option<OsString>, env: Option<OsString>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH))
}

/// A config file on disk
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file
    ///
    /// Returns `Ok(None)` if the file does not exist. Missing keys take
    /// their default values.
    pub fn load(&self) -> Result<Option<Config>, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let config = self.parse(&text)?;
        info!("Loaded configuration from {}", self.path.display());
        Ok(Some(config))
    }

    /// Write the bundled default file and return its contents
    pub fn create_default(&self) -> Result<Config, ConfigError> {
        let config = self.parse(DEFAULT_CONFIG)?;
        self.write(DEFAULT_CONFIG)?;
        info!("Created default configuration at {}", self.path.display());
        Ok(config)
    }

    /// Replace the file with `config`
    ///
    /// The file is written next to the target and renamed over it, so a
    /// crash mid-write leaves the previous file intact. Comments in the
    /// previous file are not preserved.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(config)?;
        self.write(&text)?;
        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    fn parse(&self, text: &str) -> Result<Config, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, text: &str) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}
