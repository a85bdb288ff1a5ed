//! Configuration loading and persistence
//!
//! The config lives in a TOML file. On first start the bundled default
//! (pettrac.toml, validated at build time) is written to the path. Runtime
//! setting changes are written back by [`SettingsPersister`].

pub mod loader;
pub mod persist;

pub use loader::{config_path, ConfigError, ConfigStore, CONFIG_ENV, DEFAULT_CONFIG, DEFAULT_PATH};
pub use persist::SettingsPersister;
