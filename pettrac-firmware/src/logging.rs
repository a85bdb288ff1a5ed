//! Logger setup

use std::str::FromStr;

use log::LevelFilter;

/// Level used when the configured one is not recognised
const FALLBACK_LEVEL: &str = "info";

/// Resolve the configured level name
///
/// Returns the filter string to use and whether the configured name was
/// accepted.
pub fn default_filter(level: &str) -> (&str, bool) {
    let level = level.trim();
    match LevelFilter::from_str(level) {
        Ok(_) => (level, true),
        Err(_) => (FALLBACK_LEVEL, false),
    }
}

/// Install the env_logger sink
///
/// `level` (from `system.log_level`) is the default filter; `RUST_LOG`
/// overrides it when set.
pub fn init(level: &str) {
    let (filter, valid) = default_filter(level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
    if !valid {
        log::warn!("Unknown log level {:?}, using {}", level, FALLBACK_LEVEL);
    }
}
