//! Configuration types
//!
//! Board-agnostic configuration structures. The binary reads and writes
//! them as TOML; every field has a default so a partial file is valid.

pub mod types;

pub use types::*;
