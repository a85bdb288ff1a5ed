//! Build script for pettrac
//!
//! Validates the bundled pettrac.toml, which is compiled into the binary
//! and written out as the config file on first start.

use std::fs;
use std::path::Path;

const SECTIONS: [&str; 4] = ["display", "battery", "system", "pins"];

fn main() {
    println!("cargo:rerun-if-changed=pettrac.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("pettrac.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read pettrac.toml: {}", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("invalid TOML syntax in pettrac.toml:\n{}", e),
    };

    let mut errors = Vec::new();
    for section in SECTIONS {
        if config.get(section).and_then(|v| v.as_table()).is_none() {
            errors.push(format!("missing [{}] section", section));
        }
    }

    if let Some(rotation) = config
        .get("display")
        .and_then(|d| d.get("rotation"))
        .and_then(|r| r.as_integer())
    {
        if ![0, 90, 180, 270].contains(&rotation) {
            errors.push(format!("display.rotation = {} is not 0/90/180/270", rotation));
        }
    }

    if let Some(brightness) = config
        .get("display")
        .and_then(|d| d.get("brightness"))
        .and_then(|b| b.as_integer())
    {
        if !(0..=100).contains(&brightness) {
            errors.push(format!("display.brightness = {} is outside 0-100", brightness));
        }
    }

    if !errors.is_empty() {
        panic!("pettrac.toml is invalid:\n  {}", errors.join("\n  "));
    }
}
