//! Configuration module for tunefetch
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;

/// Load settings from the first file found, or use defaults.
///
/// `TUNEFETCH_SETTINGS_PATH` wins over the default locations. Environment
/// overrides are applied on top in every case. Returns the file the settings
/// came from, if any.
pub fn load() -> Result<(Settings, Option<PathBuf>)> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var("TUNEFETCH_SETTINGS_PATH") {
        candidates.push(PathBuf::from(path));
    }
    candidates.extend(default_paths());

    for path in candidates {
        if path.exists() {
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok((settings, Some(path)));
        }
    }

    let mut settings = Settings::default();
    settings.merge_env();
    Ok((settings, None))
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("tunefetch.yml"),
        PathBuf::from("config/tunefetch.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tunefetch/settings.yml"));
    }
    paths
}
