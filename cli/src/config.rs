//! Configuration loading and CLI override logic.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use passport_photo::PassportConfig;

use crate::args::PassportArgs;

/// Load settings from `config_path`, or the built-in defaults.
pub fn load_settings(config_path: Option<&Path>) -> Result<PassportConfig> {
    let Some(path) = config_path else {
        return Ok(PassportConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings: PassportConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings in {}", path.display()))?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Apply command-line arguments on top of loaded or default settings.
pub fn apply_cli_overrides(settings: &mut PassportConfig, args: &PassportArgs) {
    if let Some(dpi) = args.dpi {
        settings.target_dpi = dpi;
    }
    if let Some(quality) = args.quality {
        settings.final_quality = quality;
    }
}
