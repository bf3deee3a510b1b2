// lib/src/config/mod.rs

pub mod config_defaults;
pub mod config_structs;

pub use config_defaults::*;
pub use config_structs::{
    AttachmentConfig, ClinicConfig, DashboardConfig, SeedConfig, StorageConfig, StorageEngineType,
};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

impl ClinicConfig {
    /// Parses a TOML document; absent sections and keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse clinic config TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize clinic config to TOML")
    }
}

/// Loads the config at `path`, or the defaults when no file is there.
pub fn load_config(path: Option<&Path>) -> Result<ClinicConfig> {
    let Some(path) = path else {
        debug!("No config path given, using defaults");
        return Ok(ClinicConfig::default());
    };
    if !path.exists() {
        info!("Config file {:?} not found, using defaults", path);
        return Ok(ClinicConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let config = ClinicConfig::from_toml_str(&content)?;
    info!("Loaded config from {:?}", path);
    Ok(config)
}
