// server/src/cli/config.rs

// Resolves the effective configuration for one CLI invocation: config file,
// then command-line overrides, then the per-user data directory.

use anyhow::{Context, Result};
use lib::config::{load_config, ClinicConfig, DEFAULT_CONFIG_FILE_NAME, DEFAULT_DATA_DIRECTORY};
use log::debug;
use security::RolesConfig;
use std::path::{Path, PathBuf};

use crate::cli::commands::CliArgs;

const APP_DIRECTORY: &str = "dental-clinic";
const DEFAULT_ROLES_FILE_NAME: &str = "roles.yaml";

/// `<config dir>/dental-clinic/dental.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIRECTORY).join(DEFAULT_CONFIG_FILE_NAME))
}

/// `<data dir>/dental-clinic`, falling back to a directory next to the process.
pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIRECTORY))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIRECTORY))
}

/// Applies `--data-path`, or swaps the built-in relative default for the
/// per-user data directory. A path set in the config file is kept.
pub fn apply_overrides(mut config: ClinicConfig, data_path: Option<&Path>) -> ClinicConfig {
    match data_path {
        Some(path) => config.storage.data_path = path.to_path_buf(),
        None if config.storage.data_path.as_path() == Path::new(DEFAULT_DATA_DIRECTORY) => {
            config.storage.data_path = default_data_path();
        }
        None => {}
    }
    config
}

pub fn load_cli_config(args: &CliArgs) -> Result<ClinicConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let config = load_config(path.as_deref())?;
    let config = apply_overrides(config, args.data_path.as_deref());
    debug!("Effective config: {:?}", config);
    Ok(config)
}

/// Built-in permissions unless `--roles` or `<config dir>/dental-clinic/roles.yaml` says otherwise.
pub fn load_roles_config(args: &CliArgs) -> Result<RolesConfig> {
    if let Some(path) = &args.roles {
        return RolesConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load roles from {}", path.display()));
    }
    match dirs::config_dir().map(|dir| dir.join(APP_DIRECTORY).join(DEFAULT_ROLES_FILE_NAME)) {
        Some(path) if path.exists() => RolesConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load roles from {}", path.display())),
        _ => Ok(RolesConfig::default()),
    }
}
