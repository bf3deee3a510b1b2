// lib/src/config/config_defaults.rs

use std::path::PathBuf;

use super::config_structs::StorageEngineType;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "dental.toml";
pub const DEFAULT_DATA_DIRECTORY: &str = "./dental_data";
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;
pub const DEFAULT_TOP_PATIENTS_LIMIT: usize = 10;

pub fn default_storage_engine_type() -> StorageEngineType { StorageEngineType::Sled }
pub fn default_data_path() -> PathBuf { PathBuf::from(DEFAULT_DATA_DIRECTORY) }
pub fn default_seed_enabled() -> bool { true }
pub fn default_include_sample_incident() -> bool { false }
pub fn default_max_file_size_bytes() -> u64 { DEFAULT_MAX_FILE_SIZE_BYTES }
pub fn default_upcoming_limit() -> usize { DEFAULT_UPCOMING_LIMIT }
pub fn default_top_patients_limit() -> usize { DEFAULT_TOP_PATIENTS_LIMIT }
