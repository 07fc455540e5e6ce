//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AccountKey, AppConfig};
use crate::common::errors::{ClientError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with BINANCE_CLI__)
/// 2. Configuration file (JSON or TOML, picked by extension)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if !Path::new(path).exists() {
            return Err(ClientError::Configuration(format!(
                "config file {path} does not exist"
            )));
        }
        builder = builder.add_source(File::with_name(path));
    }

    builder = builder.add_source(
        Environment::with_prefix("BINANCE_CLI")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("settings.default_assets"),
    );

    let config = builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ClientError::Configuration(e.to_string()))
}

/// Load account key pairs from a JSON key file
pub fn load_keys(path: impl AsRef<Path>) -> Result<Vec<AccountKey>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        ClientError::Configuration(format!("failed to read key file {}: {}", path.display(), e))
    })?;
    let keys: Vec<AccountKey> = serde_json::from_slice(&bytes)?;
    Ok(keys)
}
