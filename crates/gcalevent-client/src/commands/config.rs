//! Configuration commands.

use std::path::Path;

use gcalevent_core::time::resolve_timezone;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, secrets masked.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    check(config)?;
    println!("Configuration is valid.");
    Ok(())
}

fn check(config: &ClientConfig) -> ClientResult<()> {
    if config.defaults.calendar_id.trim().is_empty() {
        return Err(ClientError::Config(
            "defaults.calendar_id must not be empty".to_string(),
        ));
    }
    if config.defaults.max_results == 0 {
        return Err(ClientError::Config(
            "defaults.max_results must be at least 1".to_string(),
        ));
    }
    resolve_timezone(&config.defaults.timezone)
        .map_err(|e| ClientError::Config(format!("defaults.timezone: {}", e)))?;
    if config.recordings.folder.trim().is_empty() {
        return Err(ClientError::Config(
            "recordings.folder must not be empty".to_string(),
        ));
    }

    config.google.to_config_spec()?;
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
