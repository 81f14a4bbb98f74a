//! Loading and saving the TOML configuration file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::schema::AppConfig;
use crate::device::DeviceDescriptor;
use crate::error::{GlowError, Result};

/// File name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config location: `<config_dir>/gsi-lights/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("gsi-lights").join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            GlowError::ConfigInvalid("Could not determine config directory".to_string())
        })
}

/// Load configuration from `path`. A missing file yields defaults.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No configuration file, using defaults");
            return Ok(AppConfig::default());
        }
        Err(e) => return Err(GlowError::Io(e)),
    };
    debug!(bytes = content.len(), "Read config file");
    load_config_from_str(&content)
}

/// Parse and validate configuration text.
pub fn load_config_from_str(content: &str) -> Result<AppConfig> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| GlowError::ConfigParse(format!("TOML: {e}")))?;
    config.validate()?;
    info!(
        listen = %config.server.listen,
        host = ?config.device.host,
        serial_port = ?config.device.serial_port,
        "Configuration loaded and validated"
    );
    Ok(config)
}

/// Save configuration to `path`, creating parent directories.
#[instrument(skip(config), fields(path = %path.as_ref().display()))]
pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let content = toml::to_string_pretty(config)
        .map_err(|e| GlowError::ConfigParse(format!("TOML: {e}")))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!("Configuration saved");
    Ok(())
}

/// Remember `descriptor` as the previous device and write the file.
///
/// Only network addresses are cached; serial ports are rediscovered by scan.
pub fn persist<P: AsRef<Path>>(
    config: &mut AppConfig,
    descriptor: &DeviceDescriptor,
    path: P,
) -> Result<()> {
    if descriptor.kind != crate::device::TransportKind::Network {
        debug!(address = %descriptor.address, "Not caching serial device address");
        return Ok(());
    }
    if config.device.previous_device.as_deref() == Some(descriptor.address.as_str()) {
        return Ok(());
    }
    config.device.previous_device = Some(descriptor.address.clone());
    save_config(config, path)
}
