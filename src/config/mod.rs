//! Configuration module.
//!
//! Handles the TOML file holding listener, device and effect settings, and
//! caching of the last resolved device address.

mod loader;
mod schema;

pub use loader::{
    CONFIG_FILE_NAME, default_config_path, load_config, load_config_from_str, persist, save_config,
};
pub use schema::{AppConfig, DeviceConfig, EffectsConfig, IdleConfig, ServerConfig};
