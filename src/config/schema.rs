//! Configuration file schema.
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:3000"
//! auth_token = "MYTOKENHERE"
//!
//! [device]
//! host = "wled-desk.local"
//! protocol = "warls"
//! frame_rate = 30
//!
//! [effects]
//! flash_duration_secs = 3.0
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GlowError, Result};
use crate::protocol::{Protocol, WARLS_DEFAULT_TIMEOUT};
use crate::transport::DEFAULT_BAUD_RATE;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub effects: EffectsConfig,
}

/// GSI listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen: String,
    /// Token the game sends in `auth.token`.
    pub auth_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            auth_token: "MYTOKENHERE".to_string(),
        }
    }
}

/// Target device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Serial port of a USB-attached WLED. Takes precedence over `host`.
    pub serial_port: Option<String>,
    /// Host (name or IP, optional `:port` for the HTTP API) of a network WLED.
    pub host: Option<String>,
    /// Last device used, written back after a successful resolve.
    pub previous_device: Option<String>,
    pub baud_rate: u32,
    /// Protocol for network devices: `warls` or `e131`.
    pub protocol: Protocol,
    /// Render loop frames per second.
    pub frame_rate: u32,
    /// Seconds a WARLS receiver waits before leaving realtime mode.
    pub warls_timeout: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial_port: None,
            host: None,
            previous_device: None,
            baud_rate: DEFAULT_BAUD_RATE,
            protocol: Protocol::Warls,
            frame_rate: 30,
            warls_timeout: WARLS_DEFAULT_TIMEOUT,
        }
    }
}

impl DeviceConfig {
    /// Render loop period derived from `frame_rate`.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

/// Animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Total flashbang fade time.
    pub flash_duration_secs: f64,
    /// Default blink color as hex.
    pub blink_color: String,
    pub blink_times: u32,
    /// Higher is faster; each half-cycle lasts `10 / speed` seconds.
    pub blink_speed: f64,
    pub idle: IdleConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            flash_duration_secs: 3.0,
            blink_color: "ff0000".to_string(),
            blink_times: 3,
            blink_speed: 40.0,
            idle: IdleConfig::default(),
        }
    }
}

impl EffectsConfig {
    pub fn flash_duration(&self) -> Duration {
        Duration::from_secs_f64(self.flash_duration_secs.max(0.0))
    }
}

/// Native preset used when nothing is happening in game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub brightness: u8,
    /// WLED effect id (8 = colorloop).
    pub effect: u8,
    pub palette: u8,
    pub speed: u8,
    pub intensity: u8,
    /// Static color for serial devices, as hex.
    pub color: String,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            brightness: 40,
            effect: 8,
            palette: 0,
            speed: 64,
            intensity: 128,
            color: "100a00".to_string(),
        }
    }
}

impl AppConfig {
    /// Validate the configuration.
    ///
    /// Checks that the token is set, the frame rate and blink speed are
    /// positive, and colors parse.
    pub fn validate(&self) -> Result<()> {
        trace!("Validating configuration");

        if self.server.auth_token.trim().is_empty() {
            return Err(GlowError::ConfigInvalid(
                "server.auth_token must not be empty".to_string(),
            ));
        }
        if self.device.frame_rate == 0 {
            return Err(GlowError::ConfigInvalid(
                "device.frame_rate must be at least 1".to_string(),
            ));
        }
        if self.device.protocol == Protocol::Adalight {
            return Err(GlowError::ConfigInvalid(
                "device.protocol must be 'warls' or 'e131'".to_string(),
            ));
        }
        if self.effects.blink_speed.is_nan() || self.effects.blink_speed <= 0.0 {
            return Err(GlowError::ConfigInvalid(
                "effects.blink_speed must be positive".to_string(),
            ));
        }
        crate::animation::parse_color(&self.effects.blink_color)?;
        crate::animation::parse_color(&self.effects.idle.color)?;

        debug!(
            frame_rate = self.device.frame_rate,
            protocol = self.device.protocol.name(),
            "Configuration validated"
        );
        Ok(())
    }
}
