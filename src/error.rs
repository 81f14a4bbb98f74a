//! Error types for GSI lighting operations.

use thiserror::Error;

/// Primary error type for device, transport and configuration failures.
#[derive(Error, Debug)]
pub enum GlowError {
    // Device errors
    #[error("No WLED device found")]
    NoDevicesFound,

    #[error("Device not reachable: {address}")]
    DeviceUnreachable { address: String },

    #[error("Failed to open device '{address}': {reason}")]
    DeviceOpenFailed { address: String, reason: String },

    #[error("Device info query failed for '{address}': {reason}")]
    DeviceInfo { address: String, reason: String },

    // Transport errors
    #[error("Serial write failed: {0}")]
    SerialWrite(String),

    #[error("UDP send to {target} failed: {reason}")]
    UdpSend { target: String, reason: String },

    #[error("Control request to {url} failed: {reason}")]
    ControlPlane { url: String, reason: String },

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid color '{value}': expected 6 hex digits (e.g., ff0000)")]
    InvalidColor { value: String },

    // Listener errors
    #[error("Listener failed to start on {addr}: {reason}")]
    ListenerFailed { addr: String, reason: String },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GlowError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoDevicesFound
                | Self::DeviceUnreachable { .. }
                | Self::ConfigInvalid(_)
                | Self::ConfigParse(_)
                | Self::InvalidColor { .. }
        )
    }

    /// Returns true for failures that only drop the current frame or effect.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SerialWrite(_) | Self::UdpSend { .. } | Self::ControlPlane { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoDevicesFound => {
                Some("Connect WLED over USB or set device.host in the config file")
            }
            Self::DeviceUnreachable { .. } => {
                Some("Check that the device is powered and on the same network")
            }
            Self::ConfigInvalid(_) | Self::ConfigParse(_) => {
                Some("Fix the config file or delete it to restore defaults")
            }
            Self::InvalidColor { .. } => Some("Use a value like ff0000 or #00ff00"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using GlowError.
pub type Result<T> = std::result::Result<T, GlowError>;
