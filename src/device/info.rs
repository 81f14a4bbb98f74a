//! Device identity types.

use serde::{Deserialize, Serialize};

/// How frames reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Serial,
    Network,
}

/// Resolved identity of the target device, fixed for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Transport used for frames.
    pub kind: TransportKind,
    /// Serial port path or network host.
    pub address: String,
    /// Number of LEDs the firmware reports.
    pub led_count: usize,
    /// MAC address reported by the firmware.
    pub mac: String,
    /// Friendly name configured on the device.
    pub name: String,
    /// Whether the device answered the last query.
    pub reachable: bool,
}

impl DeviceDescriptor {
    /// Builds a descriptor from a WLED info document.
    pub fn from_info(kind: TransportKind, address: &str, info: &WledInfo) -> Self {
        Self {
            kind,
            address: address.to_string(),
            led_count: info.leds.count,
            mac: info.mac.clone(),
            name: info.name.clone(),
            reachable: true,
        }
    }
}

/// The `info` object of WLED's JSON API.
///
/// Only the fields used here are modelled; the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WledInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ver: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub leds: LedInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedInfo {
    #[serde(default)]
    pub count: usize,
}

/// Full `/json` document; the serial info query answers with this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct WledDocument {
    pub info: WledInfo,
}
