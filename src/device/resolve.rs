//! Turns device configuration into an opened device.
//!
//! Resolution order: configured serial port, configured host, cached
//! previous device, then a scan of serial ports for WLED firmware.
//! Multicast-DNS discovery is not attempted.

use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, trace, warn};

use super::SharedDevice;
use super::control::WledClient;
use super::info::{DeviceDescriptor, TransportKind, WledDocument, WledInfo};
use super::real::{NetworkDevice, SerialDevice};
use crate::config::DeviceConfig;
use crate::error::{GlowError, Result};

/// Query WLED answers over serial with its JSON document.
const SERIAL_INFO_QUERY: &[u8] = b"{\"v\":true}\n";

/// How long to wait for a serial info reply.
const SERIAL_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Resolves and opens the device described by `config`.
///
/// Fails with [`GlowError::NoDevicesFound`] when nothing answers.
#[instrument(skip(config))]
pub fn resolve_device(config: &DeviceConfig) -> Result<SharedDevice> {
    if let Some(port) = &config.serial_port {
        let info = query_serial_info(port, config.baud_rate)?;
        return open_serial(port, &info, config);
    }

    for host in config.host.iter().chain(config.previous_device.iter()) {
        match WledClient::new(host).info() {
            Ok(info) => return open_network(host, &info, config),
            Err(err) => warn!(host = %host, error = %err, "Configured host not reachable"),
        }
    }

    scan_serial_ports(config)
}

fn open_serial(port: &str, info: &WledInfo, config: &DeviceConfig) -> Result<SharedDevice> {
    let descriptor = DeviceDescriptor::from_info(TransportKind::Serial, port, info);
    Ok(Arc::new(SerialDevice::open(descriptor, config.baud_rate)?))
}

fn open_network(host: &str, info: &WledInfo, config: &DeviceConfig) -> Result<SharedDevice> {
    let descriptor = DeviceDescriptor::from_info(TransportKind::Network, host, info);
    let device = NetworkDevice::connect(descriptor, config.protocol)?
        .with_warls_timeout(config.warls_timeout);
    Ok(Arc::new(device))
}

fn scan_serial_ports(config: &DeviceConfig) -> Result<SharedDevice> {
    let ports = serialport::available_ports().map_err(|e| {
        debug!(error = %e, "Could not enumerate serial ports");
        GlowError::NoDevicesFound
    })?;

    for port in ports {
        trace!(port = %port.port_name, "Probing serial port");
        match query_serial_info(&port.port_name, config.baud_rate) {
            Ok(info) => {
                info!(port = %port.port_name, name = %info.name, "Found WLED on serial port");
                return open_serial(&port.port_name, &info, config);
            }
            Err(err) => debug!(port = %port.port_name, error = %err, "Not a WLED device"),
        }
    }

    Err(GlowError::NoDevicesFound)
}

/// Asks a serial-attached WLED for its info document.
pub fn query_serial_info(port: &str, baud_rate: u32) -> Result<WledInfo> {
    let err = |reason: String| GlowError::DeviceInfo {
        address: port.to_string(),
        reason,
    };

    let mut serial = serialport::new(port, baud_rate)
        .timeout(SERIAL_PROBE_TIMEOUT)
        .open()
        .map_err(|e| err(e.to_string()))?;
    serial
        .write_all(SERIAL_INFO_QUERY)
        .map_err(|e| err(e.to_string()))?;

    let mut line = String::new();
    BufReader::new(serial)
        .read_line(&mut line)
        .map_err(|e| err(e.to_string()))?;
    parse_serial_reply(&line).map_err(err)
}

fn parse_serial_reply(line: &str) -> std::result::Result<WledInfo, String> {
    if !line.contains("WLED") {
        return Err("reply does not look like WLED".to_string());
    }
    serde_json::from_str::<WledDocument>(line.trim())
        .map(|doc| doc.info)
        .map_err(|e| format!("invalid info JSON: {e}"))
}
