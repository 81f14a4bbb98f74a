//! Configuration files and device address caching.

use std::time::Duration;

use gsi_lights::config::{AppConfig, load_config, persist};
use gsi_lights::device::{DeviceDescriptor, TransportKind};
use gsi_lights::error::GlowError;
use gsi_lights::protocol::Protocol;

use crate::common::fixtures::write_config;

const FULL_CONFIG: &str = r##"
[server]
listen = "0.0.0.0:3000"
auth_token = "hunter2"

[device]
host = "192.168.1.40"
protocol = "e131"
frame_rate = 60
warls_timeout = 2

[effects]
flash_duration_secs = 1.5
blink_color = "#00ff00"
blink_times = 5
blink_speed = 20.0

[effects.idle]
brightness = 80
effect = 9
"##;

#[test]
fn test_full_config_round_trip_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), FULL_CONFIG);

    let config = load_config(&path).unwrap();

    assert_eq!(config.server.listen, "0.0.0.0:3000");
    assert_eq!(config.server.auth_token, "hunter2");
    assert_eq!(config.device.host.as_deref(), Some("192.168.1.40"));
    assert_eq!(config.device.protocol, Protocol::E131);
    assert_eq!(config.device.warls_timeout, 2);
    assert_eq!(config.effects.flash_duration(), Duration::from_millis(1500));
    assert_eq!(config.effects.blink_color, "#00ff00");
    assert_eq!(config.effects.blink_times, 5);
    assert_eq!(config.effects.idle.brightness, 80);
    assert_eq!(config.effects.idle.effect, 9);
    assert_eq!(config.effects.idle.speed, 64, "unset idle keys keep defaults");
}

#[test]
fn test_invalid_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[device]\nframe_rate = 0\n");

    assert!(matches!(load_config(&path), Err(GlowError::ConfigInvalid(_))));
}

#[test]
fn test_unknown_protocol_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[device]\nprotocol = \"dmx\"\n");
    assert!(matches!(load_config(&path), Err(GlowError::ConfigParse(_))));
}

#[test]
fn test_persist_keeps_other_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), FULL_CONFIG);
    let mut config = load_config(&path).unwrap();

    let descriptor = DeviceDescriptor {
        kind: TransportKind::Network,
        address: "192.168.1.41".to_string(),
        led_count: 60,
        mac: "aabbccddeeff".to_string(),
        name: "desk".to_string(),
        reachable: true,
    };
    persist(&mut config, &descriptor, &path).unwrap();

    let reloaded = load_config(&path).unwrap();
    assert_eq!(reloaded.device.previous_device.as_deref(), Some("192.168.1.41"));
    assert_eq!(reloaded.server.auth_token, "hunter2");
    assert_ne!(reloaded, AppConfig::default());
}
