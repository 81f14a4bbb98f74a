//! Wire encoders for the three LED streaming protocols.
//!
//! All encoders are pure: they take an LED buffer and return a frame ready for
//! the transport, or `None` when there is nothing to send.

use serde::{Deserialize, Serialize};
use smart_leds::RGB8;
use tracing::warn;

/// Adalight frame magic.
pub const ADALIGHT_MAGIC: &[u8; 3] = b"Ada";

/// E1.31 header tag as sent by WLED tooling ("ASC-E1.1").
pub const E131_TAG: [u8; 8] = [0x41, 0x53, 0x43, 0x2d, 0x45, 0x31, 0x2e, 0x31];

/// E1.31 header length in bytes.
pub const E131_HEADER_LEN: usize = 16;

/// Universe every E1.31 frame is addressed to.
pub const E131_UNIVERSE: u32 = 1;

/// UDP port for E1.31 receivers.
pub const E131_PORT: u16 = 5568;

/// UDP realtime port used by WLED.
pub const WARLS_PORT: u16 = 21324;

/// Realtime mode byte. WLED names mode 2 "DRGB": plain RGB triples, LED
/// index implied by position.
pub const WARLS_MODE: u8 = 0x02;

/// Default "return to normal mode after N seconds without data".
pub const WARLS_DEFAULT_TIMEOUT: u8 = 1;

/// Supported LED wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Serial framing understood by WLED's Adalight receiver.
    Adalight,
    /// Streaming ACN over UDP.
    E131,
    /// WLED realtime UDP.
    Warls,
}

impl Protocol {
    /// UDP port for network protocols, `None` for serial-only framing.
    pub const fn udp_port(self) -> Option<u16> {
        match self {
            Self::Adalight => None,
            Self::E131 => Some(E131_PORT),
            Self::Warls => Some(WARLS_PORT),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Adalight => "adalight",
            Self::E131 => "e131",
            Self::Warls => "warls",
        }
    }
}

/// Encodes `leds` for `protocol` with default protocol options.
pub fn encode(protocol: Protocol, leds: &[RGB8]) -> Option<Vec<u8>> {
    match protocol {
        Protocol::Adalight => encode_adalight(leds),
        Protocol::E131 => encode_e131(leds),
        Protocol::Warls => encode_warls(leds, WARLS_DEFAULT_TIMEOUT),
    }
}

fn push_rgb(frame: &mut Vec<u8>, leds: &[RGB8]) {
    for led in leds {
        frame.extend_from_slice(&[led.r, led.g, led.b]);
    }
}

/// Builds an Adalight frame.
///
/// The count field is the number of LEDs actually in `leds`; buffers longer
/// than `u16::MAX` are truncated to fit the field, with a warning.
pub fn encode_adalight(leds: &[RGB8]) -> Option<Vec<u8>> {
    if leds.is_empty() {
        return None;
    }
    let max = usize::from(u16::MAX);
    if leds.len() > max {
        warn!(leds = leds.len(), sent = max, "Adalight frame truncated to fit the count field");
    }
    let leds = &leds[..leds.len().min(max)];
    let [hi, lo] = (leds.len() as u16).to_be_bytes();

    let mut frame = Vec::with_capacity(6 + leds.len() * 3);
    frame.extend_from_slice(ADALIGHT_MAGIC);
    frame.extend_from_slice(&[hi, lo, hi ^ lo ^ 0x55]);
    push_rgb(&mut frame, leds);
    Some(frame)
}

/// Builds an E1.31 frame with the fixed 16-byte header.
///
/// The sequence byte is always zero.
pub fn encode_e131(leds: &[RGB8]) -> Option<Vec<u8>> {
    if leds.is_empty() {
        return None;
    }
    let payload_len = (leds.len() * 3).min(usize::from(u16::MAX)) as u16;

    let mut frame = Vec::with_capacity(E131_HEADER_LEN + usize::from(payload_len));
    frame.extend_from_slice(&E131_TAG);
    frame.extend_from_slice(&E131_UNIVERSE.to_be_bytes());
    frame.push(0x00); // sequence
    frame.push(0x00); // options
    frame.extend_from_slice(&payload_len.to_be_bytes());
    push_rgb(&mut frame, leds);
    Some(frame)
}

/// Builds a WARLS frame. The receiver infers the LED count from the length.
pub fn encode_warls(leds: &[RGB8], timeout_secs: u8) -> Option<Vec<u8>> {
    if leds.is_empty() {
        return None;
    }
    let mut frame = Vec::with_capacity(2 + leds.len() * 3);
    frame.extend_from_slice(&[WARLS_MODE, timeout_secs]);
    push_rgb(&mut frame, leds);
    Some(frame)
}
