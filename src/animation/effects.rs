//! Step sequences for the stepped animations.
//!
//! Building the sequence is pure; [`Animator`](super::Animator) plays it.

use std::time::Duration;

use smart_leds::RGB8;

use crate::device::{LedBuffer, solid};
use crate::error::{GlowError, Result};

/// One buffer and how long it stays up before the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub leds: LedBuffer,
    pub hold: Duration,
}

/// Animation requests accepted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Device-native idle preset, or a dim static color on serial devices.
    Idle,
    /// `times` on/off cycles of `color`; half-cycle is `10 / speed` seconds.
    Blink { color: RGB8, times: u32, speed: f64 },
    /// Gray fade from `intensity` down to 1 over `duration`.
    Flashbang { intensity: u8, duration: Duration },
}

impl Animation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Blink { .. } => "blink",
            Self::Flashbang { .. } => "flashbang",
        }
    }
}

/// Flashbang steps: every LED gray at `start, start - 1, ..., 1`.
///
/// `start` is `intensity` clamped to at least 1; each step holds for
/// `duration / start`. Zero is never part of the sequence.
pub fn flashbang_steps(intensity: u8, duration: Duration, led_count: usize) -> Vec<Step> {
    let start = intensity.max(1);
    let hold = duration / u32::from(start);
    (1..=start)
        .rev()
        .map(|level| Step {
            leds: solid(RGB8::new(level, level, level), led_count),
            hold,
        })
        .collect()
}

/// Blink steps: `color` then off, `times` times.
pub fn blink_steps(color: RGB8, times: u32, speed: f64, led_count: usize) -> Vec<Step> {
    let hold = blink_interval(speed);
    let on = solid(color, led_count);
    let off = solid(RGB8::default(), led_count);
    (0..times)
        .flat_map(|_| {
            [
                Step {
                    leds: on.clone(),
                    hold,
                },
                Step {
                    leds: off.clone(),
                    hold,
                },
            ]
        })
        .collect()
}

/// Half-cycle length for a blink at `speed` (`10 / speed` seconds).
///
/// Non-positive speeds give a zero interval.
pub fn blink_interval(speed: f64) -> Duration {
    if speed.is_finite() && speed > 0.0 {
        Duration::from_secs_f64(10.0 / speed)
    } else {
        Duration::ZERO
    }
}

/// Parses `ff0000` or `#ff0000`.
pub fn parse_color(s: &str) -> Result<RGB8> {
    let digits = s.trim().trim_start_matches('#');
    let invalid = || GlowError::InvalidColor {
        value: s.to_string(),
    };
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    match bytes.as_slice() {
        [r, g, b] => Ok(RGB8::new(*r, *g, *b)),
        _ => Err(invalid()),
    }
}
