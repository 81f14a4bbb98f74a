//! Device abstraction layer for WLED controllers.
//!
//! This module provides a trait-based abstraction over serial, network and
//! mock devices, enabling animation tests without hardware.

pub mod control;
mod info;
pub mod mock;
mod real;
mod resolve;

pub use control::{Segment, WledClient, WledState};
pub use info::{DeviceDescriptor, LedInfo, TransportKind, WledDocument, WledInfo};
pub use real::{NetworkDevice, SerialDevice};
pub use resolve::{query_serial_info, resolve_device};

use std::sync::{Arc, Mutex};

use smart_leds::RGB8;
use tracing::warn;

use crate::error::Result;

/// Immutable LED colors. Writers swap in a new buffer; nobody mutates one in place.
pub type LedBuffer = Arc<[RGB8]>;

/// Builds a buffer of `len` LEDs all set to `color`.
pub fn solid(color: RGB8, len: usize) -> LedBuffer {
    vec![color; len].into()
}

/// Core device operations.
///
/// The animation engine is the only caller of [`set_buffer`](Self::set_buffer)
/// and the render loop the only caller of [`render_once`](Self::render_once).
pub trait LedDevice: Send + Sync {
    /// Resolved identity of this device.
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Replaces the whole LED buffer.
    fn set_buffer(&self, leds: LedBuffer);

    /// Current LED buffer.
    fn buffer(&self) -> LedBuffer;

    /// Encodes and transmits the current buffer once.
    ///
    /// An empty buffer sends nothing and succeeds.
    fn render_once(&self) -> Result<()>;

    /// Pushes a native state to the firmware's control plane.
    ///
    /// Devices without a control plane accept and ignore the call.
    fn apply_effect(&self, state: &WledState) -> Result<()>;

    /// Number of LEDs.
    fn led_count(&self) -> usize {
        self.descriptor().led_count
    }
}

/// Type alias for a shared trait object.
pub type SharedDevice = Arc<dyn LedDevice>;

/// Buffer slot shared between the animation and render contexts.
///
/// The lock is held only long enough to clone or replace the `Arc`, so a
/// reader always sees one complete buffer.
#[derive(Debug)]
pub struct FrameSlot {
    current: Mutex<LedBuffer>,
}

impl FrameSlot {
    pub fn new(leds: LedBuffer) -> Self {
        Self {
            current: Mutex::new(leds),
        }
    }

    pub fn store(&self, leds: LedBuffer) {
        match self.current.lock() {
            Ok(mut guard) => *guard = leds,
            Err(poisoned) => *poisoned.into_inner() = leds,
        }
    }

    pub fn load(&self) -> LedBuffer {
        match self.current.lock() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

/// Warns when the buffer does not match the declared LED count.
pub(crate) fn check_length(descriptor: &DeviceDescriptor, leds: &[RGB8]) {
    if !leds.is_empty() && leds.len() != descriptor.led_count {
        warn!(
            data = leds.len(),
            leds = descriptor.led_count,
            device = %descriptor.address,
            "Number of LEDs does not match the data being sent"
        );
    }
}
