//! Mock device implementation for unit testing.
//!
//! This module provides a mock WLED device that records all operations and
//! supports assertions for testing.
//!
//! # Example
//!
//! ```rust,ignore
//! use gsi_lights::device::mock::{MockDevice, Operation};
//! use gsi_lights::device::{LedDevice, WledState};
//!
//! let mock = MockDevice::new(3);
//! mock.apply_effect(&WledState::release_live()).unwrap();
//! mock.assert_contains(&Operation::ApplyEffect(WledState::release_live()));
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use smart_leds::RGB8;
use tracing::{debug, trace};

use super::control::WledState;
use super::info::{DeviceDescriptor, TransportKind};
use super::{FrameSlot, LedBuffer, LedDevice, solid};
use crate::error::{GlowError, Result};

/// Recorded operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// A buffer was stored.
    SetBuffer(Vec<RGB8>),
    /// A frame was transmitted with this buffer.
    Render(Vec<RGB8>),
    /// A control-plane state was pushed.
    ApplyEffect(WledState),
}

/// Mock device for testing without real hardware.
pub struct MockDevice {
    descriptor: DeviceDescriptor,
    frame: FrameSlot,
    operation_log: Mutex<Vec<Operation>>,
    error_injection: Mutex<Option<GlowError>>,
    connected: AtomicBool,
    renders: AtomicUsize,
}

impl MockDevice {
    /// Create a mock network device with `led_count` LEDs.
    pub fn new(led_count: usize) -> Self {
        debug!(led_count, "Creating mock device");
        Self {
            descriptor: DeviceDescriptor {
                kind: TransportKind::Network,
                address: "mock.local".to_string(),
                led_count,
                mac: "000000000000".to_string(),
                name: "MOCK-WLED".to_string(),
                reachable: true,
            },
            frame: FrameSlot::new(solid(RGB8::default(), led_count)),
            operation_log: Mutex::new(Vec::new()),
            error_injection: Mutex::new(None),
            connected: AtomicBool::new(true),
            renders: AtomicUsize::new(0),
        }
    }

    // === Configuration ===

    /// Inject an error for the next render or effect.
    pub fn inject_error(&self, error: GlowError) {
        *self.error_injection.lock().unwrap() = Some(error);
    }

    /// Set device as disconnected; every render fails until reconnected.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Set device as connected.
    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    // === Assertions ===

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.operation_log.lock().unwrap().clone()
    }

    /// Buffers stored through `set_buffer`, in order.
    pub fn buffers(&self) -> Vec<Vec<RGB8>> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::SetBuffer(leds) => Some(leds),
                _ => None,
            })
            .collect()
    }

    /// Control-plane states pushed, in order.
    pub fn effects(&self) -> Vec<WledState> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::ApplyEffect(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Number of render attempts, including failed ones.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Assert a specific operation was performed at least once.
    ///
    /// # Panics
    ///
    /// Panics if the operation was not found.
    pub fn assert_contains(&self, expected: &Operation) {
        let ops = self.operations();
        assert!(
            ops.contains(expected),
            "Expected operation {expected:?} not found in: {ops:#?}",
        );
    }

    /// Assert no operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if any operations were recorded.
    pub fn assert_no_operations(&self) {
        let ops = self.operations();
        assert!(ops.is_empty(), "Expected no operations, but found: {ops:#?}");
    }

    /// Clear the operation log for fresh assertions.
    pub fn clear_operations(&self) {
        self.operation_log.lock().unwrap().clear();
        self.renders.store(0, Ordering::SeqCst);
    }

    // === Internal Helpers ===

    fn record_op(&self, op: Operation) {
        trace!(?op, "Recording operation");
        self.operation_log.lock().unwrap().push(op);
    }

    fn check_error(&self) -> Result<()> {
        if let Some(error) = self.error_injection.lock().unwrap().take() {
            return Err(error);
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(GlowError::SerialWrite("Mock device disconnected".to_string()));
        }
        Ok(())
    }
}

impl LedDevice for MockDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn set_buffer(&self, leds: LedBuffer) {
        self.record_op(Operation::SetBuffer(leds.to_vec()));
        self.frame.store(leds);
    }

    fn buffer(&self) -> LedBuffer {
        self.frame.load()
    }

    fn render_once(&self) -> Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;
        let leds = self.frame.load();
        if leds.is_empty() {
            return Ok(());
        }
        self.record_op(Operation::Render(leds.to_vec()));
        Ok(())
    }

    fn apply_effect(&self, state: &WledState) -> Result<()> {
        self.check_error()?;
        self.record_op(Operation::ApplyEffect(state.clone()));
        Ok(())
    }
}
