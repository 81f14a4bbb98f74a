//! Serial and network WLED devices.
//!
//! Each device owns its transport and protocol binding outright; the two
//! share only the [`FrameSlot`] helper.

use smart_leds::RGB8;
use tracing::{debug, info, trace};

use super::control::{WledClient, WledState};
use super::info::DeviceDescriptor;
use super::{FrameSlot, LedBuffer, LedDevice, check_length, solid};
use crate::error::{GlowError, Result};
use crate::protocol::{self, Protocol, WARLS_DEFAULT_TIMEOUT};
use crate::transport::{SerialTransport, Transport, UdpTransport};

/// Color every LED starts with until the first animation writes a buffer.
const STARTUP_COLOR: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

/// USB-attached WLED speaking Adalight.
pub struct SerialDevice {
    descriptor: DeviceDescriptor,
    transport: Box<dyn Transport>,
    frame: FrameSlot,
}

impl SerialDevice {
    /// Opens the port named by `descriptor.address`.
    pub fn open(descriptor: DeviceDescriptor, baud_rate: u32) -> Result<Self> {
        let transport = SerialTransport::open(&descriptor.address, baud_rate)?;
        Ok(Self::with_transport(descriptor, Box::new(transport)))
    }

    /// Builds a device around an existing transport.
    pub fn with_transport(descriptor: DeviceDescriptor, transport: Box<dyn Transport>) -> Self {
        info!(
            name = %descriptor.name,
            port = %descriptor.address,
            leds = descriptor.led_count,
            "Serial device ready"
        );
        let frame = FrameSlot::new(solid(STARTUP_COLOR, descriptor.led_count));
        Self {
            descriptor,
            transport,
            frame,
        }
    }
}

impl LedDevice for SerialDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn set_buffer(&self, leds: LedBuffer) {
        self.frame.store(leds);
    }

    fn buffer(&self) -> LedBuffer {
        self.frame.load()
    }

    fn render_once(&self) -> Result<()> {
        let leds = self.frame.load();
        check_length(&self.descriptor, &leds);
        match protocol::encode_adalight(&leds) {
            Some(frame) => self.transport.send(&frame),
            None => {
                trace!("Empty buffer, nothing to send");
                Ok(())
            }
        }
    }

    fn apply_effect(&self, state: &WledState) -> Result<()> {
        debug!(?state, "Serial device has no control plane, ignoring effect");
        Ok(())
    }
}

/// Network WLED streaming WARLS (or E1.31) over UDP.
pub struct NetworkDevice {
    descriptor: DeviceDescriptor,
    protocol: Protocol,
    warls_timeout: u8,
    transport: Box<dyn Transport>,
    control: Option<WledClient>,
    frame: FrameSlot,
}

impl NetworkDevice {
    /// Targets `descriptor.address` on the port fixed by `protocol`.
    pub fn connect(descriptor: DeviceDescriptor, protocol: Protocol) -> Result<Self> {
        let port = protocol.udp_port().ok_or_else(|| {
            GlowError::ConfigInvalid(format!(
                "protocol '{}' cannot be sent over the network",
                protocol.name()
            ))
        })?;
        let transport = UdpTransport::resolve(&descriptor.address, port)?;
        let control = WledClient::new(&descriptor.address);
        Ok(Self::with_transport(descriptor, protocol, Box::new(transport), Some(control)))
    }

    /// Builds a device around an existing transport and optional control client.
    pub fn with_transport(
        descriptor: DeviceDescriptor,
        protocol: Protocol,
        transport: Box<dyn Transport>,
        control: Option<WledClient>,
    ) -> Self {
        info!(
            name = %descriptor.name,
            host = %descriptor.address,
            leds = descriptor.led_count,
            protocol = protocol.name(),
            target = %transport.target(),
            "Network device ready"
        );
        let frame = FrameSlot::new(solid(STARTUP_COLOR, descriptor.led_count));
        Self {
            descriptor,
            protocol,
            warls_timeout: WARLS_DEFAULT_TIMEOUT,
            transport,
            control,
            frame,
        }
    }

    /// Seconds the device waits without data before leaving realtime mode.
    pub fn with_warls_timeout(mut self, seconds: u8) -> Self {
        self.warls_timeout = seconds;
        self
    }

    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }
}

impl LedDevice for NetworkDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn set_buffer(&self, leds: LedBuffer) {
        self.frame.store(leds);
    }

    fn buffer(&self) -> LedBuffer {
        self.frame.load()
    }

    fn render_once(&self) -> Result<()> {
        let leds = self.frame.load();
        check_length(&self.descriptor, &leds);
        let frame = match self.protocol {
            Protocol::Warls => protocol::encode_warls(&leds, self.warls_timeout),
            other => protocol::encode(other, &leds),
        };
        match frame {
            Some(frame) => self.transport.send(&frame),
            None => {
                trace!("Empty buffer, nothing to send");
                Ok(())
            }
        }
    }

    fn apply_effect(&self, state: &WledState) -> Result<()> {
        match &self.control {
            Some(client) => client.set_state(state),
            None => {
                debug!(?state, "No control client configured, ignoring effect");
                Ok(())
            }
        }
    }
}
