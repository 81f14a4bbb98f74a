//! Frames as they leave a network device, captured on a local socket.

use gsi_lights::device::{
    DeviceDescriptor, LedDevice, NetworkDevice, TransportKind, solid,
};
use gsi_lights::protocol::{self, E131_HEADER_LEN, E131_TAG, Protocol};
use gsi_lights::transport::UdpTransport;
use smart_leds::RGB8;

use crate::common::receiver::FrameReceiver;

fn descriptor(leds: usize) -> DeviceDescriptor {
    DeviceDescriptor {
        kind: TransportKind::Network,
        address: "127.0.0.1".to_string(),
        led_count: leds,
        mac: "aabbccddeeff".to_string(),
        name: "bench".to_string(),
        reachable: true,
    }
}

fn device(receiver: &FrameReceiver, protocol: Protocol, leds: usize) -> NetworkDevice {
    let transport = UdpTransport::new(receiver.addr());
    NetworkDevice::with_transport(descriptor(leds), protocol, Box::new(transport), None)
}

#[test]
fn test_warls_single_red_led() {
    let receiver = FrameReceiver::bind();
    let device = device(&receiver, Protocol::Warls, 1);

    device.set_buffer(solid(RGB8::new(255, 0, 0), 1));
    device.render_once().unwrap();

    assert_eq!(receiver.recv(), vec![0x02, 0x01, 0xFF, 0x00, 0x00]);
}

#[test]
fn test_warls_timeout_is_configurable() {
    let receiver = FrameReceiver::bind();
    let device = device(&receiver, Protocol::Warls, 1).with_warls_timeout(5);

    device.set_buffer(solid(RGB8::new(1, 2, 3), 1));
    device.render_once().unwrap();

    assert_eq!(receiver.recv(), vec![0x02, 0x05, 1, 2, 3]);
}

#[test]
fn test_e131_frame_layout() {
    let receiver = FrameReceiver::bind();
    let device = device(&receiver, Protocol::E131, 2);

    device.set_buffer(solid(RGB8::new(10, 20, 30), 2));
    device.render_once().unwrap();

    let frame = receiver.recv();
    assert_eq!(frame.len(), E131_HEADER_LEN + 6);
    assert_eq!(&frame[..8], &E131_TAG);
    assert_eq!(&frame[8..12], &[0, 0, 0, 1]);
    assert_eq!(&frame[14..16], &[0, 6]);
    assert_eq!(&frame[16..], &[10, 20, 30, 10, 20, 30]);
}

#[test]
fn test_length_mismatch_still_sends() {
    let receiver = FrameReceiver::bind();
    let device = device(&receiver, Protocol::Warls, 4);

    device.set_buffer(solid(RGB8::new(9, 9, 9), 2));
    device.render_once().unwrap();

    assert_eq!(receiver.recv(), vec![0x02, 0x01, 9, 9, 9, 9, 9, 9]);
}

#[test]
fn test_adalight_three_black_leds() {
    let frame = protocol::encode_adalight(&[RGB8::default(); 3]).unwrap();
    assert_eq!(
        frame,
        vec![0x41, 0x64, 0x61, 0x00, 0x03, 0x56, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_empty_buffers_encode_to_nothing() {
    for protocol in [Protocol::Adalight, Protocol::E131, Protocol::Warls] {
        assert!(protocol::encode(protocol, &[]).is_none());
    }
}
