//! Animation sequencing against the mock device.

use std::sync::Arc;
use std::time::Duration;

use gsi_lights::animation::{AnimationState, Animator};
use gsi_lights::device::mock::{MockDevice, Operation};
use gsi_lights::device::{LedDevice, WledState};
use gsi_lights::error::GlowError;
use smart_leds::RGB8;

fn setup(leds: usize) -> (Arc<MockDevice>, Arc<Animator>) {
    let mock = Arc::new(MockDevice::new(leds));
    let animator = Arc::new(Animator::new(mock.clone(), Duration::from_millis(5)));
    (mock, animator)
}

fn gray_levels(mock: &MockDevice) -> Vec<u8> {
    mock.buffers().iter().map(|b| b[0].r).collect()
}

#[tokio::test]
async fn test_flashbang_three_states() {
    let (mock, animator) = setup(4);
    animator.flashbang(3, Duration::from_millis(300)).await;

    assert_eq!(gray_levels(&mock), vec![3, 2, 1]);
    for buffer in mock.buffers() {
        assert_eq!(buffer.len(), 4);
        assert!(buffer.iter().all(|led| led.r == led.g && led.g == led.b));
    }
    assert_eq!(mock.buffer()[0], RGB8::new(1, 1, 1));
}

#[tokio::test]
async fn test_concurrent_animations_do_not_overlap() {
    let (mock, animator) = setup(2);

    let first = animator.flashbang(3, Duration::from_millis(90));
    let second = animator.flashbang(2, Duration::from_millis(60));
    tokio::join!(first, second);

    let levels = gray_levels(&mock);
    assert!(
        levels == vec![3, 2, 1, 2, 1] || levels == vec![2, 1, 3, 2, 1],
        "interleaved steps: {levels:?}"
    );
    assert_eq!(mock.effects().len(), 2);
    assert_eq!(animator.state(), AnimationState::Idle);
}

#[tokio::test]
async fn test_release_follows_last_frame() {
    let (mock, animator) = setup(1);
    animator.flashbang(2, Duration::from_millis(40)).await;

    let operations = mock.operations();
    let release = operations
        .iter()
        .position(|op| *op == Operation::ApplyEffect(WledState::release_live()))
        .expect("live override released");
    assert_eq!(release, operations.len() - 1);
    assert!(
        !operations[release..]
            .iter()
            .any(|op| matches!(op, Operation::Render(_)))
    );
}

#[tokio::test]
async fn test_transport_errors_do_not_abort_animation() {
    let (mock, animator) = setup(1);
    mock.inject_error(GlowError::UdpSend {
        target: "127.0.0.1:21324".to_string(),
        reason: "refused".to_string(),
    });

    animator.flashbang(2, Duration::from_millis(60)).await;

    assert_eq!(gray_levels(&mock), vec![2, 1]);
    assert_eq!(animator.state(), AnimationState::Idle);
}

#[tokio::test]
async fn test_zero_blinks_leave_device_untouched() {
    let (mock, animator) = setup(1);
    animator.blink(RGB8::new(255, 0, 0), 0, 40.0).await;
    mock.assert_no_operations();
}
