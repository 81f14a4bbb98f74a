//! Snapshots through detector, dispatcher and the animation worker.

use std::sync::Arc;
use std::time::Duration;

use gsi_lights::animation::{Animation, AnimationQueue, Animator, run_worker};
use gsi_lights::device::WledState;
use gsi_lights::device::mock::MockDevice;
use gsi_lights::dispatch::GameStateHandler;
use gsi_lights::gamestate::{authenticate, flatten};

use crate::common::fixtures::{TEST_TOKEN, gsi_payload};
use crate::common::init_test_logging;

fn tick(flashed: u64) -> gsi_lights::gamestate::FlatSnapshot {
    flatten(&authenticate(gsi_payload(flashed), TEST_TOKEN).unwrap())
}

#[test]
fn test_flash_zero_to_hundred_dispatches_flashbang() {
    init_test_logging();
    let (queue, mut rx) = AnimationQueue::channel();
    let mut handler = GameStateHandler::new(queue, Duration::from_secs(3));

    handler.on_snapshot(tick(0));
    handler.on_snapshot(tick(100));

    assert_eq!(
        rx.try_recv().unwrap(),
        Animation::Flashbang {
            intensity: 100,
            duration: Duration::from_secs(3),
        }
    );
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_repeated_snapshots_dispatch_nothing() {
    let (queue, mut rx) = AnimationQueue::channel();
    let mut handler = GameStateHandler::new(queue, Duration::from_secs(3));

    for _ in 0..5 {
        assert_eq!(handler.on_snapshot(tick(0)), 0);
    }
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_flash_cycle_follows_previous_snapshot() {
    let (queue, mut rx) = AnimationQueue::channel();
    let mut handler = GameStateHandler::new(queue, Duration::from_secs(3));
    let flashbang = |intensity| Animation::Flashbang {
        intensity,
        duration: Duration::from_secs(3),
    };

    handler.on_snapshot(tick(200));
    assert_eq!(handler.on_snapshot(tick(150)), 0, "decay is not a new flash");
    assert_eq!(handler.on_snapshot(tick(0)), 0);
    assert_eq!(handler.on_snapshot(tick(100)), 1);

    let mut menu = gsi_payload(0);
    menu["player"] = serde_json::json!({"activity": "menu"});
    assert_eq!(handler.on_snapshot(flatten(&authenticate(menu, TEST_TOKEN).unwrap())), 0);
    assert_eq!(handler.on_snapshot(tick(50)), 1);

    assert_eq!(rx.try_recv().unwrap(), flashbang(100));
    assert_eq!(rx.try_recv().unwrap(), flashbang(50));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_snapshot_reaches_device() {
    init_test_logging();
    let mock = Arc::new(MockDevice::new(3));
    let animator = Arc::new(Animator::new(mock.clone(), Duration::from_millis(5)));
    let (queue, rx) = AnimationQueue::channel();
    let worker = tokio::spawn(run_worker(animator, rx));

    let mut handler = GameStateHandler::new(queue, Duration::from_millis(30));
    handler.on_snapshot(tick(0));
    assert_eq!(handler.on_snapshot(tick(3)), 1);
    drop(handler);
    worker.await.unwrap();

    let levels: Vec<u8> = mock.buffers().iter().map(|b| b[0].r).collect();
    assert_eq!(levels, vec![3, 2, 1]);
    assert_eq!(mock.effects(), vec![WledState::release_live()]);
}
