//! Flattening and change detection on realistic payloads.

use gsi_lights::gamestate::{ChangeDetector, authenticate, diff, flatten};
use serde_json::json;

use crate::common::fixtures::{TEST_TOKEN, gsi_payload};

#[test]
fn test_payload_flattens_to_dotted_paths() {
    let snapshot = authenticate(gsi_payload(0), TEST_TOKEN).unwrap();
    let flat = flatten(&snapshot);

    assert_eq!(flat.get("player.state.flashed"), Some(&json!(0)));
    assert_eq!(flat.get("provider.appid"), Some(&json!(730)));
    assert_eq!(flat.get("map.name"), Some(&json!("de_mirage")));
    assert!(flat.keys().all(|key| !key.starts_with("auth")));
}

#[test]
fn test_only_flash_changes_between_ticks() {
    let mut detector = ChangeDetector::new();
    let tick = |flashed| flatten(&authenticate(gsi_payload(flashed), TEST_TOKEN).unwrap());

    assert!(detector.observe(tick(0)).0.is_empty());
    let (delta, replaced) = detector.observe(tick(255));
    assert_eq!(delta.len(), 1);
    assert_eq!(delta.get("player.state.flashed"), Some(&json!(255)));
    assert_eq!(replaced.unwrap().get("player.state.flashed"), Some(&json!(0)));
    assert!(detector.observe(tick(255)).0.is_empty());
}

#[test]
fn test_identical_snapshots_give_empty_delta() {
    let flat = flatten(&gsi_payload(30));
    assert!(diff(Some(&flat), &flat).is_empty());
}

#[test]
fn test_removed_keys_are_not_reported() {
    let previous = flatten(&json!({"round": {"phase": "live", "bomb": "planted"}}));
    let current = flatten(&json!({"round": {"phase": "over"}}));
    let delta = diff(Some(&previous), &current);
    assert_eq!(delta.len(), 1);
    assert_eq!(delta.get("round.phase"), Some(&json!("over")));
}
