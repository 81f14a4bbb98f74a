//! Game state change detection.
//!
//! Nested GSI payloads are flattened to dot-joined paths and compared with
//! the previous payload to produce a delta of changed values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Path (`player.state.flashed`) to scalar value.
pub type FlatSnapshot = BTreeMap<String, Value>;

/// Paths whose value changed or appeared, with their new value.
pub type Delta = BTreeMap<String, Value>;

/// Flattens a nested snapshot.
///
/// Objects are descended with keys joined by `.`; everything else (numbers,
/// strings, bools, null, arrays) is a leaf. Empty objects produce no keys and
/// a non-object root produces nothing.
pub fn flatten(snapshot: &Value) -> FlatSnapshot {
    let mut flat = FlatSnapshot::new();
    if let Value::Object(map) = snapshot {
        flatten_into(&mut flat, None, map);
    }
    flat
}

fn flatten_into(flat: &mut FlatSnapshot, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(flat, Some(&path), inner),
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
}

/// Keys of `current` whose value is new or differs from `previous`.
///
/// Keys only in `previous` are not reported. With no previous snapshot the
/// delta is empty: the first snapshot only establishes the baseline.
pub fn diff(previous: Option<&FlatSnapshot>, current: &FlatSnapshot) -> Delta {
    let Some(previous) = previous else {
        return Delta::new();
    };
    current
        .iter()
        .filter(|(key, value)| previous.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Owns the previous snapshot and turns each new one into a delta.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    previous: Option<FlatSnapshot>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `current` against the previous snapshot, then keeps `current`.
    ///
    /// Returns the delta along with the snapshot it replaced, so callers can
    /// compare new values against what the game reported last time.
    pub fn observe(&mut self, current: FlatSnapshot) -> (Delta, Option<FlatSnapshot>) {
        let delta = diff(self.previous.as_ref(), &current);
        if self.previous.is_none() {
            debug!(keys = current.len(), "Baseline game state recorded");
        } else if !delta.is_empty() {
            trace!(?delta, "Game state changed");
        }
        let replaced = self.previous.replace(current);
        (delta, replaced)
    }

    pub const fn previous(&self) -> Option<&FlatSnapshot> {
        self.previous.as_ref()
    }

    /// Forgets the baseline; the next snapshot is treated as the first.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Checks `auth.token` and strips the `auth` block.
///
/// Returns `None` for anything that is not an object carrying the expected
/// token.
pub fn authenticate(payload: Value, token: &str) -> Option<Value> {
    let Value::Object(mut map) = payload else {
        return None;
    };
    let matches = map
        .get("auth")
        .and_then(|auth| auth.get("token"))
        .and_then(Value::as_str)
        == Some(token);
    if !matches {
        return None;
    }
    map.remove("auth");
    Some(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: Value) -> FlatSnapshot {
        flatten(&value)
    }

    #[test]
    fn test_flatten_nested() {
        let snapshot = json!({
            "provider": {"name": "Counter-Strike: Global Offensive", "appid": 730},
            "player": {"state": {"health": 100, "flashed": 0}, "activity": "playing"},
            "empty": {},
            "list": [1, 2]
        });
        let flat = flatten(&snapshot);
        assert_eq!(flat.get("provider.appid"), Some(&json!(730)));
        assert_eq!(flat.get("player.state.flashed"), Some(&json!(0)));
        assert_eq!(flat.get("player.activity"), Some(&json!("playing")));
        assert_eq!(flat.get("list"), Some(&json!([1, 2])));
        assert!(!flat.keys().any(|k| k.starts_with("empty")));
        assert_eq!(flat.len(), 6);
    }

    #[test]
    fn test_flatten_idempotent_on_flat_input() {
        let once = flat(json!({"a": {"b": 1, "c": {"d": "x"}}, "e": true}));
        let as_value = Value::Object(once.clone().into_iter().collect());
        assert_eq!(flatten(&as_value), once);
    }

    #[test]
    fn test_flatten_non_object_root() {
        assert!(flatten(&json!(42)).is_empty());
        assert!(flatten(&json!([{"a": 1}])).is_empty());
    }

    #[test]
    fn test_diff_reports_changed_and_new_keys() {
        let previous = flat(json!({"a": 1, "b": 2, "gone": 3}));
        let current = flat(json!({"a": 1, "b": 5, "new": 0}));
        let delta = diff(Some(&previous), &current);
        assert_eq!(delta.len(), 2);
        assert_eq!(delta.get("b"), Some(&json!(5)));
        assert_eq!(delta.get("new"), Some(&json!(0)));
        assert!(!delta.contains_key("gone"));
    }

    #[test]
    fn test_diff_strict_inequality_across_types() {
        let previous = flat(json!({"a": 1, "b": null}));
        let current = flat(json!({"a": "1", "b": null}));
        let delta = diff(Some(&previous), &current);
        assert_eq!(delta.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_diff_matches_definition_exhaustively() {
        let samples = [
            json!({}),
            json!({"x": 1}),
            json!({"x": 2, "y": {"z": "a"}}),
            json!({"y": {"z": "b"}, "w": false}),
        ];
        for p in &samples {
            for c in &samples {
                let (p, c) = (flatten(p), flatten(c));
                let delta = diff(Some(&p), &c);
                let expected: Delta = c
                    .iter()
                    .filter(|(k, v)| p.get(*k) != Some(v))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                assert_eq!(delta, expected);
            }
        }
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut detector = ChangeDetector::new();
        let (delta, replaced) = detector.observe(flat(json!({"a": 1})));
        assert!(delta.is_empty());
        assert!(replaced.is_none());
        assert!(detector.previous().is_some());

        let (delta, replaced) = detector.observe(flat(json!({"a": 2})));
        assert_eq!(delta.len(), 1);
        assert_eq!(replaced, Some(flat(json!({"a": 1}))));
    }

    #[test]
    fn test_observe_hands_back_replaced_snapshot() {
        let mut detector = ChangeDetector::new();
        detector.observe(flat(json!({"p": {"flashed": 200}})));
        detector.observe(flat(json!({"p": {"activity": "menu"}})));

        let (delta, replaced) = detector.observe(flat(json!({"p": {"flashed": 50}})));
        let replaced = replaced.unwrap();
        assert!(!replaced.contains_key("p.flashed"), "dropped keys stay dropped");
        assert_eq!(delta.get("p.flashed"), Some(&json!(50)));
    }

    #[test]
    fn test_detectors_are_independent() {
        let mut first = ChangeDetector::new();
        let mut second = ChangeDetector::new();
        first.observe(flat(json!({"a": 1})));
        assert!(second.observe(flat(json!({"a": 2}))).0.is_empty());
        assert_eq!(first.observe(flat(json!({"a": 2}))).0.len(), 1);

        first.reset();
        assert!(first.observe(flat(json!({"a": 3}))).0.is_empty());
    }

    #[test]
    fn test_authenticate() {
        let payload = json!({"auth": {"token": "secret"}, "player": {"state": {"flashed": 0}}});
        let stripped = authenticate(payload, "secret").unwrap();
        assert!(stripped.get("auth").is_none());
        assert!(stripped.get("player").is_some());

        assert!(authenticate(json!({"auth": {"token": "nope"}}), "secret").is_none());
        assert!(authenticate(json!({"player": {}}), "secret").is_none());
        assert!(authenticate(json!("secret"), "secret").is_none());
    }
}
