//! Test payloads and config files.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

pub const TEST_TOKEN: &str = "MYTOKENHERE";

/// A trimmed-down CS:GO GSI payload with the local player's flash level.
pub fn gsi_payload(flashed: u64) -> Value {
    json!({
        "provider": {
            "name": "Counter-Strike: Global Offensive",
            "appid": 730,
            "version": 13_831,
            "steamid": "76561198000000000",
            "timestamp": 1_700_000_000
        },
        "map": {"name": "de_mirage", "phase": "live", "round": 4},
        "round": {"phase": "live"},
        "player": {
            "name": "tester",
            "activity": "playing",
            "state": {
                "health": 100,
                "armor": 100,
                "helmet": true,
                "flashed": flashed,
                "smoked": 0,
                "burning": 0,
                "money": 800,
                "round_kills": 0
            }
        },
        "auth": {"token": TEST_TOKEN}
    })
}

/// Writes `content` as `config.toml` under `dir`.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).expect("write config fixture");
    path
}
