//! WLED JSON control plane.
//!
//! Used at startup and when entering idle to push native presets; never on
//! the per-frame path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::info::WledInfo;
use crate::error::{GlowError, Result};

/// Timeout for control-plane requests.
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(2);

/// Body of a `POST /json/state` request. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WledState {
    /// Brightness 0-255.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    /// Transition in tenths of a second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub seg: Vec<Segment>,
    /// `false` releases a realtime override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<bool>,
}

/// Per-segment settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Effect id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx: Option<u8>,
    /// Effect speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<u8>,
    /// Effect intensity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ix: Option<u8>,
    /// Palette id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pal: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub col: Vec<[u8; 3]>,
    /// Mirror.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tt: Option<u16>,
}

impl WledState {
    /// Hands the strip back to its own effects after a realtime stream.
    pub fn release_live() -> Self {
        Self {
            live: Some(false),
            ..Self::default()
        }
    }

    /// Native effect preset on a single segment.
    pub fn preset(brightness: u8, effect: u8, palette: u8, speed: u8, intensity: u8) -> Self {
        Self {
            bri: Some(brightness),
            on: Some(true),
            seg: vec![Segment {
                fx: Some(effect),
                sx: Some(speed),
                ix: Some(intensity),
                pal: Some(palette),
                ..Segment::default()
            }],
            ..Self::default()
        }
    }
}

/// Blocking HTTP client for one WLED host.
#[derive(Clone)]
pub struct WledClient {
    host: String,
    agent: ureq::Agent,
}

impl WledClient {
    pub fn new(host: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(CONTROL_TIMEOUT).build();
        Self {
            host: host.to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.host)
    }

    /// Fetches `/json/info`.
    pub fn info(&self) -> Result<WledInfo> {
        let url = self.url("/json/info");
        debug!(url = %url, "Querying device info");
        let response = self.agent.get(&url).call().map_err(|e| GlowError::DeviceInfo {
            address: self.host.clone(),
            reason: e.to_string(),
        })?;
        response.into_json().map_err(|e| GlowError::DeviceInfo {
            address: self.host.clone(),
            reason: e.to_string(),
        })
    }

    /// Posts `state` to `/json/state`.
    pub fn set_state(&self, state: &WledState) -> Result<()> {
        let url = self.url("/json/state");
        debug!(url = %url, ?state, "Applying device state");
        self.agent
            .post(&url)
            .send_json(state)
            .map(|_| ())
            .map_err(|e| GlowError::ControlPlane {
                url,
                reason: e.to_string(),
            })
    }

    /// Info query that never fails; errors become a warning string.
    pub fn describe(&self) -> std::result::Result<WledInfo, String> {
        self.info().map_err(|err| {
            warn!(host = %self.host, error = %err, "Device info unavailable");
            err.to_string()
        })
    }
}
