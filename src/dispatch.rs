//! Maps game state changes to animation requests.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, trace};

use crate::animation::{Animation, AnimationQueue};
use crate::gamestate::{ChangeDetector, Delta, FlatSnapshot};

/// Flash intensity of the local player, 0 to 255.
pub const FLASHED_KEY: &str = "player.state.flashed";

/// Game event recognised in a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Flashed(u8),
    RoundPhase(String),
    BombPlanted,
    Kills(u64),
    Ace,
    Mvp,
    RoundWin(String),
}

impl GameEvent {
    /// Classifies one delta entry. Unknown keys give `None`.
    pub fn classify(key: &str, value: &Value) -> Option<Self> {
        match key {
            FLASHED_KEY => flash_level(value).map(Self::Flashed),
            "round.phase" => value.as_str().map(|s| Self::RoundPhase(s.to_string())),
            "round.bomb" if value.as_str() == Some("planted") => Some(Self::BombPlanted),
            "player.state.round_kills" => match value.as_u64() {
                Some(5) => Some(Self::Ace),
                Some(kills) => Some(Self::Kills(kills)),
                None => None,
            },
            "player.match_stats.mvps" => Some(Self::Mvp),
            "round.win_team" => value.as_str().map(|s| Self::RoundWin(s.to_string())),
            _ => None,
        }
    }
}

/// Reads a flash level, saturating at 255. Fractions are truncated.
#[allow(clippy::cast_sign_loss)]
fn flash_level(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_u64() {
        return Some(n.min(255) as u8);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, 255.0) as u8)
}

/// Turns deltas into animation requests on a queue.
pub struct EventDispatcher {
    queue: AnimationQueue,
    flash_duration: Duration,
}

impl EventDispatcher {
    pub const fn new(queue: AnimationQueue, flash_duration: Duration) -> Self {
        Self {
            queue,
            flash_duration,
        }
    }

    /// Works out which animations `delta` calls for.
    ///
    /// `previous` is the snapshot the delta was taken against. A flashbang
    /// fires when the level rises above the previous snapshot's level, with
    /// an absent or unreadable level counting as 0.
    pub fn plan(&self, delta: &Delta, previous: Option<&FlatSnapshot>) -> Vec<Animation> {
        let mut planned = Vec::new();
        for (key, value) in delta {
            let Some(event) = GameEvent::classify(key, value) else {
                continue;
            };
            match event {
                GameEvent::Flashed(level) => {
                    let before = previous
                        .and_then(|snapshot| snapshot.get(FLASHED_KEY))
                        .and_then(flash_level);
                    if level > before.unwrap_or(0) {
                        planned.push(Animation::Flashbang {
                            intensity: level,
                            duration: self.flash_duration,
                        });
                    } else {
                        trace!(level, ?before, "Flash level did not rise");
                    }
                }
                reserved => trace!(event = ?reserved, "No effect mapped"),
            }
        }
        planned
    }

    /// Plans and enqueues. Returns how many requests were accepted.
    pub fn dispatch(&self, delta: &Delta, previous: Option<&FlatSnapshot>) -> usize {
        let planned = self.plan(delta, previous);
        let mut accepted = 0;
        for animation in planned {
            info!(animation = animation.name(), "Triggering animation");
            if self.queue.enqueue(animation) {
                accepted += 1;
            }
        }
        accepted
    }
}

/// Inbound side of the pipeline: detector followed by dispatcher.
pub struct GameStateHandler {
    detector: ChangeDetector,
    dispatcher: EventDispatcher,
}

impl GameStateHandler {
    pub fn new(queue: AnimationQueue, flash_duration: Duration) -> Self {
        Self {
            detector: ChangeDetector::new(),
            dispatcher: EventDispatcher::new(queue, flash_duration),
        }
    }

    /// Feeds one flattened snapshot through the pipeline.
    pub fn on_snapshot(&mut self, snapshot: FlatSnapshot) -> usize {
        let (delta, previous) = self.detector.observe(snapshot);
        if delta.is_empty() {
            return 0;
        }
        debug!(changed = delta.len(), "Dispatching game state delta");
        self.dispatcher.dispatch(&delta, previous.as_ref())
    }

    pub const fn detector(&self) -> &ChangeDetector {
        &self.detector
    }
}
