//! Animation engine.
//!
//! Every stepped animation runs the same sequence under one lock:
//! set buffer, start render loop, step, stop and join render loop, release
//! the device's live override. Two animations never overlap.

mod effects;

pub use effects::{Animation, Step, blink_interval, blink_steps, flashbang_steps, parse_color};

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use smart_leds::RGB8;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::config::IdleConfig;
use crate::device::{SharedDevice, TransportKind, WledState, solid};
use crate::error::Result;
use crate::render::{RenderLoop, RenderState};

/// Lifecycle of the animation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    /// Steps are being written while the render loop transmits.
    Running,
    /// Last step written; waiting for the render loop to exit.
    Draining,
}

impl AnimationState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Draining => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Idle,
        }
    }
}

/// Plays animations on one device, one at a time.
pub struct Animator {
    device: SharedDevice,
    render: RenderLoop,
    stage: Mutex<()>,
    state: AtomicU8,
    idle: IdleConfig,
}

impl Animator {
    pub fn new(device: SharedDevice, frame_period: Duration) -> Self {
        let render = RenderLoop::new(Arc::clone(&device), frame_period);
        Self {
            device,
            render,
            stage: Mutex::new(()),
            state: AtomicU8::new(AnimationState::Idle.as_u8()),
            idle: IdleConfig::default(),
        }
    }

    /// Idle preset used by [`Animation::Idle`].
    pub fn with_idle(mut self, idle: IdleConfig) -> Self {
        self.idle = idle;
        self
    }

    pub fn state(&self) -> AnimationState {
        AnimationState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: AnimationState) {
        debug!(?state, "Animation state");
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Plays `animation` to completion. Waits for any running animation first.
    pub async fn play(&self, animation: &Animation) {
        match animation {
            Animation::Idle => self.idle().await,
            Animation::Blink {
                color,
                times,
                speed,
            } => self.blink(*color, *times, *speed).await,
            Animation::Flashbang {
                intensity,
                duration,
            } => self.flashbang(*intensity, *duration).await,
        }
    }

    /// Linear gray fade from `intensity` to 1 over `duration`.
    #[instrument(skip(self))]
    pub async fn flashbang(&self, intensity: u8, duration: Duration) {
        let steps = flashbang_steps(intensity, duration, self.device.led_count());
        self.run_steps("flashbang", steps).await;
    }

    /// Alternates `color` and off `times` times.
    #[instrument(skip(self))]
    pub async fn blink(&self, color: RGB8, times: u32, speed: f64) {
        let steps = blink_steps(color, times, speed, self.device.led_count());
        self.run_steps("blink", steps).await;
    }

    /// One-shot idle look; no render loop.
    ///
    /// Network devices switch to their native preset, serial devices get a
    /// single frame of the dim idle color.
    #[instrument(skip(self))]
    pub async fn idle(&self) {
        let _stage = self.stage.lock().await;
        let device = Arc::clone(&self.device);
        let kind = device.descriptor().kind;

        let result = match kind {
            TransportKind::Network => {
                let idle = &self.idle;
                let preset = WledState::preset(
                    idle.brightness,
                    idle.effect,
                    idle.palette,
                    idle.speed,
                    idle.intensity,
                );
                blocking(move || device.apply_effect(&preset)).await
            }
            TransportKind::Serial => {
                let color = parse_color(&self.idle.color).unwrap_or_default();
                device.set_buffer(solid(color, device.led_count()));
                blocking(move || device.render_once()).await
            }
        };

        match result {
            Ok(()) => info!("Idle look applied"),
            Err(err) => warn!(error = %err, "Could not apply idle look"),
        }
    }

    /// Plays `steps` with the render loop attached.
    async fn run_steps(&self, name: &'static str, steps: Vec<Step>) {
        let _stage = self.stage.lock().await;
        let total = steps.len();
        if total == 0 {
            debug!(animation = name, "Nothing to play");
            return;
        }
        info!(animation = name, steps = total, "Animation starting");

        self.device.set_buffer(steps[0].leds.clone());
        self.set_state(AnimationState::Running);
        let handle = self.render.start();
        let RenderState { frame_period, .. } = handle.state();
        debug!(frame_ms = frame_period.as_millis(), "Render loop attached");

        for (index, step) in steps.into_iter().enumerate() {
            if index > 0 {
                self.device.set_buffer(step.leds);
            }
            tokio::time::sleep(step.hold).await;
        }

        self.set_state(AnimationState::Draining);
        let frames = handle.stop().await;
        self.release_live().await;
        self.set_state(AnimationState::Idle);
        info!(animation = name, steps = total, frames, "Animation finished");
    }

    async fn release_live(&self) {
        let device = Arc::clone(&self.device);
        if let Err(err) = blocking(move || device.apply_effect(&WledState::release_live())).await {
            warn!(error = %err, "Could not release live override");
        }
    }
}

async fn blocking<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|e| Err(crate::error::GlowError::Other(e.to_string())))
}

/// Sending side of the animation queue.
#[derive(Clone)]
pub struct AnimationQueue {
    tx: mpsc::Sender<Animation>,
}

/// Queue depth; further requests are dropped until the worker catches up.
pub const QUEUE_DEPTH: usize = 8;

impl AnimationQueue {
    /// Creates a queue and the receiver a worker drains.
    pub fn channel() -> (Self, mpsc::Receiver<Animation>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    /// Queues `animation` without waiting. Returns false if it was dropped.
    pub fn enqueue(&self, animation: Animation) -> bool {
        match self.tx.try_send(animation) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(animation)) => {
                warn!(animation = animation.name(), "Animation queue full, dropping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(animation)) => {
                warn!(animation = animation.name(), "Animation worker gone, dropping");
                false
            }
        }
    }
}

/// Plays queued animations one after another until every sender is dropped.
pub async fn run_worker(animator: Arc<Animator>, mut rx: mpsc::Receiver<Animation>) {
    debug!("Animation worker started");
    while let Some(animation) = rx.recv().await {
        animator.play(&animation).await;
    }
    debug!("Animation worker stopped");
}
