//! Fixed-cadence render loop.
//!
//! A loop only exists for the lifetime of one animation: [`RenderLoop::start`]
//! spawns it and [`RenderHandle::stop`] signals it and waits for it to exit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

use crate::device::SharedDevice;

/// Render state: whether a loop is running and how often it transmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub active: bool,
    pub frame_period: Duration,
}

/// Spawns render tasks for one device.
#[derive(Clone)]
pub struct RenderLoop {
    device: SharedDevice,
    frame_period: Duration,
}

impl RenderLoop {
    pub fn new(device: SharedDevice, frame_period: Duration) -> Self {
        Self {
            device,
            frame_period,
        }
    }

    /// Starts transmitting the device buffer every frame period.
    ///
    /// The first frame goes out immediately.
    pub fn start(&self) -> RenderHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let device = Arc::clone(&self.device);
        let period = self.frame_period;
        debug!(period_ms = period.as_millis(), "Render loop starting");
        let task = tokio::spawn(run(device, period, stop_rx));
        RenderHandle {
            stop_tx,
            task,
            frame_period: period,
        }
    }
}

async fn run(device: SharedDevice, period: Duration, mut stop_rx: watch::Receiver<bool>) -> u64 {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = 0u64;

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let device = Arc::clone(&device);
                // Serial writes can block; keep them off the async workers.
                match tokio::task::spawn_blocking(move || device.render_once()).await {
                    Ok(Ok(())) => trace!(frame = frames, "Frame sent"),
                    Ok(Err(err)) if err.is_transient() => warn!(error = %err, "Frame dropped"),
                    Ok(Err(err)) => error!(error = %err, "Frame failed"),
                    Err(err) => warn!(error = %err, "Render worker failed"),
                }
                frames += 1;
            }
        }
    }

    debug!(frames, "Render loop stopped");
    frames
}

/// Handle to a running render loop.
pub struct RenderHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<u64>,
    frame_period: Duration,
}

impl RenderHandle {
    pub fn state(&self) -> RenderState {
        RenderState {
            active: !self.task.is_finished(),
            frame_period: self.frame_period,
        }
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// Returns the number of frames attempted. No frame is sent after this
    /// returns.
    pub async fn stop(self) -> u64 {
        let _ = self.stop_tx.send(true);
        match self.task.await {
            Ok(frames) => frames,
            Err(err) => {
                warn!(error = %err, "Render loop ended abnormally");
                0
            }
        }
    }
}
