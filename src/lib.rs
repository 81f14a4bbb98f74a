//! GSI lights library - WLED effects driven by game state integration.
//!
//! Exposes the pipeline behind the `gsi-lights` binary for tests and
//! embedding.
//!
//! # Modules
//!
//! - `gamestate`: Snapshot flattening and change detection
//! - `dispatch`: Mapping state changes to animation requests
//! - `animation`: Animation engine and queue worker
//! - `render`: Fixed-cadence frame transmission
//! - `device`: Device abstraction, discovery and WLED control plane
//! - `protocol`: Adalight, E1.31 and WARLS frame encoders
//! - `transport`: Serial and UDP frame delivery
//! - `server`: HTTP listener for the game client
//! - `config`: Configuration file handling
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod animation;
pub mod cli;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod gamestate;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;
