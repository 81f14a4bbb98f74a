//! Common test utilities.
//!
//! - `fixtures`: GSI payloads and config files
//! - `receiver`: UDP socket standing in for a network WLED
#![allow(dead_code)]

pub mod fixtures;
pub mod receiver;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
