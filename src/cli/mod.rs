//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Drive WLED LEDs from Counter-Strike game state integration.
///
/// Point the game's GSI config at the listener (`serve`), or trigger effects
/// by hand to check the wiring.
#[derive(Parser, Debug)]
#[command(name = "gsi-lights", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, short = 'c', global = true, env = "GSI_LIGHTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON output and JSON log lines
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen for game state and play effects
    Serve(ServeArgs),

    /// Resolve the device and show what it reports
    Info,

    /// Play a flashbang fade
    Flash(FlashArgs),

    /// Blink a color
    Blink(BlinkArgs),

    /// Switch the device to its idle look
    Idle,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides server.listen)
    #[arg(long, short = 'l')]
    pub listen: Option<String>,
}

#[derive(Parser, Debug)]
pub struct FlashArgs {
    /// Starting brightness, 1-255
    pub intensity: u8,

    /// Fade length in seconds (overrides effects.flash_duration_secs)
    #[arg(long, short = 'd')]
    pub duration: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct BlinkArgs {
    /// Color in hex format (e.g., "ff0000" for red, "#00ff00" for green)
    pub color: String,

    /// Number of on/off cycles
    #[arg(long, short = 't')]
    pub times: Option<u32>,

    /// Blink speed; each half-cycle lasts 10 / speed seconds
    #[arg(long, short = 's')]
    pub speed: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
