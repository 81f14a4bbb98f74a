//! gsi-lights - WLED effects driven by Counter-Strike game state integration.
#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use gsi_lights::animation::{Animation, AnimationQueue, Animator, parse_color, run_worker};
use gsi_lights::cli::{self, Cli, Commands};
use gsi_lights::config::{self, AppConfig};
use gsi_lights::device::{
    DeviceDescriptor, SharedDevice, TransportKind, WledClient, resolve_device,
};
use gsi_lights::dispatch::GameStateHandler;
use gsi_lights::error::GlowError;
use gsi_lights::logging;
use gsi_lights::server::{self, ListenerState};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.json, cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output_error(&cli, &err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        None => {
            print_quick_start(cli);
            Ok(())
        }
        Some(Commands::Serve(args)) => cmd_serve(cli, args).await,
        Some(Commands::Info) => cmd_info(cli).await,
        Some(Commands::Flash(args)) => cmd_flash(cli, args).await,
        Some(Commands::Blink(args)) => cmd_blink(cli, args).await,
        Some(Commands::Idle) => cmd_idle(cli).await,
        Some(Commands::Version) => {
            cmd_version(cli);
            Ok(())
        }
        Some(Commands::Completions(args)) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "gsi-lights", &mut io::stdout());
            Ok(())
        }
    }
}

// === Setup ===

struct Session {
    config: AppConfig,
    config_path: PathBuf,
}

fn load_session(cli: &Cli) -> anyhow::Result<Session> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let config = config::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    debug!(path = %config_path.display(), "Configuration loaded");
    Ok(Session {
        config,
        config_path,
    })
}

/// Resolves the device off the async workers and caches its address.
async fn open_device(session: &mut Session) -> anyhow::Result<SharedDevice> {
    let device_config = session.config.device.clone();
    let device = tokio::task::spawn_blocking(move || resolve_device(&device_config))
        .await
        .context("device resolution task failed")??;

    let descriptor = device.descriptor();
    info!(
        address = %descriptor.address,
        leds = descriptor.led_count,
        name = %descriptor.name,
        "Device ready"
    );
    config::persist(&mut session.config, descriptor, &session.config_path)?;
    Ok(device)
}

fn animator(session: &Session, device: SharedDevice) -> Animator {
    Animator::new(device, session.config.device.frame_period())
        .with_idle(session.config.effects.idle.clone())
}

// === Commands ===

async fn cmd_serve(cli: &Cli, args: &cli::ServeArgs) -> anyhow::Result<()> {
    let mut session = load_session(cli)?;
    let device = open_device(&mut session).await?;
    let animator = Arc::new(animator(&session, device));

    let (queue, rx) = AnimationQueue::channel();
    let worker = tokio::spawn(run_worker(Arc::clone(&animator), rx));
    queue.enqueue(Animation::Idle);

    let effects = &session.config.effects;
    let handler = GameStateHandler::new(queue, effects.flash_duration());
    let state = ListenerState::new(handler, &session.config.server.auth_token);
    let listen = args
        .listen
        .clone()
        .unwrap_or_else(|| session.config.server.listen.clone());

    server::serve(&listen, state, shutdown_signal()).await?;

    // The listener owned the last queue sender; the worker exits once drained.
    worker.await.context("animation worker panicked")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[derive(Serialize)]
struct InfoReport<'a> {
    device: &'a DeviceDescriptor,
    protocol: &'static str,
    firmware: String,
    frame_rate: u32,
    config_path: String,
}

/// Firmware version of a network device, or why it could not be read.
async fn firmware_version(descriptor: &DeviceDescriptor) -> String {
    if descriptor.kind != TransportKind::Network {
        return "n/a (serial)".to_string();
    }
    let client = WledClient::new(&descriptor.address);
    match tokio::task::spawn_blocking(move || client.describe()).await {
        Ok(Ok(info)) => info.ver,
        Ok(Err(reason)) => format!("unavailable ({reason})"),
        Err(err) => format!("unavailable ({err})"),
    }
}

async fn cmd_info(cli: &Cli) -> anyhow::Result<()> {
    let mut session = load_session(cli)?;
    let device = open_device(&mut session).await?;
    let descriptor = device.descriptor();
    let protocol = match descriptor.kind {
        TransportKind::Serial => "adalight",
        TransportKind::Network => session.config.device.protocol.name(),
    };
    let firmware = firmware_version(descriptor).await;

    if cli.json {
        output_json(&InfoReport {
            device: descriptor,
            protocol,
            firmware,
            frame_rate: session.config.device.frame_rate,
            config_path: session.config_path.display().to_string(),
        });
    } else {
        println!("{}", style(&descriptor.name).bold().cyan());
        println!("  Address:   {}", descriptor.address);
        println!("  Transport: {:?}", descriptor.kind);
        println!("  Protocol:  {protocol}");
        println!("  Firmware:  {firmware}");
        println!("  LEDs:      {}", descriptor.led_count);
        println!("  MAC:       {}", descriptor.mac);
        println!("  Config:    {}", session.config_path.display());
    }
    Ok(())
}

async fn cmd_flash(cli: &Cli, args: &cli::FlashArgs) -> anyhow::Result<()> {
    let mut session = load_session(cli)?;
    let duration = match args.duration {
        Some(secs) if secs.is_finite() && secs >= 0.0 => Duration::from_secs_f64(secs),
        Some(secs) => anyhow::bail!("invalid duration: {secs}"),
        None => session.config.effects.flash_duration(),
    };
    let device = open_device(&mut session).await?;
    animator(&session, device)
        .flashbang(args.intensity, duration)
        .await;
    report_done(cli, "flashbang");
    Ok(())
}

async fn cmd_blink(cli: &Cli, args: &cli::BlinkArgs) -> anyhow::Result<()> {
    let mut session = load_session(cli)?;
    let color = parse_color(&args.color)?;
    let effects = &session.config.effects;
    let times = args.times.unwrap_or(effects.blink_times);
    let speed = args.speed.unwrap_or(effects.blink_speed);
    let device = open_device(&mut session).await?;
    animator(&session, device).blink(color, times, speed).await;
    report_done(cli, "blink");
    Ok(())
}

async fn cmd_idle(cli: &Cli) -> anyhow::Result<()> {
    let mut session = load_session(cli)?;
    let device = open_device(&mut session).await?;
    animator(&session, device).idle().await;
    report_done(cli, "idle");
    Ok(())
}

fn cmd_version(cli: &Cli) {
    if cli.json {
        output_json(&serde_json::json!({
            "name": "gsi-lights",
            "version": VERSION,
        }));
    } else {
        println!("gsi-lights {VERSION}");
    }
}

fn print_quick_start(cli: &Cli) {
    if cli.json {
        output_json(&serde_json::json!({
            "tool": "gsi-lights",
            "version": VERSION,
            "commands": {
                "serve": "gsi-lights serve [--listen ADDR]",
                "info": "gsi-lights info",
                "flash": "gsi-lights flash <1-255> [--duration SECS]",
                "blink": "gsi-lights blink <HEX_COLOR> [--times N] [--speed S]",
                "idle": "gsi-lights idle",
            },
        }));
        return;
    }

    println!("{} {}\n", style("gsi-lights").bold().cyan(), VERSION);
    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  Listen for game state", style("gsi-lights serve").green());
    println!("  {}  Show the resolved device", style("gsi-lights info").green());
    println!("  {}  Test a flashbang", style("gsi-lights flash 255").green());
    println!("  {}  Blink red", style("gsi-lights blink ff0000").green());
    println!();
    println!("Run {} for full help", style("gsi-lights --help").yellow());
}

// === Output ===

fn report_done(cli: &Cli, animation: &str) {
    if cli.json {
        output_json(&serde_json::json!({ "played": animation }));
    } else {
        println!("{} {animation}", style("Played").green());
    }
}

fn output_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("Failed to encode output: {err}"),
    }
}

fn output_error(cli: &Cli, error: &anyhow::Error) {
    let glow = error.downcast_ref::<GlowError>();
    let suggestion = glow.and_then(GlowError::suggestion);
    if cli.json {
        let json = serde_json::json!({
            "error": true,
            "message": format!("{error:#}"),
            "suggestion": suggestion,
            "recoverable": glow.is_some_and(GlowError::is_user_recoverable),
        });
        eprintln!("{json}");
    } else {
        eprintln!("{}: {error:#}", style("Error").red().bold());
        if let Some(suggestion) = suggestion {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
