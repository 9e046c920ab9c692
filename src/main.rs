use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use relaybridge::{BridgeConfig, MidiSource, spawn_bridge, transport};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relaybridge")]
#[command(version, about = "MIDI to serial motor/relay controller bridge", long_about = None)]
struct Cli {
    /// Also log motor frames (relay masks are logged at the default level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Bridge MIDI input to the controller until Ctrl+C
    Run(RunArgs),

    /// List MIDI inputs and serial ports
    Ports,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Config file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MIDI input port name, overrides the config
    #[arg(long)]
    midi_port: Option<String>,

    /// Serial device path, skips pattern matching
    #[arg(long)]
    serial: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(args),
        Command::Ports => ports(),
    }
}

fn ports() -> anyhow::Result<()> {
    println!("MIDI inputs:");
    for name in relaybridge::source::list_ports()? {
        println!("  {name}");
    }
    println!("Serial ports:");
    for name in transport::list_ports()? {
        println!("  {name}");
    }
    Ok(())
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(port) = args.midi_port {
        config.midi_port = port;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    let midi = MidiSource::open(&config.midi_port)?;
    let serial = match &args.serial {
        Some(path) => transport::open_port(path, &config)
            .with_context(|| format!("failed to open controller on {path}"))?,
        None => transport::open_controller(&config)?,
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let bridge = spawn_bridge(midi.events(), serial, &config);
    tracing::info!(
        "listening for CC {}-{} (motors) and notes (relays); press Ctrl+C to exit",
        config.first_motor,
        config.last_motor
    );

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("exiting");
    bridge.shutdown();
    midi.close();
    Ok(())
}
