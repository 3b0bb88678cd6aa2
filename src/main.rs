//! joyreport: replay key events through the joystick report pipeline
//!
//! Drives a `Joystick` on a loopback transport from a timed event script,
//! completes transfers from a separate task the way the USB interrupt would,
//! and prints every frame the transport receives.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info, warn};

use joyreport::{DefaultJoystick, JoystickConfig, KeyboardEvent, Keycode, JOYSTICK_DESCRIPTOR};
use joyreport_transport::{LoopbackTransport, SubmittedFrame, TransmitGate};

#[derive(Parser)]
#[command(name = "joyreport")]
#[command(about = "Replay key events through the joystick HID report pipeline")]
struct Cli {
    /// Config file path (default: ~/.config/joyreport/joystick.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event script (TOML); a built-in demo runs when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Number of frame ticks to run
    #[arg(long, default_value_t = 16)]
    ticks: u64,

    /// Simulated time from submit to transfer complete, in milliseconds
    #[arg(long, default_value_t = 1)]
    latency_ms: u64,

    /// Print the HID report descriptor and exit
    #[arg(long)]
    print_descriptor: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// What a script event does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    Down,
    Up,
    /// Raw ADC reading in `value`
    Analog,
    Clear,
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptEvent {
    tick: u64,
    #[serde(default)]
    key: Option<String>,
    action: Action,
    #[serde(default)]
    value: u16,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    events: Vec<ScriptEvent>,
}

impl Script {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    /// Press space, push the stick right and up, release, recenter
    fn demo() -> Self {
        let ev = |tick, key: &str, action, value| ScriptEvent {
            tick,
            key: Some(key.to_string()),
            action,
            value,
        };
        Self {
            events: vec![
                ev(0, "Space", Action::Down, 0),
                ev(1, "D", Action::Analog, 4095),
                ev(2, "W", Action::Analog, 2048),
                ev(2, "E", Action::Down, 0),
                ev(4, "Space", Action::Up, 0),
                ev(6, "D", Action::Analog, 0),
                ev(6, "W", Action::Analog, 0),
                ev(8, "E", Action::Up, 0),
                ScriptEvent {
                    tick: 10,
                    key: None,
                    action: Action::Clear,
                    value: 0,
                },
            ],
        }
    }
}

type Device = DefaultJoystick<Arc<LoopbackTransport>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.print_descriptor {
        println!("{}", hex(JOYSTICK_DESCRIPTOR.as_bytes()));
        return Ok(());
    }

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(JoystickConfig::default_path);
    if cli.init_config {
        JoystickConfig::default().save(&config_path)?;
        info!("Wrote default config to {:?}", config_path);
        return Ok(());
    }
    info!("Loading config from {:?}", config_path);
    let config = JoystickConfig::load(&config_path)?;

    let script = match &cli.script {
        Some(path) => Script::load(path)?,
        None => Script::demo(),
    };

    run(&cli, config, script).await
}

async fn run(cli: &Cli, config: JoystickConfig, script: Script) -> Result<()> {
    let transport = Arc::new(LoopbackTransport::new());
    let mut joystick: Device = DefaultJoystick::new(Arc::clone(&transport));
    joystick.set_calibration(config.calibration);
    info!(
        "Joystick on {}: {} byte report, tick {} ms",
        joystick.endpoint(),
        joyreport::Report::LEN,
        config.frame_interval_ms
    );

    // Transfer-complete context
    let completion = tokio::spawn(complete_transfers(
        Arc::clone(&transport),
        joystick.gate(),
        Duration::from_millis(cli.latency_ms.max(1)),
    ));

    let mut interval = tokio::time::interval(Duration::from_millis(config.frame_interval_ms.max(1)));
    for tick in 0..cli.ticks {
        interval.tick().await;

        for event in script.events.iter().filter(|e| e.tick == tick) {
            apply_event(&mut joystick, &config, event)?;
        }

        match joystick.send_if_dirty() {
            Ok(true) => debug!("Tick {}: frame submitted", tick),
            Ok(false) => {}
            Err(e) if e.is_retryable() => debug!("Tick {}: send deferred ({})", tick, e),
            Err(e) => warn!("Tick {}: send failed: {}", tick, e),
        }
    }

    completion.abort();
    for frame in transport.take_frames() {
        print_frame(&frame);
    }

    let stats = joystick.stats();
    info!(
        "Done: {} submitted, {} completed, {} busy, {} rejected",
        stats.submitted, stats.completed, stats.busy, stats.rejected
    );
    Ok(())
}

fn apply_event(joystick: &mut Device, config: &JoystickConfig, event: &ScriptEvent) -> Result<()> {
    match event.action {
        Action::Clear => joystick.buffer_clear(),
        Action::Down => {
            joystick.event_handler(KeyboardEvent::down(event_keycode(config, event)?));
        }
        Action::Up => {
            joystick.event_handler(KeyboardEvent::up(event_keycode(config, event)?));
        }
        Action::Analog => {
            let keycode = event_keycode(config, event)?;
            if !joystick.analog_sample(keycode, event.value) {
                debug!("Analog sample for {} changed nothing", keycode);
            }
        }
    }
    Ok(())
}

fn event_keycode(config: &JoystickConfig, event: &ScriptEvent) -> Result<Keycode> {
    let Some(key) = event.key.as_deref() else {
        bail!("Script event at tick {} needs a key", event.tick);
    };
    config
        .resolve(key)
        .with_context(|| format!("Script event at tick {}", event.tick))
}

/// Print submitted frames, then signal completion after `latency`
async fn complete_transfers(
    transport: Arc<LoopbackTransport>,
    gate: Arc<TransmitGate>,
    latency: Duration,
) {
    let mut interval = tokio::time::interval(latency);
    loop {
        interval.tick().await;
        let frames = transport.take_frames();
        if frames.is_empty() {
            continue;
        }
        for frame in &frames {
            print_frame(frame);
        }
        gate.on_transfer_complete();
    }
}

fn print_frame(frame: &SubmittedFrame) {
    println!("{}  {}", frame.endpoint, hex(&frame.bytes));
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
