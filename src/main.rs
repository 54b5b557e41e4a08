use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use slidepad::config::HostSettings;
use slidepad::device::{Assembled, Device};
use slidepad::host::{self, ReplayPort, RunSummary, Trace};
use slidepad::profile::{self, Profile, PRESETS};
use slidepad::time::{Clock, SystemClock};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Analog slider and mode switch to host events
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Profile file, defaults to ~/.config/slidepad/profile.toml
    #[arg(long, value_name = "FILE", global = true, conflicts_with = "preset")]
    profile: Option<PathBuf>,

    /// Built-in profile: desnarler, arrow-pad or stepped-volume
    #[arg(long, value_name = "NAME", global = true)]
    preset: Option<String>,

    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the profile, then verify the device
    Check,
    /// Write the selected preset to the profile path
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Run the device against a recorded trace
    Replay {
        #[arg(value_name = "TRACE")]
        trace: PathBuf,
        #[arg(long, default_value_t = 10)]
        tick_ms: u64,
        #[arg(long, default_value_t = 10)]
        stats_s: u64,
    },
    /// Run on Raspberry Pi GPIO with an MCP3008 (feature `rpi`)
    Rpi {
        #[arg(long, default_value_t = 10)]
        tick_ms: u64,
        #[arg(long, default_value_t = 10)]
        stats_s: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(cli.log_level)?;

    match cli.command {
        Command::Check => check(&cli.profile, &cli.preset).await,
        Command::Init { force } => init(&cli.profile, &cli.preset, force).await,
        Command::Replay {
            trace,
            tick_ms,
            stats_s,
        } => {
            let profile = resolve_profile(&cli.profile, &cli.preset).await?;
            let settings = HostSettings {
                tick_interval_ms: tick_ms,
                stats_interval_s: stats_s,
                ..HostSettings::default()
            };
            let summary = replay(&profile, &trace, settings).await?;
            print_summary(&summary);
            Ok(())
        }
        Command::Rpi { tick_ms, stats_s } => {
            let profile = resolve_profile(&cli.profile, &cli.preset).await?;
            let settings = HostSettings {
                tick_interval_ms: tick_ms,
                stats_interval_s: stats_s,
                ..HostSettings::default()
            };
            let summary = run_rpi(&profile, settings).await?;
            print_summary(&summary);
            Ok(())
        }
    }
}

fn setup(level: Level) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env(level);
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// `--preset` wins, then `--profile`, then the default path, then the
/// desnarler preset.
async fn resolve_profile(path: &Option<PathBuf>, preset: &Option<String>) -> Result<Profile> {
    if let Some(name) = preset {
        info!("Using built-in preset '{}'", name);
        return Ok(Profile::preset(name)?);
    }
    if let Some(path) = path {
        return Ok(profile::load(path).await?);
    }

    let default = profile::default_path();
    if tokio::fs::try_exists(&default).await? {
        return Ok(profile::load(&default).await?);
    }
    warn!(
        "No profile at {}, using the desnarler preset (run `slidepad init` to create one)",
        default.display()
    );
    Ok(Profile::desnarler())
}

async fn check(path: &Option<PathBuf>, preset: &Option<String>) -> Result<()> {
    let profile = resolve_profile(path, preset).await?;
    let (tx, _rx) = mpsc::channel(1);
    let port = ReplayPort::new(Trace::default(), profile.adc, tx);
    let device = Device::<Assembled>::assemble(&profile)?.verify(&port)?;

    println!("Profile '{}' is valid", device.name());
    for slider in &profile.sliders {
        println!(
            "  {}: {:?}, deadband {}, {}ms",
            slider.channel, slider.classifier, slider.deadband, slider.min_interval_ms
        );
    }
    println!(
        "  switch on pin {} ({} / {})",
        profile.mode_switch.pin, profile.mode_switch.labels.a, profile.mode_switch.labels.b
    );
    println!(
        "  {} LEDs, {} layer patterns",
        profile.indicator.width(),
        profile.indicator.patterns.len()
    );
    Ok(())
}

async fn init(path: &Option<PathBuf>, preset: &Option<String>, force: bool) -> Result<()> {
    let name = preset.as_deref().unwrap_or(PRESETS[0]);
    let profile = Profile::preset(name)?;
    let target = path.clone().unwrap_or_else(profile::default_path);
    profile::save(&profile, &target, force).await?;
    println!("Wrote preset '{}' to {}", name, target.display());
    Ok(())
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => token.cancel(),
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });
    cancel
}

async fn replay(profile: &Profile, trace_path: &Path, settings: HostSettings) -> Result<RunSummary> {
    let trace = Trace::load(trace_path).await?;
    let (tx, rx) = mpsc::channel(settings.command_buffer);
    let logger = host::spawn_command_logger(rx);

    let mut port = ReplayPort::new(trace, profile.adc, tx);
    let clock = SystemClock::new();
    let device = Device::<Assembled>::assemble(profile)?
        .verify(&port)?
        .start(clock.now(), &mut port);

    let summary = host::run(device, &mut port, &clock, settings, shutdown_on_ctrl_c()).await;
    if port.dropped() > 0 {
        warn!("{} host commands were dropped", port.dropped());
    }
    drop(port);
    let logged = logger
        .await
        .map_err(|e| eyre!("Command logger failed: {}", e))?;
    info!("{} host commands logged", logged);
    Ok(summary)
}

#[cfg(feature = "rpi")]
async fn run_rpi(profile: &Profile, settings: HostSettings) -> Result<RunSummary> {
    use slidepad::host::rpi::RpiPort;

    let (tx, rx) = mpsc::channel(settings.command_buffer);
    let logger = host::spawn_command_logger(rx);

    let mut port = RpiPort::open(profile, tx)?;
    let clock = SystemClock::new();
    let device = Device::<Assembled>::assemble(profile)?
        .verify(&port)?
        .start(clock.now(), &mut port);

    let summary = host::run(device, &mut port, &clock, settings, shutdown_on_ctrl_c()).await;
    drop(port);
    logger
        .await
        .map_err(|e| eyre!("Command logger failed: {}", e))?;
    Ok(summary)
}

#[cfg(not(feature = "rpi"))]
async fn run_rpi(_profile: &Profile, _settings: HostSettings) -> Result<RunSummary> {
    Err(eyre!(
        "slidepad was built without Raspberry Pi support, rebuild with `--features rpi`"
    ))
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{:?} after {}ms: {} ticks, {} actions, {} mode changes, {} layer changes",
        summary.reason,
        summary.duration_ms(),
        summary.ticks,
        summary.emitted,
        summary.mode_changes,
        summary.layer_changes
    );
}
