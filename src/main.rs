use anyhow::{Context, Result};
use clap::Parser;
use click_key_sequencer::{
    AbortHotkey, Config, EnigoInjector, KeyChord, ProcessFinder, RdevPointerSource, Runner,
    StartMode,
};
use colored::Colorize;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cks", version, about = "Play a timed key sequence after a click")]
struct Args {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Switch to the target window with the focus hotkey instead of waiting for a click
    #[arg(long, conflicts_with = "manual")]
    auto_switch: bool,

    /// Wait for a click even if the config enables auto switching
    #[arg(long)]
    manual: bool,

    /// Write the default configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    init_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.init_config {
        let path = path.to_string_lossy();
        Config::default()
            .save_to_file(&path)
            .with_context(|| format!("writing default config to {path}"))?;
        println!("{} {}", "Default configuration written to".green(), path);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::from_file(&path.to_string_lossy())?,
        None => Config::default(),
    };
    if args.auto_switch {
        config.auto_switch = true;
    } else if args.manual {
        config.auto_switch = false;
    }

    init_logging(args.verbose || config.verbose);

    // fails before any key is sent
    let plan = config.build_plan().context("invalid configuration")?;

    if let Some(target) = &config.target_process {
        match ProcessFinder::new().find_process(target) {
            Some(pid) => info!("target process '{}' found (PID {})", target, pid),
            None => warn!("target process '{}' is not running", target),
        }
    }

    let injector = EnigoInjector::new().context("connecting to the input layer")?;
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let _abort = match plan.mode {
        StartMode::Manual => arm_abort(&config, cancel_tx),
        StartMode::AutoSwitch => None,
    };

    match plan.mode {
        StartMode::AutoSwitch => println!(
            "{} {}",
            "Switching focus with".cyan(),
            plan.focus.chord().to_string().bold()
        ),
        StartMode::Manual => println!("{}", "Click to start playback...".cyan()),
    }

    let mut runner = Runner::new(injector, RdevPointerSource::new(), cancel_rx);
    let phase = runner.run(&plan).await?;

    println!("{} ({})", "Sequence finished".green().bold(), phase);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Registers the abort hotkey, if one is configured, against the cancellation channel.
fn arm_abort(config: &Config, cancel: watch::Sender<bool>) -> Option<AbortHotkey> {
    let chord: KeyChord = config.abort_hotkey.as_deref()?.parse().ok()?;
    match AbortHotkey::register(&chord) {
        Ok(hotkey) => {
            hotkey.spawn_listener(cancel);
            Some(hotkey)
        }
        Err(e) => {
            warn!("continuing without abort hotkey: {}", e);
            None
        }
    }
}
