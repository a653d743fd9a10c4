//! AI Host Pro - terminal front end
//!
//! Plan an event from its documents, review the generated script, pick the
//! anchor's voice and host the event live.

mod command;
mod config;
mod shell;
mod views;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use hostpro_event::JsonFileStore;

use crate::config::Settings;
use crate::shell::Shell;

/// AI Host Pro - an AI anchor for your event
#[derive(Parser)]
#[command(name = "ai-host-pro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn event documents into a voiced hosting script and run it live")]
struct Cli {
    /// Settings file (default: <config dir>/ai-host-pro/config.toml)
    #[arg(short, long, env = "AI_HOST_PRO_CONFIG")]
    config: Option<PathBuf>,

    /// Where saved events are kept
    #[arg(long, env = "AI_HOST_PRO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Do not open an audio device; segments are timed silently
    #[arg(long)]
    mute: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.storage.data_dir = Some(dir);
    }
    if cli.mute {
        settings.playback.mute = true;
    }

    let store = JsonFileStore::new(settings.storage.resolved_dir());
    let mut shell = Shell::new(settings, store);
    shell.run().await
}
