mod event;
mod logging;
mod player;
mod playlist;
mod pool;
mod settings;
mod state;
mod tag;

use crate::player::{Credential, LoadMode};
use crate::player::mpd::MpdClient;
use crate::pool::Poller;
use crate::settings::{FileSettings, Settings};
use crate::tag::FileTagReader;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Plays the MPD playlist named by the tag resting on the card reader
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Log level (trace, debug, info, warning, error, critical), case-insensitive
    #[arg(
        short = 'l',
        long = "loglevel",
        default_value = "warning",
        value_parser = logging::parse_level
    )]
    pub loglevel: LevelFilter,
    /// File containing the MPD password on a single line
    #[arg(short = 'p', long = "password", value_name = "FILE")]
    pub password: Option<PathBuf>,
    /// MPD address as host:port or a Unix socket path.
    /// Falls back to MPD_HOST/MPD_PORT, then localhost:6600.
    #[arg(long, value_name = "ADDRESS")]
    pub mpd: Option<String>,
    /// File the card-reader helper writes the current tag to
    #[arg(long, value_name = "FILE")]
    pub tag_source: Option<PathBuf>,
    /// JSON settings file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Consecutive empty reads tolerated before playback is paused
    #[arg(long)]
    pub absence_threshold: Option<u32>,
    /// Delay between the end of one poll and the start of the next
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
    /// How a new tag's playlist is loaded
    #[arg(long, value_enum)]
    pub load_mode: Option<LoadMode>,
    /// Suffix naming the shuffled variant of a playlist
    #[arg(long)]
    pub shuffle_suffix: Option<String>,
    /// MPD connect/read/write timeout; 0 waits forever
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Password taken from a `password@host` MPD_HOST value
    #[arg(skip)]
    pub env_credential: Option<Credential>,
}

fn mpd_from_env_if_unset(cli: &mut Config) {
    if cli.mpd.is_some() {
        return;
    }
    let host = std::env::var("MPD_HOST").ok();
    let port = std::env::var("MPD_PORT").ok();
    if let Some((address, credential)) = settings::mpd_from_env(host, port) {
        cli.mpd = Some(address);
        cli.env_credential = credential;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn run(cfg: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let file = match &cfg.config {
        Some(path) => FileSettings::load(path)?,
        None => FileSettings::default(),
    };
    let settings = Settings::resolve(&cfg, file)?;

    tracing::info!(
        mpd = %settings.mpd_address,
        tag_source = %settings.tag_source.display(),
        absence_threshold = settings.absence_threshold,
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        load_mode = ?settings.load_mode,
        authenticate = settings.credential.is_some(),
        "Starting tag poller"
    );

    let reader = FileTagReader::new(&settings.tag_source);
    let client = MpdClient::new(settings.mpd_address.clone(), settings.timeout);
    let poller = Poller::new(reader, client, settings);
    let poller = pool::listen(poller, shutdown_signal()).await?;
    tracing::debug!(state = ?poller.state(), "Poll loop stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    mpd_from_env_if_unset(&mut cfg);
    logging::init(cfg.loglevel);

    if let Err(e) = run(cfg).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e);
    }
    Ok(())
}
