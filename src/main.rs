//! playlist-bridge - copy a YouTube playlist into a Spotify playlist

use clap::Parser;
use playlist_bridge::{Config, run_with_shutdown};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for playlist-bridge
#[derive(Parser, Debug)]
#[command(name = "playlist-bridge")]
#[command(about = "Copy the tracks of a YouTube playlist into a Spotify playlist")]
#[command(version)]
struct Args {
    /// Configuration file: `.toml`, or KEY=value properties
    #[arg(short, long, default_value = "config.properties")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %args.config.display(), error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    match run_with_shutdown(&config).await {
        Ok(Some(report)) => {
            match serde_json::to_string(&report) {
                Ok(summary) => println!("{}", summary),
                Err(e) => tracing::warn!(error = %e, "cannot serialize report"),
            }
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::from(130),
        Err(e) => {
            tracing::error!(error = %e, "migration could not start");
            ExitCode::FAILURE
        }
    }
}
