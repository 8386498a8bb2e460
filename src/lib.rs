//! # playlist-bridge
//!
//! Copies the tracks of a YouTube playlist into a Spotify playlist.
//!
//! ## Pipeline
//!
//! 1. [`source::PlaylistSource`] walks the source playlist page by page
//!    through a [`pagination::PaginatedCollector`] and yields track titles.
//! 2. [`destination::PlaylistDestination`] searches each title and keeps the
//!    URI of the first hit.
//! 3. [`chunk::chunk`] groups the URIs to fit the destination's per-request
//!    limit, and each group is appended with one write request.
//!
//! Every request goes through a [`transport::Transport`]. The production
//! implementation, [`transport::HttpExecutor`], retries rate-limited
//! responses using the server's `retry-after` hint.
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_bridge::{Config, HttpExecutor, Migration};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.properties"))?;
//!     let executor = HttpExecutor::new(config.retry.clone())?;
//!
//!     let report = Migration::new(&executor, &config).run().await;
//!     println!("{} of {} titles migrated", report.resolved, report.titles_found);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch chunking
pub mod chunk;
/// Configuration types
pub mod config;
/// JSON path extraction
pub mod decode;
/// Destination API client
pub mod destination;
/// Error types
pub mod error;
/// Migration driver
pub mod migration;
/// Cursor pagination
pub mod pagination;
/// Bounded retry combinator
pub mod retry;
/// Source API client
pub mod source;
/// HTTP transport
pub mod transport;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, DestinationConfig, RetryConfig, SourceConfig};
pub use error::{Error, Result};
pub use migration::{Migration, MigrationReport};
pub use transport::{HttpExecutor, RequestDescriptor, ResponseEnvelope, Transport};

/// Run a full migration over HTTP, giving up early on a termination signal.
///
/// Returns `Ok(None)` when the run was interrupted.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Errors
/// Returns error if the configuration is invalid or the HTTP client cannot be created
pub async fn run_with_shutdown(config: &Config) -> Result<Option<MigrationReport>> {
    config.validate()?;
    let executor = HttpExecutor::new(config.retry.clone())?;
    let migration = Migration::new(&executor, config);

    tokio::select! {
        report = migration.run() => Ok(Some(report)),
        _ = wait_for_signal() => {
            tracing::warn!("migration interrupted, batches already written are kept");
            Ok(None)
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_err() {
                // Without any handler the run simply goes to completion
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
