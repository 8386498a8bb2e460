//! Error types for playlist-bridge
//!
//! The taxonomy mirrors how the remote services fail:
//! - [`Error::Transport`] - no response was obtained at all
//! - [`Error::RateLimited`] - a 429 outlived the whole retry budget
//! - [`Error::UnexpectedStatus`] - any other status the caller did not accept
//! - [`Error::MalformedResponse`] - the body could not be parsed as JSON
//!
//! A missing field inside an otherwise valid body is not an error; decoders
//! return `None` for it.

use thiserror::Error;

/// Result type alias for playlist-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-bridge
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "source.api_key")
        key: Option<String>,
    },

    /// Connection-level failure, no response was obtained
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server kept answering 429 until the retry budget ran out
    #[error("rate limited by {url}, retry budget exhausted")]
    RateLimited {
        /// The request URL
        url: String,
    },

    /// Status code outside the accepted set (200, 201)
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus {
        /// The returned status code
        status: u16,
        /// The request URL
        url: String,
    },

    /// Response body is not valid JSON
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A JSON path expression could not be parsed
    #[error("invalid JSON path: {0}")]
    InvalidPath(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a configuration key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// True when the failure happened before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
