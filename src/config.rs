//! Configuration types for playlist-bridge
//!
//! A [`Config`] is built once at startup and handed by reference to the
//! executor, the two API clients and the migration driver.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default playlist listing endpoint of the source API
pub const DEFAULT_SOURCE_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/playlistItems";

/// Default base URL of the destination API
pub const DEFAULT_DESTINATION_API_BASE: &str = "https://api.spotify.com/v1";

/// Source (read-only, key-authenticated) playlist settings
#[derive(Clone, Debug, Deserialize)]
pub struct SourceConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,

    /// Identifier of the playlist to read
    pub playlist_id: String,

    /// Playlist items endpoint (default: YouTube Data API v3)
    #[serde(default = "default_source_endpoint")]
    pub endpoint: String,

    /// Items requested per page, sent as `maxResults` (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Destination (bearer-authenticated search + write) playlist settings
#[derive(Clone, Debug, Deserialize)]
pub struct DestinationConfig {
    /// OAuth bearer token
    pub token: String,

    /// Identifier of the playlist to append to
    pub playlist_id: String,

    /// API base URL without trailing slash (default: Spotify Web API v1)
    #[serde(default = "default_destination_api_base")]
    pub api_base: String,

    /// Maximum identifiers per write request (default: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Rate-limit retry behavior shared by every request
#[derive(Clone, Debug, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first (default: 10)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Duration of one `retry-after` unit, in milliseconds (default: 1000)
    ///
    /// Servers disagree on whether the header counts seconds or
    /// milliseconds, so the unit is explicit.
    #[serde(default = "default_retry_after_unit", deserialize_with = "duration_millis::deserialize")]
    pub retry_after_unit: Duration,

    /// Fixed delay added to every server-provided wait (default: 800 ms)
    #[serde(default = "default_safety_margin", deserialize_with = "duration_millis::deserialize")]
    pub safety_margin: Duration,

    /// Per-request timeout (default: 30 s)
    #[serde(default = "default_request_timeout", deserialize_with = "duration_millis::deserialize")]
    pub request_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_after_unit: default_retry_after_unit(),
            safety_margin: default_safety_margin(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Source playlist settings
    pub source: SourceConfig,

    /// Destination playlist settings
    pub destination: DestinationConfig,

    /// Retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Search each distinct title only once (default: false)
    #[serde(default)]
    pub skip_duplicate_titles: bool,
}

impl Config {
    /// Build a configuration from the four credentials, everything else defaulted
    pub fn new(
        source_api_key: impl Into<String>,
        destination_token: impl Into<String>,
        source_playlist_id: impl Into<String>,
        destination_playlist_id: impl Into<String>,
    ) -> Self {
        Self {
            source: SourceConfig {
                api_key: source_api_key.into(),
                playlist_id: source_playlist_id.into(),
                endpoint: default_source_endpoint(),
                page_size: default_page_size(),
            },
            destination: DestinationConfig {
                token: destination_token.into(),
                playlist_id: destination_playlist_id.into(),
                api_base: default_destination_api_base(),
                batch_size: default_batch_size(),
            },
            retry: RetryConfig::default(),
            skip_duplicate_titles: false,
        }
    }

    /// Load and validate a configuration file
    ///
    /// Files ending in `.toml` are parsed as TOML. Anything else is read as a
    /// `KEY=value` properties file with the keys `YOUTUBE_API_KEY`,
    /// `SPOTIFY_API_KEY`, `YOUTUBE_PLAYLIST_ID` and `SPOTIFY_PLAYLIST_ID`.
    pub fn load(path: &Path) -> Result<Self> {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::from_properties_file(path)?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            message: format!("invalid TOML: {}", e),
            key: None,
        })
    }

    /// Read a `KEY=value` properties file without touching the process environment
    pub fn from_properties_file(path: &Path) -> Result<Self> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;

        let mut pairs = Vec::new();
        for entry in iter {
            let pair = entry.map_err(|e| Error::Config {
                message: format!("invalid line in {}: {}", path.display(), e),
                key: None,
            })?;
            pairs.push(pair);
        }

        Self::from_properties(pairs)
    }

    /// Build a configuration from `KEY=value` pairs
    pub fn from_properties<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source_api_key = None;
        let mut destination_token = None;
        let mut source_playlist_id = None;
        let mut destination_playlist_id = None;

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "YOUTUBE_API_KEY" => &mut source_api_key,
                "SPOTIFY_API_KEY" => &mut destination_token,
                "YOUTUBE_PLAYLIST_ID" => &mut source_playlist_id,
                "SPOTIFY_PLAYLIST_ID" => &mut destination_playlist_id,
                other => {
                    tracing::debug!(key = other, "ignoring unknown configuration key");
                    continue;
                }
            };
            *slot = Some(value.into());
        }

        let require = |value: Option<String>, key: &str| {
            value.ok_or_else(|| Error::config(key, format!("{} is missing", key)))
        };

        Ok(Self::new(
            require(source_api_key, "YOUTUBE_API_KEY")?,
            require(destination_token, "SPOTIFY_API_KEY")?,
            require(source_playlist_id, "YOUTUBE_PLAYLIST_ID")?,
            require(destination_playlist_id, "SPOTIFY_PLAYLIST_ID")?,
        ))
    }

    /// Reject values the migration cannot run with
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source.api_key", &self.source.api_key),
            ("source.playlist_id", &self.source.playlist_id),
            ("source.endpoint", &self.source.endpoint),
            ("destination.token", &self.destination.token),
            ("destination.playlist_id", &self.destination.playlist_id),
            ("destination.api_base", &self.destination.api_base),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(key, format!("{} must not be empty", key)));
            }
        }

        if self.source.page_size == 0 {
            return Err(Error::config(
                "source.page_size",
                "page size must be at least 1",
            ));
        }
        if self.destination.batch_size == 0 {
            return Err(Error::config(
                "destination.batch_size",
                "batch size must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts",
                "at least one attempt is required",
            ));
        }

        Ok(())
    }
}

fn default_source_endpoint() -> String {
    DEFAULT_SOURCE_ENDPOINT.to_string()
}

fn default_destination_api_base() -> String {
    DEFAULT_DESTINATION_API_BASE.to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_batch_size() -> usize {
    50
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_after_unit() -> Duration {
    Duration::from_secs(1)
}

fn default_safety_margin() -> Duration {
    Duration::from_millis(800)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

// Durations are read as integer milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn new_fills_reference_defaults() {
        let config = Config::new("key", "token", "yt-list", "sp-list");
        assert_eq!(config.source.page_size, 50);
        assert_eq!(config.destination.batch_size, 50);
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.retry.safety_margin, Duration::from_millis(800));
        assert_eq!(config.source.endpoint, DEFAULT_SOURCE_ENDPOINT);
        assert!(!config.skip_duplicate_titles);
        config.validate().unwrap();
    }

    #[test]
    fn toml_with_only_credentials_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [source]
            api_key = "yt-key"
            playlist_id = "PL123"

            [destination]
            token = "bearer"
            playlist_id = "sp456"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.api_key, "yt-key");
        assert_eq!(config.destination.playlist_id, "sp456");
        assert_eq!(config.destination.api_base, DEFAULT_DESTINATION_API_BASE);
        assert_eq!(config.retry.retry_after_unit, Duration::from_secs(1));
    }

    #[test]
    fn toml_durations_are_milliseconds() {
        let config = Config::from_toml(
            r#"
            skip_duplicate_titles = true

            [source]
            api_key = "k"
            playlist_id = "p"

            [destination]
            token = "t"
            playlist_id = "d"
            batch_size = 100

            [retry]
            max_attempts = 3
            retry_after_unit = 1
            safety_margin = 0
            "#,
        )
        .unwrap();

        assert!(config.skip_duplicate_titles);
        assert_eq!(config.destination.batch_size, 100);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.retry_after_unit, Duration::from_millis(1));
        assert_eq!(config.retry.safety_margin, Duration::ZERO);
        assert_eq!(config.retry.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn toml_missing_section_is_a_config_error() {
        let err = Config::from_toml("[source]\napi_key = \"k\"\nplaylist_id = \"p\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn properties_map_legacy_keys() {
        let config = Config::from_properties([
            ("YOUTUBE_API_KEY", "yt"),
            ("SPOTIFY_API_KEY", "sp"),
            ("YOUTUBE_PLAYLIST_ID", "PLx"),
            ("SPOTIFY_PLAYLIST_ID", "37i"),
            ("UNRELATED", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.source.api_key, "yt");
        assert_eq!(config.destination.token, "sp");
        assert_eq!(config.source.playlist_id, "PLx");
        assert_eq!(config.destination.playlist_id, "37i");
    }

    #[test]
    fn properties_missing_key_names_it() {
        let err = Config::from_properties([("YOUTUBE_API_KEY", "yt")]).unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("SPOTIFY_API_KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_reads_properties_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".properties")
            .tempfile()
            .unwrap();
        writeln!(file, "# credentials").unwrap();
        writeln!(file, "YOUTUBE_API_KEY=abc").unwrap();
        writeln!(file, "SPOTIFY_API_KEY=def").unwrap();
        writeln!(file, "YOUTUBE_PLAYLIST_ID=PL1").unwrap();
        writeln!(file, "SPOTIFY_PLAYLIST_ID=sp1").unwrap();
        file.flush().unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.api_key, "abc");
        assert_eq!(config.destination.playlist_id, "sp1");
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "[source]\napi_key = \"a\"\nplaylist_id = \"b\"\n\n[destination]\ntoken = \"c\"\nplaylist_id = \"d\"\n"
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.destination.token, "c");
    }

    #[test]
    fn load_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.properties")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn validate_rejects_blank_credentials_and_zero_sizes() {
        let config = Config::new(" ", "t", "p", "d");
        match config.validate().unwrap_err() {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("source.api_key")),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = Config::new("k", "t", "p", "d");
        config.destination.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new("k", "t", "p", "d");
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
