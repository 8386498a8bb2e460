//! Common test utilities for playlist-bridge integration tests

use playlist_bridge::{Config, RetryConfig};
use serde_json::json;
use std::time::Duration;

/// Config pointing both APIs at a mock server, with millisecond backoff
pub fn mock_config(server_uri: &str, batch_size: usize) -> Config {
    let mut config = Config::new("yt-key", "sp-token", "PLsource", "destlist");
    config.source.endpoint = format!("{}/youtube/v3/playlistItems", server_uri);
    config.destination.api_base = format!("{}/v1", server_uri);
    config.destination.batch_size = batch_size;
    config.retry = RetryConfig {
        max_attempts: 10,
        retry_after_unit: Duration::from_millis(1),
        safety_margin: Duration::from_millis(1),
        request_timeout: Duration::from_secs(5),
    };
    config
}

/// A playlist items page
pub fn page(titles: &[&str], next: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = titles
        .iter()
        .map(|title| json!({"kind": "youtube#playlistItem", "snippet": {"title": title}}))
        .collect();
    let mut body = json!({"kind": "youtube#playlistItemListResponse", "items": items});
    if let Some(next) = next {
        body["nextPageToken"] = json!(next);
    }
    body
}

/// A track search result
pub fn search_result(uris: &[&str]) -> serde_json::Value {
    let items: Vec<_> = uris.iter().map(|uri| json!({"uri": uri})).collect();
    json!({"tracks": {"href": "https://api.example/v1/search", "items": items}})
}
