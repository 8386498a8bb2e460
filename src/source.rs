//! Source playlist reader (YouTube Data API `playlistItems`)

use crate::config::SourceConfig;
use crate::decode::JsonPath;
use crate::pagination::{PageCollection, PaginatedCollector};
use crate::transport::Transport;

/// Reads track titles from the source playlist
pub struct PlaylistSource<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a SourceConfig,
}

impl<'a, T: Transport + ?Sized> PlaylistSource<'a, T> {
    /// Create a reader over `transport`
    pub fn new(transport: &'a T, config: &'a SourceConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch every title in the playlist, in playlist order
    ///
    /// Duplicates are kept. A failing page ends the listing early; the
    /// returned collection says whether it reached the last page.
    pub async fn fetch_titles(&self) -> PageCollection {
        let collector = PaginatedCollector::new(
            self.transport,
            JsonPath::root().key("items").each().key("snippet").key("title"),
            JsonPath::root().key("nextPageToken"),
            "pageToken",
        );

        let params = [
            ("part", "snippet".to_string()),
            ("key", self.config.api_key.clone()),
            ("playlistId", self.config.playlist_id.clone()),
            ("maxResults", self.config.page_size.to_string()),
        ]
        .map(|(name, value)| (name.to_string(), value));

        tracing::info!(playlist_id = %self.config.playlist_id, "reading source playlist");
        collector.collect(&self.config.endpoint, &params, &[]).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{FnTransport, page_body};
    use crate::transport::ResponseEnvelope;

    #[tokio::test]
    async fn sends_source_query_and_collects_titles() {
        let config = Config::new("yt-key", "token", "PL42", "sp1");
        let transport = FnTransport::new(|request| {
            let body = match request.query_param("pageToken").as_deref() {
                Some("") => page_body(&["Intro".to_string(), "Song A".to_string()], Some("next")),
                _ => page_body(&["Song A".to_string()], None),
            };
            Ok(ResponseEnvelope::new(200, body))
        });

        let collection = PlaylistSource::new(&transport, &config.source)
            .fetch_titles()
            .await;

        assert_eq!(collection.items, vec!["Intro", "Song A", "Song A"]);
        assert!(collection.complete);

        let first = &transport.requests()[0];
        assert_eq!(first.url().host_str(), Some("www.googleapis.com"));
        assert_eq!(first.url().path(), "/youtube/v3/playlistItems");
        assert_eq!(first.query_param("part").as_deref(), Some("snippet"));
        assert_eq!(first.query_param("key").as_deref(), Some("yt-key"));
        assert_eq!(first.query_param("playlistId").as_deref(), Some("PL42"));
        assert_eq!(first.query_param("maxResults").as_deref(), Some("50"));
        assert_eq!(first.query_param("pageToken").as_deref(), Some(""));
        assert!(first.headers().is_empty());
    }
}
