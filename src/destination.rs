//! Destination playlist client (Spotify Web API search + playlist tracks)

use crate::config::DestinationConfig;
use crate::decode::{JsonPath, extract};
use crate::error::Result;
use crate::transport::{RequestDescriptor, ResponseEnvelope, Transport};

/// Searches tracks and appends them to the destination playlist
pub struct PlaylistDestination<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a DestinationConfig,
}

impl<'a, T: Transport + ?Sized> PlaylistDestination<'a, T> {
    /// Create a client over `transport`
    pub fn new(transport: &'a T, config: &'a DestinationConfig) -> Self {
        Self { transport, config }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Resolve a free-text title to the URI of the first matching track
    ///
    /// `Ok(None)` means the search ran and found nothing.
    ///
    /// # Errors
    /// Returns error if the request fails, the status is not 200/201, or the
    /// body is not JSON
    pub async fn search_track(&self, title: &str) -> Result<Option<String>> {
        let request = RequestDescriptor::get(
            &self.api_url("search"),
            &[("q", title), ("type", "track")],
        )?
        .bearer(&self.config.token);

        let response = self.transport.execute(&request).await?;
        let response = response.error_for_status(&request)?;

        let uri = extract(
            &response.body,
            &JsonPath::root().key("tracks").key("items").index(0).key("uri"),
        )?;

        match &uri {
            Some(uri) => tracing::debug!(title, uri = %uri, "track resolved"),
            None => tracing::info!(title, "no destination match"),
        }
        Ok(uri)
    }

    /// Append one comma-joined batch of track URIs to the playlist
    ///
    /// # Errors
    /// Returns error if the request fails or the status is not 200/201
    pub async fn add_tracks(&self, batch: &str) -> Result<ResponseEnvelope> {
        let endpoint = self.api_url(&format!("playlists/{}/tracks", self.config.playlist_id));
        let request = RequestDescriptor::post(&endpoint, &[("uris", batch)])?
            .bearer(&self.config.token)
            .header("Content-Type", "application/json")
            .body("{}");

        let response = self.transport.execute(&request).await?;
        let response = response.error_for_status(&request)?;

        tracing::info!(
            playlist_id = %self.config.playlist_id,
            response = %response.text(),
            "batch added to destination playlist"
        );
        Ok(response)
    }
}
