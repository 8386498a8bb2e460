//! Migration driver: source titles -> destination URIs -> batched writes
//!
//! The run is linear. Every title is searched one after another, and each
//! batch is written only after the previous write returned. Failures never
//! stop the run:
//! - a failing source page truncates the title list
//! - a failing or empty search drops that title
//! - a failing write is reported and the next batch is still sent

use crate::chunk::chunk;
use crate::config::Config;
use crate::destination::PlaylistDestination;
use crate::source::PlaylistSource;
use crate::transport::Transport;
use serde::Serialize;
use std::collections::HashSet;

/// Counters describing one migration run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Titles read from the source playlist
    pub titles_found: usize,
    /// Whether the source listing reached its last page
    pub source_complete: bool,
    /// Titles searched on the destination (fewer than found when de-duplicating)
    pub titles_searched: usize,
    /// Titles that resolved to a destination track
    pub resolved: usize,
    /// Titles whose search returned no match
    pub unmatched: usize,
    /// Titles whose search failed (transport, status or body errors)
    pub lookup_failures: usize,
    /// Write batches accepted by the destination
    pub batches_submitted: usize,
    /// Write batches the destination rejected or that never got a response
    pub batches_failed: usize,
}

/// One source-to-destination migration
pub struct Migration<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a Config,
}

impl<'a, T: Transport + ?Sized> Migration<'a, T> {
    /// Create a migration that sends every request through `transport`
    pub fn new(transport: &'a T, config: &'a Config) -> Self {
        Self { transport, config }
    }

    /// Run all stages and report what happened
    pub async fn run(&self) -> MigrationReport {
        let mut report = MigrationReport::default();

        let collection = PlaylistSource::new(self.transport, &self.config.source)
            .fetch_titles()
            .await;
        report.titles_found = collection.items.len();
        report.source_complete = collection.complete;
        if !collection.complete {
            tracing::warn!(
                titles = report.titles_found,
                "source listing incomplete, continuing with titles read so far"
            );
        }

        let titles = if self.config.skip_duplicate_titles {
            distinct(collection.items)
        } else {
            collection.items
        };
        report.titles_searched = titles.len();

        let uris = self.resolve_titles(&titles, &mut report).await;
        self.submit(&uris, &mut report).await;

        tracing::info!(
            titles = report.titles_found,
            resolved = report.resolved,
            unmatched = report.unmatched,
            lookup_failures = report.lookup_failures,
            batches_submitted = report.batches_submitted,
            batches_failed = report.batches_failed,
            "migration finished"
        );
        report
    }

    /// Search every title, keeping the URIs that resolved, in title order
    async fn resolve_titles(&self, titles: &[String], report: &mut MigrationReport) -> Vec<String> {
        let destination = PlaylistDestination::new(self.transport, &self.config.destination);
        let mut uris = Vec::with_capacity(titles.len());

        for (position, title) in titles.iter().enumerate() {
            match destination.search_track(title).await {
                Ok(Some(uri)) => {
                    report.resolved += 1;
                    uris.push(uri);
                }
                Ok(None) => report.unmatched += 1,
                Err(e) => {
                    report.lookup_failures += 1;
                    tracing::warn!(title = %title, error = %e, "search failed, skipping title");
                }
            }

            if (position + 1) % 25 == 0 {
                tracing::info!(
                    searched = position + 1,
                    total = titles.len(),
                    resolved = report.resolved,
                    "search progress"
                );
            }
        }

        uris
    }

    /// Write the URIs in batches of the configured size
    async fn submit(&self, uris: &[String], report: &mut MigrationReport) {
        let destination = PlaylistDestination::new(self.transport, &self.config.destination);
        let batches = chunk(uris, self.config.destination.batch_size);
        let total = batches.len();

        for (index, batch) in batches.iter().enumerate() {
            match destination.add_tracks(batch).await {
                Ok(_) => report.batches_submitted += 1,
                Err(e) => {
                    report.batches_failed += 1;
                    tracing::error!(
                        batch = index + 1,
                        total,
                        error = %e,
                        "failed to add batch, continuing with next"
                    );
                }
            }
        }
    }
}

/// Drop repeated titles, keeping the first occurrence
fn distinct(titles: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|title| seen.insert(title.clone()))
        .collect()
}
