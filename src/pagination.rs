//! Cursor-driven page collection
//!
//! [`PaginatedCollector`] keeps asking a [`Transport`] for the next page
//! until the response stops carrying a cursor. It never fails: a transport
//! fault, a rejected status or an unparseable body is logged and ends the
//! walk, and whatever was gathered so far is returned.

use crate::decode::{JsonPath, parse_body};
use crate::transport::{RequestDescriptor, Transport};

/// Items gathered by one [`PaginatedCollector::collect`] call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageCollection {
    /// Extracted items across all pages, in page order
    pub items: Vec<String>,
    /// Pages successfully decoded
    pub pages: usize,
    /// False when the walk stopped on a failure instead of the last page
    pub complete: bool,
}

/// Walks a paginated listing endpoint
pub struct PaginatedCollector<'a, T: Transport + ?Sized> {
    transport: &'a T,
    items_path: JsonPath,
    cursor_path: JsonPath,
    cursor_param: String,
}

impl<'a, T: Transport + ?Sized> PaginatedCollector<'a, T> {
    /// Create a collector
    ///
    /// # Arguments
    /// * `transport` - Executes each page request
    /// * `items_path` - Where the items of a page live, e.g. `items[].snippet.title`
    /// * `cursor_path` - Where the next cursor lives, e.g. `nextPageToken`
    /// * `cursor_param` - Query parameter carrying the cursor, e.g. `pageToken`
    pub fn new(
        transport: &'a T,
        items_path: JsonPath,
        cursor_path: JsonPath,
        cursor_param: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            items_path,
            cursor_path,
            cursor_param: cursor_param.into(),
        }
    }

    /// Fetch every page of `endpoint`
    ///
    /// `params` are sent with every request; the cursor parameter is added on
    /// top, empty for the first page. `headers` are attached to each request.
    pub async fn collect(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        headers: &[(String, String)],
    ) -> PageCollection {
        let mut collection = PageCollection::default();
        let mut cursor = String::new();

        loop {
            let built = {
                let mut query: Vec<(&str, &str)> = params
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                query.push((self.cursor_param.as_str(), cursor.as_str()));
                RequestDescriptor::get(endpoint, &query)
            };

            let request = match built {
                Ok(request) => headers
                    .iter()
                    .fold(request, |req, (name, value)| req.header(name, value)),
                Err(e) => {
                    tracing::error!(endpoint, error = %e, "cannot build page request");
                    return collection;
                }
            };

            let response = match self.transport.execute(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        endpoint,
                        page = collection.pages + 1,
                        error = %e,
                        "page request failed"
                    );
                    return collection;
                }
            };

            if !response.is_accepted() {
                tracing::error!(
                    endpoint,
                    page = collection.pages + 1,
                    status = response.status,
                    "page request returned error status"
                );
                return collection;
            }

            let document = match parse_body(&response.body) {
                Ok(document) => document,
                Err(e) => {
                    tracing::error!(
                        endpoint,
                        page = collection.pages + 1,
                        error = %e,
                        "page body is not valid JSON"
                    );
                    return collection;
                }
            };

            let items = self.items_path.scalars(&document);
            collection.pages += 1;
            tracing::debug!(
                page = collection.pages,
                items = items.len(),
                "collected page"
            );
            collection.items.extend(items);

            match self.cursor_path.first_scalar(&document) {
                Some(next) if !next.is_empty() => cursor = next,
                _ => {
                    collection.complete = true;
                    tracing::info!(
                        endpoint,
                        pages = collection.pages,
                        items = collection.items.len(),
                        "pagination finished"
                    );
                    return collection;
                }
            }
        }
    }
}
