//! Shared test helpers: a scripted in-memory transport, JSON body builders
//! and a log capture.

use crate::error::Result;
use crate::transport::{RequestDescriptor, ResponseEnvelope, Transport};
use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

/// Transport answering every request through a closure, recording what it saw
pub(crate) struct FnTransport<F> {
    respond: F,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl<F> FnTransport<F>
where
    F: Fn(&RequestDescriptor) -> Result<ResponseEnvelope> + Send + Sync,
{
    pub(crate) fn new(respond: F) -> Self {
        Self {
            respond,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&RequestDescriptor) -> Result<ResponseEnvelope> + Send + Sync,
{
    async fn execute(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope> {
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

/// A playlist items page in the source API's shape
pub(crate) fn page_body(titles: &[String], next: Option<&str>) -> String {
    let items: Vec<_> = titles
        .iter()
        .map(|title| json!({"snippet": {"title": title}}))
        .collect();
    let mut body = json!({ "items": items });
    if let Some(next) = next {
        body["nextPageToken"] = json!(next);
    }
    body.to_string()
}

/// A search response in the destination API's shape
pub(crate) fn search_body(uris: &[&str]) -> String {
    let items: Vec<_> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
    json!({"tracks": {"items": items}}).to_string()
}

/// Formatted log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's events, down to DEBUG, into a buffer until the guard drops
pub(crate) fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
