use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::DestinationConfig;
use crate::error::{IndexerError, Result};

/// Destination seam for bulk document submission.
///
/// A sink receives one serialized batch at a time and writes it to a named
/// collection as a single bulk operation. `close` must be called once at the
/// end of a run to release the destination connection.
#[async_trait]
pub trait BulkSink: Send + Sync {
    async fn submit(&self, collection: &str, documents: &[String]) -> Result<()>;
    async fn close(&self) -> Result<()>;
}

/// Bulk submitter against an Elasticsearch-compatible `_bulk` endpoint.
pub struct EsBulkSink {
    client: reqwest::Client,
    bulk_url: String,
}

impl EsBulkSink {
    pub fn new(destination: &DestinationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bulk_url: format!("{}/_bulk", destination.base_url()),
        }
    }
}

/// One action line plus one document line per record, newline-terminated.
fn render_bulk_body(collection: &str, documents: &[String]) -> String {
    let action = format!("{{\"index\":{{\"_index\":\"{collection}\"}}}}\n");
    let mut body = String::with_capacity(
        documents.iter().map(|d| d.len() + action.len() + 1).sum(),
    );
    for document in documents {
        body.push_str(&action);
        body.push_str(document);
        body.push('\n');
    }
    body
}

/// The bulk response carries `errors: true` when any single document was
/// rejected, with per-item statuses; whole-batch success must not be assumed.
fn check_bulk_response(body: &serde_json::Value, submitted: usize) -> Result<()> {
    let errors = body
        .get("errors")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !errors {
        return Ok(());
    }

    let rejected = body
        .get("items")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter(|item| {
                    item.as_object()
                        .and_then(|ops| ops.values().next())
                        .map(|op| op.get("error").is_some())
                        .unwrap_or(false)
                })
                .count()
        })
        .unwrap_or(submitted);

    Err(IndexerError::Submission(format!(
        "{rejected} of {submitted} documents rejected by the destination"
    )))
}

#[async_trait]
impl BulkSink for EsBulkSink {
    async fn submit(&self, collection: &str, documents: &[String]) -> Result<()> {
        let body = render_bulk_body(collection, documents);
        let response = self
            .client
            .post(&self.bulk_url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IndexerError::Submission(format!(
                "destination returned {status}: {detail}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        check_bulk_response(&body, documents.len())
    }

    async fn close(&self) -> Result<()> {
        // reqwest releases its connection pool on drop; nothing to flush.
        debug!("Closing destination connection to {}", self.bulk_url);
        Ok(())
    }
}

/// In-memory sink implementation for development/testing.
#[derive(Default)]
pub struct MemorySink {
    batches: Mutex<Vec<(String, Vec<String>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submitted batch, in submission order.
    pub fn batches(&self) -> Vec<(String, Vec<String>)> {
        self.batches.lock().unwrap().clone()
    }

    /// All documents submitted to one collection, flattened in order.
    pub fn documents(&self, collection: &str) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .flat_map(|(_, docs)| docs.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl BulkSink for MemorySink {
    async fn submit(&self, collection: &str, documents: &[String]) -> Result<()> {
        let mut batches = self.batches.lock().unwrap();
        batches.push((collection.to_string(), documents.to_vec()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
