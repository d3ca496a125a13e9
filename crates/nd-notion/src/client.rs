//! HTTP client for the Notion REST API.
//!
//! Sync `ureq` transport bridged into async via [`tokio::task::spawn_blocking`];
//! the client is cheap to clone, so each blocking task gets its own handle.
//! Rate-limit and gateway errors are retried with a linear backoff before
//! surfacing as typed [`NotionError`] values.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;

use crate::api::NotionApi;
use crate::error::NotionError;
use crate::types::{Asset, Block, Paginated, Record, SortSpec};

/// Public Notion API endpoint.
const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Pinned API version sent with every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Attempts per request before giving up on retriable errors.
const MAX_ATTEMPTS: u32 = 3;

/// Page size for paginated endpoints (the API maximum).
const PAGE_SIZE: u32 = 100;

/// Upper bound for downloaded asset bodies.
const ASSET_SIZE_LIMIT: u64 = 50 * 1024 * 1024;

/// Per-run request counters, shared across client clones.
#[derive(Debug, Default)]
pub struct RequestStats {
    requests: AtomicU64,
    retries: AtomicU64,
}

impl RequestStats {
    /// Total HTTP requests sent, retries included.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Requests that were retried after a retriable failure.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

/// Notion REST API client.
#[derive(Clone)]
pub struct NotionClient {
    agent: Agent,
    token: String,
    base_url: String,
    stats: Arc<RequestStats>,
}

impl NotionClient {
    /// Create a client for the public Notion API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, NOTION_API_URL)
    }

    /// Create a client against a custom endpoint (used by tests and proxies).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        let base_url: String = base_url.into();

        Self {
            agent,
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            stats: Arc::default(),
        }
    }

    /// Shared request counters for end-of-run reporting.
    #[must_use]
    pub fn stats(&self) -> Arc<RequestStats> {
        Arc::clone(&self.stats)
    }

    /// Send a request, retrying retriable statuses with a linear backoff.
    ///
    /// `object_id` is the id (or URL) the request is about, used to produce
    /// [`NotionError::NotFound`] without parsing it back out of the response.
    fn request<F>(
        &self,
        object_id: &str,
        send: F,
    ) -> Result<ureq::http::Response<ureq::Body>, NotionError>
    where
        F: Fn(&Agent) -> Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.stats.requests.fetch_add(1, Ordering::Relaxed);

            let response = send(&self.agent)?;
            let status = response.status().as_u16();
            if status < 400 {
                return Ok(response);
            }

            let mut body_reader = response.into_body();
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());

            if attempt < MAX_ATTEMPTS && is_retriable(status) {
                self.stats.retries.fetch_add(1, Ordering::Relaxed);
                warn!(status, attempt, "retrying notion request");
                std::thread::sleep(Duration::from_secs(1) * attempt);
                continue;
            }

            return Err(api_error(status, &body, object_id, attempt));
        }
    }

    fn get(
        &self,
        object_id: &str,
        url: &str,
    ) -> Result<ureq::http::Response<ureq::Body>, NotionError> {
        self.request(object_id, |agent| {
            agent
                .get(url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Notion-Version", NOTION_VERSION)
                .call()
        })
    }

    fn post(
        &self,
        object_id: &str,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ureq::http::Response<ureq::Body>, NotionError> {
        self.request(object_id, |agent| {
            agent
                .post(url)
                .header("Authorization", &format!("Bearer {}", self.token))
                .header("Notion-Version", NOTION_VERSION)
                .send_json(body)
        })
    }

    fn fetch_record_blocking(&self, id: &str) -> Result<Record, NotionError> {
        let url = format!("{}/pages/{id}", self.base_url);
        let response = self.get(id, &url)?;
        let mut body_reader = response.into_body();
        Ok(body_reader.read_json()?)
    }

    fn query_collection_blocking(
        &self,
        id: &str,
        sorts: &[SortSpec],
    ) -> Result<Vec<Record>, NotionError> {
        let url = format!("{}/databases/{id}/query", self.base_url);
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({ "page_size": PAGE_SIZE });
            if !sorts.is_empty() {
                body["sorts"] = serde_json::to_value(sorts)?;
            }
            if let Some(c) = &cursor {
                body["start_cursor"] = serde_json::Value::String(c.clone());
            }

            let response = self.post(id, &url, &body)?;
            let mut body_reader = response.into_body();
            let page: Paginated<Record> = body_reader.read_json()?;
            records.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        debug!(collection = %id, records = records.len(), "queried collection");
        Ok(records)
    }

    fn fetch_children_blocking(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = match &cursor {
                Some(c) => format!(
                    "{}/blocks/{block_id}/children?page_size={PAGE_SIZE}&start_cursor={c}",
                    self.base_url
                ),
                None => format!(
                    "{}/blocks/{block_id}/children?page_size={PAGE_SIZE}",
                    self.base_url
                ),
            };

            let response = self.get(block_id, &url)?;
            let mut body_reader = response.into_body();
            let page: Paginated<Block> = body_reader.read_json()?;
            blocks.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }

    /// Asset URLs are pre-signed; no auth headers are attached.
    fn fetch_asset_blocking(&self, url: &str) -> Result<Asset, NotionError> {
        let response = self.request(url, |agent| agent.get(url).call())?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned());
        let bytes = response
            .into_body()
            .with_config()
            .limit(ASSET_SIZE_LIMIT)
            .read_to_vec()?;

        debug!(url = %url, bytes = bytes.len(), "downloaded asset");
        Ok(Asset {
            bytes,
            content_type,
        })
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn fetch_record(&self, id: &str) -> Result<Record, NotionError> {
        let client = self.clone();
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || client.fetch_record_blocking(&id)).await?
    }

    async fn query_collection(
        &self,
        id: &str,
        sorts: &[SortSpec],
    ) -> Result<Vec<Record>, NotionError> {
        let client = self.clone();
        let id = id.to_owned();
        let sorts = sorts.to_vec();
        tokio::task::spawn_blocking(move || client.query_collection_blocking(&id, &sorts)).await?
    }

    async fn fetch_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        let client = self.clone();
        let block_id = block_id.to_owned();
        tokio::task::spawn_blocking(move || client.fetch_children_blocking(&block_id)).await?
    }

    async fn fetch_asset(&self, url: &str) -> Result<Asset, NotionError> {
        let client = self.clone();
        let url = url.to_owned();
        tokio::task::spawn_blocking(move || client.fetch_asset_blocking(&url)).await?
    }
}

/// Error shape of Notion API error responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn is_retriable(status: u16) -> bool {
    matches!(status, 429 | 502 | 503)
}

/// Map an error status and body into a typed [`NotionError`].
fn api_error(status: u16, body: &str, object_id: &str, attempts: u32) -> NotionError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == 404 || parsed.code == "object_not_found" {
        return NotionError::NotFound {
            id: object_id.to_owned(),
        };
    }
    if status == 429 {
        return NotionError::RateLimited { attempts };
    }

    NotionError::Api {
        status,
        code: if parsed.code.is_empty() {
            format!("http_{status}")
        } else {
            parsed.code
        },
        message: if parsed.message.is_empty() {
            body.to_owned()
        } else {
            parsed.message
        },
    }
}
