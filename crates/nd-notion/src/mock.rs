//! Mock API implementation for testing.
//!
//! Provides [`MockNotionApi`] for unit testing the render pipeline without
//! network access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::api::NotionApi;
use crate::error::NotionError;
use crate::types::{Asset, Block, Record, SortSpec};

/// Mock Notion API for testing.
///
/// Stores records, collection query results, block children, and assets in
/// memory. Use the builder methods to configure the mock with test data;
/// the call counters expose how often each endpoint was hit.
///
/// # Example
///
/// ```ignore
/// use nd_notion::{MockNotionApi, NotionApi};
///
/// let api = MockNotionApi::new()
///     .with_collection("db-1", vec![record_a, record_b])
///     .with_children("page-a", vec![paragraph]);
///
/// let rows = api.query_collection("db-1", &[]).await?;
/// assert_eq!(api.collection_queries(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockNotionApi {
    records: RwLock<HashMap<String, Record>>,
    collections: RwLock<HashMap<String, Vec<Record>>>,
    children: RwLock<HashMap<String, Vec<Block>>>,
    assets: RwLock<HashMap<String, Asset>>,
    record_fetches: AtomicUsize,
    collection_queries: AtomicUsize,
    children_fetches: AtomicUsize,
    asset_fetches: AtomicUsize,
}

impl MockNotionApi {
    /// Create a new empty mock API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record, fetchable by its id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_record(self, record: Record) -> Self {
        self.records
            .write()
            .unwrap()
            .insert(record.id.clone(), record);
        self
    }

    /// Register a collection's query result. Every record also becomes
    /// fetchable by id, mirroring the real API.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_collection(self, id: impl Into<String>, records: Vec<Record>) -> Self {
        {
            let mut by_id = self.records.write().unwrap();
            for record in &records {
                by_id.insert(record.id.clone(), record.clone());
            }
            self.collections.write().unwrap().insert(id.into(), records);
        }
        self
    }

    /// Register the children returned for a block or page id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_children(self, block_id: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.children
            .write()
            .unwrap()
            .insert(block_id.into(), blocks);
        self
    }

    /// Register an asset downloadable from the given URL.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_asset(
        self,
        url: impl Into<String>,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Self {
        self.assets.write().unwrap().insert(
            url.into(),
            Asset {
                bytes,
                content_type: content_type.map(str::to_owned),
            },
        );
        self
    }

    /// Number of `fetch_record` calls.
    pub fn record_fetches(&self) -> usize {
        self.record_fetches.load(Ordering::SeqCst)
    }

    /// Number of `query_collection` calls.
    pub fn collection_queries(&self) -> usize {
        self.collection_queries.load(Ordering::SeqCst)
    }

    /// Number of `fetch_children` calls.
    pub fn children_fetches(&self) -> usize {
        self.children_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_asset` calls.
    pub fn asset_fetches(&self) -> usize {
        self.asset_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotionApi for MockNotionApi {
    async fn fetch_record(&self, id: &str) -> Result<Record, NotionError> {
        self.record_fetches.fetch_add(1, Ordering::SeqCst);
        self.records
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound { id: id.to_owned() })
    }

    async fn query_collection(
        &self,
        id: &str,
        _sorts: &[SortSpec],
    ) -> Result<Vec<Record>, NotionError> {
        self.collection_queries.fetch_add(1, Ordering::SeqCst);
        self.collections
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| NotionError::NotFound { id: id.to_owned() })
    }

    async fn fetch_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        self.children_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .children
            .read()
            .unwrap()
            .get(block_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_asset(&self, url: &str) -> Result<Asset, NotionError> {
        self.asset_fetches.fetch_add(1, Ordering::SeqCst);
        self.assets
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| NotionError::NotFound { id: url.to_owned() })
    }
}
