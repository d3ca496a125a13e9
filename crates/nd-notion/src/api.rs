//! The [`NotionApi`] trait.

use async_trait::async_trait;

use crate::error::NotionError;
use crate::types::{Asset, Block, Record, SortSpec};

/// Read-only Notion API surface consumed by the render engine.
///
/// Implementations must perform full cursor-following pagination: callers
/// receive complete result sets, never a truncated first page.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Fetch a single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`NotionError::NotFound`] when the record does not exist or
    /// is not shared with the integration.
    async fn fetch_record(&self, id: &str) -> Result<Record, NotionError>;

    /// Query all records of a collection, sorted by `sorts`.
    async fn query_collection(
        &self,
        id: &str,
        sorts: &[SortSpec],
    ) -> Result<Vec<Record>, NotionError>;

    /// Fetch all direct children of a block (or of a page, whose id doubles
    /// as its root block id).
    async fn fetch_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError>;

    /// Download a binary asset from a (possibly signed) URL.
    async fn fetch_asset(&self, url: &str) -> Result<Asset, NotionError>;
}
