//! Page mention resolution.
//!
//! This is the single place where a not-found from the API is recovered
//! instead of propagated: a dangling mention degrades to a placeholder,
//! everything else about the run stays intact.

use std::sync::Arc;

use nd_config::CollectionConfig;
use nd_notion::NotionError;
use tracing::warn;

use crate::deferred::DeferredRenderer;
use crate::error::RenderError;
use crate::task::PageTask;

/// Resolve a mentioned page to its render task, creating (and queueing)
/// the task if this is the first reference to the page.
///
/// Returns `Ok(None)` when the mentioned record does not exist; the caller
/// renders a placeholder. A record that exists but can never have its own
/// file is a configuration problem and fails the run.
///
/// # Errors
///
/// Returns [`RenderError::InvalidMentionTarget`] when the record has no
/// parent collection or its parent collection renders as a table; other
/// fetch and parse errors propagate.
pub(crate) async fn resolve_page(
    renderer: &Arc<DeferredRenderer>,
    id: &str,
    text: &str,
) -> Result<Option<Arc<PageTask>>, RenderError> {
    let record = match renderer.api.fetch_record(id).await {
        Ok(record) => record,
        Err(NotionError::NotFound { .. }) => {
            warn!(id = %id, text = %text, "mentioned page not found, left unresolved");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let Some(collection_id) = record.parent_collection() else {
        return Err(RenderError::InvalidMentionTarget {
            text: text.to_owned(),
            id: id.to_owned(),
            reason: "record is not part of a collection".to_owned(),
        });
    };

    match renderer.config.collection_config(collection_id) {
        CollectionConfig::Pages(config) => Ok(Some(renderer.render_page(&record, &config)?)),
        CollectionConfig::Table(_) => Err(RenderError::InvalidMentionTarget {
            text: text.to_owned(),
            id: id.to_owned(),
            reason: "parent collection renders as a table".to_owned(),
        }),
    }
}
