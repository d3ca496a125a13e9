//! Sync driver: seed the root collection, drain the queue, write the index.

use std::path::Path;
use std::sync::Arc;

use nd_config::SyncConfig;
use nd_notion::NotionApi;
use tracing::info;

use crate::deferred::DeferredRenderer;
use crate::error::RenderError;
use crate::task::RenderedItem;

/// Outcome of a completed sync run.
#[derive(Debug)]
pub struct SyncReport {
    /// Every indexed item: pages in creation order, then table entries in
    /// append order.
    pub items: Vec<RenderedItem>,
}

impl SyncReport {
    /// Number of pages written.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, RenderedItem::Page(_)))
            .count()
    }

    /// Number of table entries indexed.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.items.len() - self.pages()
    }
}

/// Run one full sync.
///
/// Renders the root collection, processes every deferred task the traversal
/// discovers, and writes the JSON index artifact.
///
/// # Errors
///
/// Propagates the first fatal [`RenderError`]. On error the index artifact
/// is not written.
pub async fn sync(
    api: Arc<dyn NotionApi>,
    config: Arc<SyncConfig>,
) -> Result<SyncReport, RenderError> {
    let renderer = DeferredRenderer::new(api, Arc::clone(&config));
    renderer.render_collection(&config.root_collection).await?;
    renderer.process().await?;

    let items = renderer.rendered_items();
    write_index(&config.index_path, &items).await?;
    Ok(SyncReport { items })
}

async fn write_index(path: &Path, items: &[RenderedItem]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(items)?).await?;
    info!(path = %path.display(), items = items.len(), "index written");
    Ok(())
}
