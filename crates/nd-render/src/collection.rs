//! Collection rendering and per-site fragments.

use std::sync::Arc;

use nd_config::{CollectionConfig, PagesConfig, TableConfig};
use tracing::debug;

use crate::deferred::DeferredRenderer;
use crate::error::RenderError;
use crate::link::LinkResolver;
use crate::table;
use crate::task::{EntryTask, PageTask};
use crate::view;

/// The memoized outcome of rendering one collection.
///
/// Fetching and member construction happen once per id per run; the
/// markdown fragment is produced per reference site, because relative links
/// depend on where the fragment lands.
pub struct CollectionResult {
    /// Collection id.
    pub id: String,
    members: CollectionMembers,
}

enum CollectionMembers {
    /// `pages+views` mode: every record got a page task.
    Pages {
        config: Arc<PagesConfig>,
        tasks: Vec<Arc<PageTask>>,
    },
    /// `table` mode: records became index rows, no files.
    Entries {
        config: Arc<TableConfig>,
        entries: Vec<Arc<EntryTask>>,
    },
}

impl CollectionResult {
    /// Markdown fragment for one reference site.
    ///
    /// Pure: no fetching, no new tasks. Pages mode renders the configured
    /// views over the member tasks; table mode renders one table of the
    /// entries unless the config suppresses it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownProperty`] when a view names a
    /// property the members were not parsed with.
    pub(crate) fn fragment(&self, links: &LinkResolver) -> Result<String, RenderError> {
        match &self.members {
            CollectionMembers::Pages { config, tasks } => {
                view::render_views(tasks, &config.views, links)
            }
            CollectionMembers::Entries { config, entries } => {
                if config.render_table {
                    Ok(entry_table(entries))
                } else {
                    Ok(String::new())
                }
            }
        }
    }
}

/// Fetch a collection and construct its member tasks, in query order.
///
/// Runs at most once per id per run; [`DeferredRenderer::render_collection`]
/// memoizes the result.
pub(crate) async fn render(
    renderer: &Arc<DeferredRenderer>,
    id: &str,
) -> Result<Arc<CollectionResult>, RenderError> {
    let config = renderer.config.collection_config(id);
    let records = renderer.api.query_collection(id, config.sorts()).await?;
    debug!(collection = %id, records = records.len(), "collection fetched");

    let members = match config {
        CollectionConfig::Pages(config) => {
            let mut tasks = Vec::with_capacity(records.len());
            for record in &records {
                tasks.push(renderer.render_page(record, &config)?);
            }
            CollectionMembers::Pages { config, tasks }
        }
        CollectionConfig::Table(config) => {
            let mut entries = Vec::with_capacity(records.len());
            for record in &records {
                entries.push(renderer.render_entry(record, &config)?);
            }
            CollectionMembers::Entries { config, entries }
        }
    };

    Ok(Arc::new(CollectionResult {
        id: id.to_owned(),
        members,
    }))
}

fn entry_table(entries: &[Arc<EntryTask>]) -> String {
    let Some(first) = entries.first() else {
        return table::EMPTY_COLLECTION.to_owned();
    };
    let headers: Vec<String> = first.properties.keys.keys().cloned().collect();
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            headers
                .iter()
                .map(|name| {
                    entry
                        .properties
                        .values
                        .get(name)
                        .map_or_else(String::new, |value| table::escape_cell(&value.to_cell()))
                })
                .collect()
        })
        .collect();
    let table = table::markdown_table(&headers, &rows);
    table.strip_suffix('\n').unwrap_or(&table).to_owned()
}
