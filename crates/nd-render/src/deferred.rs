//! The deferred rendering engine.
//!
//! Content is discovered while it renders: collections reference pages, page
//! bodies mention other pages and embed other collections. The renderer
//! defers everything it discovers into identity-keyed tasks and a pending
//! queue, so each record renders once no matter how many times it is
//! reached, and a link to a page can be resolved before that page's body
//! has been written.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use nd_config::{PagesConfig, SyncConfig, TableConfig};
use nd_notion::{NotionApi, Record};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::debug;

use crate::collection::{self, CollectionResult};
use crate::error::RenderError;
use crate::page;
use crate::properties;
use crate::task::{EntryTask, PageTask, RenderedItem};

/// Maximum number of render actions executed concurrently per batch.
pub const MAX_TASKS_PER_BATCH: usize = 16;

/// A queued render action.
///
/// The queue owns the future itself, not a handle to it: whoever pops the
/// action runs it, and nothing else can, so a task's file is written at
/// most once without any completion flag.
pub(crate) type RenderAction = Pin<Box<dyn Future<Output = Result<(), RenderError>> + Send>>;

type CollectionCell = Arc<OnceCell<Arc<CollectionResult>>>;

/// Mutable renderer state behind one lock.
///
/// The guard is only held across synchronous work (check, parse, insert,
/// push), never across an await, so check-then-insert is atomic.
#[derive(Default)]
struct RenderState {
    /// Page tasks by record identity, in creation order.
    pages: IndexMap<String, Arc<PageTask>>,
    /// Index-eligible table entries, in append order.
    entries: Vec<Arc<EntryTask>>,
    /// Render actions waiting for the next batch.
    queue: VecDeque<RenderAction>,
}

/// Orchestrates one sync run.
pub struct DeferredRenderer {
    pub(crate) api: Arc<dyn NotionApi>,
    pub(crate) config: Arc<SyncConfig>,
    state: Mutex<RenderState>,
    /// Memoized collection renders. Cells are cloned out of the guard and
    /// awaited outside it; concurrent callers for one id share the cell.
    collections: Mutex<HashMap<String, CollectionCell>>,
}

impl DeferredRenderer {
    #[must_use]
    pub fn new(api: Arc<dyn NotionApi>, config: Arc<SyncConfig>) -> Arc<Self> {
        Arc::new(Self {
            api,
            config,
            state: Mutex::new(RenderState::default()),
            collections: Mutex::new(HashMap::new()),
        })
    }

    /// Render a collection, memoized by id.
    ///
    /// The first caller fetches the collection and constructs its member
    /// tasks; concurrent callers for the same id await that computation and
    /// every later caller gets the memoized result without a refetch.
    ///
    /// # Errors
    ///
    /// Propagates fetch and member construction errors.
    pub async fn render_collection(
        self: &Arc<Self>,
        id: &str,
    ) -> Result<Arc<CollectionResult>, RenderError> {
        let cell = {
            let mut collections = self.collections.lock().unwrap();
            Arc::clone(collections.entry(id.to_owned()).or_default())
        };
        cell.get_or_try_init(|| collection::render(self, id))
            .await
            .map(Arc::clone)
    }

    /// Get or create the render task for a record.
    ///
    /// A hit returns the existing task and queues nothing. A miss parses
    /// the record's properties, fixes the destination path, inserts the
    /// task, and pushes exactly one render action onto the pending queue.
    /// Check and insert happen under one guard with only synchronous work
    /// between them, so two callers can never both miss on the same id.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub(crate) fn render_page(
        self: &Arc<Self>,
        record: &Record,
        config: &Arc<PagesConfig>,
    ) -> Result<Arc<PageTask>, RenderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.pages.get(&record.id) {
            return Ok(Arc::clone(task));
        }

        let (task, action) = page::prepare(self, record, config)?;
        let task = Arc::new(task);
        state.pages.insert(record.id.clone(), Arc::clone(&task));
        state.queue.push_back(action);
        debug!(id = %record.id, file = %task.file.display(), "page task queued");
        Ok(task)
    }

    /// Parse a record as a table entry.
    ///
    /// Entries are not deduplicated and write no file; they join the index
    /// only when the collection opts in with `emit_to_index`. The collection
    /// result and the index list share one allocation.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub(crate) fn render_entry(
        &self,
        record: &Record,
        config: &TableConfig,
    ) -> Result<Arc<EntryTask>, RenderError> {
        let properties = properties::parse(record, config.properties.include.as_deref(), None)?;
        let entry = Arc::new(EntryTask {
            id: record.id.clone(),
            properties,
        });
        if config.entries.emit_to_index {
            self.state.lock().unwrap().entries.push(Arc::clone(&entry));
        }
        Ok(entry)
    }

    /// Drain the pending queue until no work remains.
    ///
    /// Actions run in strictly sequential batches: up to
    /// [`MAX_TASKS_PER_BATCH`] are popped and awaited together, and only
    /// after the whole batch settles is the queue checked again. Actions
    /// enqueue more work as they discover it, so the re-check is what makes
    /// the drain complete. The first failing action aborts its batch-mates
    /// and the drain; later batches never start.
    ///
    /// # Errors
    ///
    /// Propagates the first error a render action returns.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub async fn process(&self) -> Result<(), RenderError> {
        loop {
            let batch: Vec<RenderAction> = {
                let mut state = self.state.lock().unwrap();
                let count = state.queue.len().min(MAX_TASKS_PER_BATCH);
                state.queue.drain(..count).collect()
            };
            if batch.is_empty() {
                return Ok(());
            }
            debug!(actions = batch.len(), "processing render batch");

            let mut actions = JoinSet::new();
            for action in batch {
                actions.spawn(action);
            }
            while let Some(joined) = actions.join_next().await {
                joined??;
            }
        }
    }

    /// Project every rendered item for the index artifact: page tasks in
    /// creation order, then entries in append order.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    #[must_use]
    pub fn rendered_items(&self) -> Vec<RenderedItem> {
        let state = self.state.lock().unwrap();
        state
            .pages
            .values()
            .map(|task| RenderedItem::Page(task.rendered()))
            .chain(
                state
                    .entries
                    .iter()
                    .map(|entry| RenderedItem::Entry(entry.rendered())),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use nd_config::CollectionConfig;
    use nd_notion::{
        Block, BlockKind, KnownBlock, KnownProperty, MockNotionApi, NotionApi, Parent,
        PropertyValue, RichTextSpan, TextContent,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(out: &Path) -> Arc<SyncConfig> {
        let toml = r#"
            [sync]
            root_collection = "db-root"
            out_dir = "$OUT/docs"
            index_path = "$OUT/index.json"

            [collections.db-table]
            render_as = "table"
        "#
        .replace("$OUT", out.to_str().unwrap());
        Arc::new(SyncConfig::parse(&toml).unwrap())
    }

    fn record(id: &str, title: &str, collection: &str) -> Record {
        Record {
            id: id.to_owned(),
            url: format!("https://notion.example/{id}"),
            archived: false,
            parent: Parent::DatabaseId {
                database_id: collection.to_owned(),
            },
            properties: IndexMap::from([(
                "Name".to_owned(),
                PropertyValue::Known(KnownProperty::Title {
                    title: vec![RichTextSpan::text(title)],
                }),
            )]),
        }
    }

    fn mention(block_id: &str, target: &str, text: &str) -> Block {
        Block {
            id: block_id.to_owned(),
            has_children: false,
            kind: BlockKind::Known(KnownBlock::Paragraph {
                paragraph: TextContent {
                    rich_text: vec![RichTextSpan::page_mention(target, text)],
                },
            }),
        }
    }

    fn embed(database_id: &str) -> Block {
        Block {
            id: database_id.to_owned(),
            has_children: false,
            kind: BlockKind::Known(KnownBlock::ChildDatabase {
                child_database: nd_notion::ChildDatabaseContent::default(),
            }),
        }
    }

    fn renderer(api: &Arc<MockNotionApi>, out: &Path) -> Arc<DeferredRenderer> {
        DeferredRenderer::new(
            Arc::clone(api) as Arc<dyn NotionApi>,
            config(out),
        )
    }

    #[test]
    fn test_render_page_is_idempotent_per_identity() {
        let out = tempfile::tempdir().unwrap();
        let config = config(out.path());
        let renderer = DeferredRenderer::new(
            Arc::new(MockNotionApi::new()) as Arc<dyn NotionApi>,
            Arc::clone(&config),
        );
        let CollectionConfig::Pages(pages) = config.collection_config("db-root") else {
            panic!("root collection renders as pages");
        };

        let record = record("p-a", "Alpha", "db-root");
        let first = renderer.render_page(&record, &pages).unwrap();
        let second = renderer.render_page(&record, &pages).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(renderer.rendered_items().len(), 1);
    }

    #[test]
    fn test_indexed_entry_is_shared_not_recopied() {
        let toml = r#"
            [sync]
            root_collection = "db-root"
            out_dir = "out/docs"
            index_path = "out/index.json"

            [collections.db-index]
            render_as = "table"
            entries = { emit_to_index = true }
        "#;
        let config = Arc::new(SyncConfig::parse(toml).unwrap());
        let renderer = DeferredRenderer::new(
            Arc::new(MockNotionApi::new()) as Arc<dyn NotionApi>,
            Arc::clone(&config),
        );

        let CollectionConfig::Table(indexed) = config.collection_config("db-index") else {
            panic!("db-index renders as a table");
        };
        let entry = renderer
            .render_entry(&record("r-1", "Build", "db-index"), &indexed)
            .unwrap();
        // The index list holds the same allocation, not a copy.
        assert_eq!(Arc::strong_count(&entry), 2);

        let CollectionConfig::Table(inline) = config.collection_config("db-other") else {
            panic!("unknown collections fall back to table mode");
        };
        let entry = renderer
            .render_entry(&record("r-2", "Ship", "db-other"), &inline)
            .unwrap();
        assert_eq!(Arc::strong_count(&entry), 1);
    }

    #[tokio::test]
    async fn test_mutual_mentions_render_each_page_once() {
        let out = tempfile::tempdir().unwrap();
        let api = Arc::new(
            MockNotionApi::new()
                .with_collection(
                    "db-root",
                    vec![record("p-a", "Alpha", "db-root"), record("p-b", "Beta", "db-root")],
                )
                .with_children("p-a", vec![mention("b-1", "p-b", "Beta")])
                .with_children("p-b", vec![mention("b-2", "p-a", "Alpha")]),
        );
        let renderer = renderer(&api, out.path());

        renderer.render_collection("db-root").await.unwrap();
        renderer.process().await.unwrap();

        // Each page rendered exactly once despite the cycle.
        assert_eq!(api.children_fetches(), 2);
        assert_eq!(renderer.rendered_items().len(), 2);
        let alpha = std::fs::read_to_string(out.path().join("docs/alpha.md")).unwrap();
        let beta = std::fs::read_to_string(out.path().join("docs/beta.md")).unwrap();
        assert!(alpha.contains("[Beta](./beta.md)"));
        assert!(beta.contains("[Alpha](./alpha.md)"));
    }

    #[tokio::test]
    async fn test_mention_chain_terminates_across_batches() {
        // Only Alpha is a collection member; Beta and Gamma enter through
        // mentions, each one batch later than its referrer.
        let out = tempfile::tempdir().unwrap();
        let api = Arc::new(
            MockNotionApi::new()
                .with_collection("db-root", vec![record("p-a", "Alpha", "db-root")])
                .with_record(record("p-b", "Beta", "db-root"))
                .with_record(record("p-c", "Gamma", "db-root"))
                .with_children("p-a", vec![mention("b-1", "p-b", "Beta")])
                .with_children("p-b", vec![mention("b-2", "p-c", "Gamma")]),
        );
        let renderer = renderer(&api, out.path());

        renderer.render_collection("db-root").await.unwrap();
        renderer.process().await.unwrap();

        for file in ["alpha.md", "beta.md", "gamma.md"] {
            assert!(out.path().join("docs").join(file).exists(), "{file} missing");
        }
        assert_eq!(api.record_fetches(), 2);
    }

    #[tokio::test]
    async fn test_embedded_collection_is_queried_once() {
        let out = tempfile::tempdir().unwrap();
        let api = Arc::new(
            MockNotionApi::new()
                .with_collection(
                    "db-root",
                    vec![record("p-a", "Alpha", "db-root"), record("p-b", "Beta", "db-root")],
                )
                .with_collection("db-sub", vec![record("r-1", "Build", "db-sub")])
                .with_children("p-a", vec![embed("db-sub")])
                .with_children("p-b", vec![embed("db-sub")]),
        );
        let renderer = renderer(&api, out.path());

        renderer.render_collection("db-root").await.unwrap();
        renderer.process().await.unwrap();

        // Root plus one shared query for the embedded collection, even
        // though both reference sites rendered concurrently.
        assert_eq!(api.collection_queries(), 2);
        let alpha = std::fs::read_to_string(out.path().join("docs/alpha.md")).unwrap();
        let beta = std::fs::read_to_string(out.path().join("docs/beta.md")).unwrap();
        assert!(alpha.contains("| Build |"));
        assert!(beta.contains("| Build |"));
    }

    #[tokio::test]
    async fn test_queue_larger_than_one_batch_drains_completely() {
        let out = tempfile::tempdir().unwrap();
        let records: Vec<Record> = (0..20)
            .map(|i| record(&format!("p-{i}"), &format!("Page {i}"), "db-root"))
            .collect();
        let api = Arc::new(MockNotionApi::new().with_collection("db-root", records));
        let renderer = renderer(&api, out.path());

        renderer.render_collection("db-root").await.unwrap();
        renderer.process().await.unwrap();

        let items = renderer.rendered_items();
        assert_eq!(items.len(), 20);
        match (&items[0], &items[19]) {
            (RenderedItem::Page(first), RenderedItem::Page(last)) => {
                assert_eq!(first.meta.id, "p-0");
                assert_eq!(last.meta.id, "p-19");
            }
            other => panic!("expected pages, got {other:?}"),
        }
        for i in 0..20 {
            assert!(out.path().join(format!("docs/page-{i}.md")).exists());
        }
    }

    #[tokio::test]
    async fn test_invalid_mention_target_aborts_the_run() {
        let out = tempfile::tempdir().unwrap();
        let api = Arc::new(
            MockNotionApi::new()
                .with_collection("db-root", vec![record("p-a", "Alpha", "db-root")])
                .with_record(record("r-1", "Build", "db-table"))
                .with_children("p-a", vec![mention("b-1", "r-1", "Build")]),
        );
        let renderer = renderer(&api, out.path());

        renderer.render_collection("db-root").await.unwrap();
        let err = renderer.process().await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidMentionTarget { .. }));
    }
}
