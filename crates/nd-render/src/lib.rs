//! Deferred Notion-to-Markdown render engine.
//!
//! This crate turns a Notion content graph (collections, pages, blocks) into
//! a tree of markdown files plus a JSON index describing everything written.
//!
//! # Architecture
//!
//! Rendering is split into two phases coordinated by [`DeferredRenderer`]:
//!
//! - **Preparation** registers a page under its target path and enqueues a
//!   boxed render action. Registration is synchronous and keyed by page id,
//!   so a page reachable from several places (views, mentions, child
//!   databases) is rendered exactly once at a stable path.
//! - **Processing** drains the queue in sequential batches of
//!   [`MAX_TASKS_PER_BATCH`] concurrent actions. Actions discovered while a
//!   batch runs (mentions resolve to pages, child databases pull in whole
//!   collections) land in the queue and are picked up by a later batch.
//!
//! Collection fetches are memoized, so the per-page portion of a collection
//! render (queries, child pages) happens once no matter how many pages
//! include it.
//!
//! The typical entry point is [`sync`], which seeds the root page from a
//! [`nd_config::SyncConfig`], drives the queue to exhaustion and writes the
//! index file.

mod assets;
mod block;
mod body;
mod collection;
mod context;
mod deferred;
mod error;
pub mod frontmatter;
mod link;
mod mention;
mod page;
mod properties;
pub mod richtext;
mod sync;
mod table;
mod task;
mod value;
mod view;

pub use collection::CollectionResult;
pub use deferred::{DeferredRenderer, MAX_TASKS_PER_BATCH};
pub use error::RenderError;
pub use link::LinkResolver;
pub use properties::{ParsedProperties, RecordMeta};
pub use sync::{SyncReport, sync};
pub use task::{EntryTask, PageTask, RenderedEntry, RenderedItem, RenderedPage};
pub use value::{DateRange, Value};
