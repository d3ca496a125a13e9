//! Notion API surface for the notedown sync engine.
//!
//! This crate provides a [`NotionApi`] trait for abstracting record, block,
//! and asset retrieval from the underlying transport. This enables:
//!
//! - **Unit testing** the render pipeline without network access
//! - **Full pagination** handled in one place (callers never see cursors)
//! - **Typed errors** with a distinguished not-found kind for recoverable
//!   dangling references
//!
//! # Architecture
//!
//! The crate provides:
//! - [`NotionApi`] trait with async fetch and query methods
//! - [`NotionClient`] implementation over `ureq` with retry and backoff
//! - [`MockNotionApi`] for testing (behind `mock` feature flag)

mod api;
mod client;
mod error;
#[cfg(feature = "mock")]
mod mock;
mod types;

pub use api::NotionApi;
pub use client::{NotionClient, RequestStats};
pub use error::NotionError;
#[cfg(feature = "mock")]
pub use mock::MockNotionApi;
pub use types::{
    Annotations, Asset, Block, BlockKind, CalloutContent, ChildDatabaseContent, CodeContent,
    DateValue, Equation, ExternalFile, FileSource, HostedFile, Icon, ImageContent, KnownBlock,
    KnownProperty, KnownSpan, Link, Mention, OtherBlock, OtherMention, OtherProperty, OtherSpan,
    PageMention, PageRef, Paginated, Parent, PropertyValue, Record, RelationRef, RichTextSpan,
    SelectOption, SortDirection, SortSpec, SpanKind, TextContent, TextSpan, TodoContent,
};
