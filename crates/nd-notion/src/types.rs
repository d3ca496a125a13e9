//! Wire types for the Notion API (version 2022-06-28).
//!
//! Payload unions ([`PropertyValue`], [`BlockKind`], [`SpanKind`]) are closed
//! tagged enums with an explicit catch-all variant, so records carrying
//! property or block types this engine does not render still deserialize and
//! can be surfaced as placeholders instead of failing the whole sync.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A page record as returned by the pages and query endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Record {
    /// Record identity (page UUID).
    pub id: String,
    /// Public URL of the record.
    #[serde(default)]
    pub url: String,
    /// Whether the record has been archived in Notion.
    #[serde(default)]
    pub archived: bool,
    /// Parent container of the record.
    pub parent: Parent,
    /// Property values keyed by display name, in API order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
}

impl Record {
    /// Id of the collection this record belongs to, if its parent is one.
    #[must_use]
    pub fn parent_collection(&self) -> Option<&str> {
        match &self.parent {
            Parent::DatabaseId { database_id } => Some(database_id),
            Parent::PageId { .. } | Parent::Workspace { .. } => None,
        }
    }
}

/// Parent container of a record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    /// The record is a row of a database.
    DatabaseId {
        /// Database id.
        database_id: String,
    },
    /// The record is a subpage of another page.
    PageId {
        /// Parent page id.
        page_id: String,
    },
    /// The record lives at the workspace root.
    Workspace {
        #[serde(default)]
        workspace: bool,
    },
}

/// A property value on a record.
///
/// Types this engine does not parse deserialize into [`PropertyValue::Other`]
/// so the property parser can emit a visible placeholder for them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Known(KnownProperty),
    Other(OtherProperty),
}

/// Property types the engine parses into values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownProperty {
    Title { title: Vec<RichTextSpan> },
    RichText { rich_text: Vec<RichTextSpan> },
    Number { number: Option<f64> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Date { date: Option<DateValue> },
    Relation { relation: Vec<RelationRef> },
    Url { url: Option<String> },
    Email { email: Option<String> },
    PhoneNumber { phone_number: Option<String> },
    CreatedTime { created_time: String },
    LastEditedTime { last_edited_time: String },
}

/// A property of a type the engine does not parse (people, files, formula,
/// rollup, checkbox, ...). Only the type name is retained.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtherProperty {
    #[serde(rename = "type")]
    pub property_type: String,
}

/// A select or multi-select option.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectOption {
    pub name: String,
}

/// A date property value. `end` is set for ranges only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

/// A relation target reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelationRef {
    pub id: String,
}

/// One span of rich text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RichTextSpan {
    /// Unformatted text of the span.
    #[serde(default)]
    pub plain_text: String,
    /// Style annotations applied to the span.
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(flatten)]
    pub kind: SpanKind,
}

impl RichTextSpan {
    /// Plain text span without styling.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            plain_text: content.clone(),
            annotations: Annotations::default(),
            kind: SpanKind::Known(KnownSpan::Text {
                text: TextSpan {
                    content,
                    link: None,
                },
            }),
        }
    }

    /// Text span with the given annotations.
    #[must_use]
    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        let mut span = Self::text(content);
        span.annotations = annotations;
        span
    }

    /// Text span carrying an external link.
    #[must_use]
    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            plain_text: content.clone(),
            annotations: Annotations::default(),
            kind: SpanKind::Known(KnownSpan::Text {
                text: TextSpan {
                    content,
                    link: Some(Link { url: url.into() }),
                },
            }),
        }
    }

    /// Span mentioning another page.
    #[must_use]
    pub fn page_mention(page_id: impl Into<String>, plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
            annotations: Annotations::default(),
            kind: SpanKind::Known(KnownSpan::Mention {
                mention: Mention::Page(PageMention {
                    page: PageRef {
                        id: page_id.into(),
                    },
                }),
            }),
        }
    }
}

/// Span payload union.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SpanKind {
    Known(KnownSpan),
    Other(OtherSpan),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownSpan {
    Text { text: TextSpan },
    Mention { mention: Mention },
    Equation { equation: Equation },
}

/// A span of an unrecognized type; rendered from its plain text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtherSpan {
    #[serde(rename = "type", default)]
    pub span_type: String,
}

/// Literal text content of a span.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextSpan {
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

/// An external link attached to a text span.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Link {
    pub url: String,
}

/// Style annotations of a rich text span.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub color: String,
}

/// A mention inside rich text. Only page mentions resolve to links; all
/// other mention types render as plain text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Mention {
    Page(PageMention),
    Other(OtherMention),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageMention {
    pub page: PageRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtherMention {
    #[serde(rename = "type", default)]
    pub mention_type: String,
}

/// An inline equation span.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Equation {
    pub expression: String,
}

/// A content block as returned by the block children endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Block {
    /// Block id. For `child_database` blocks this is also the database id.
    pub id: String,
    /// Whether the block has nested children.
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Block payload union.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BlockKind {
    Known(KnownBlock),
    Other(OtherBlock),
}

/// Block types the engine renders.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnownBlock {
    Paragraph {
        paragraph: TextContent,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextContent,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextContent,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextContent,
    },
    BulletedListItem {
        bulleted_list_item: TextContent,
    },
    NumberedListItem {
        numbered_list_item: TextContent,
    },
    ToDo {
        to_do: TodoContent,
    },
    Quote {
        quote: TextContent,
    },
    Callout {
        callout: CalloutContent,
    },
    Code {
        code: CodeContent,
    },
    Image {
        image: ImageContent,
    },
    ChildDatabase {
        child_database: ChildDatabaseContent,
    },
    Divider,
    ColumnList,
    Column,
}

/// A block of an unrecognized type; rendered as an HTML comment placeholder.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtherBlock {
    #[serde(rename = "type")]
    pub block_type: String,
}

/// Rich text payload shared by most block types.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TextContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalloutContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

/// Icon attached to a callout block.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: HostedFile },
}

impl Icon {
    /// The emoji character, when the icon is one.
    #[must_use]
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Self::Emoji { emoji } => Some(emoji),
            Self::External { .. } | Self::File { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub language: String,
}

/// Image block payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageContent {
    #[serde(flatten)]
    pub source: FileSource,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

impl ImageContent {
    /// Download URL of the image, regardless of hosting.
    #[must_use]
    pub fn url(&self) -> &str {
        match &self.source {
            FileSource::File { file } => &file.url,
            FileSource::External { external } => &external.url,
        }
    }
}

/// File hosting union used by image blocks and icons.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    /// Notion-hosted file with an expiring signed URL.
    File { file: HostedFile },
    /// Externally hosted file.
    External { external: ExternalFile },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChildDatabaseContent {
    #[serde(default)]
    pub title: String,
}

/// Sort direction for collection queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A property sort applied to a collection query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SortSpec {
    /// Property display name to sort by.
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// One page of a paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// A downloaded binary asset.
#[derive(Debug, Clone)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}
