//! Render task records and their index projections.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::properties::{ParsedProperties, RecordMeta};
use crate::value::Value;

/// A deduplicated page render task.
///
/// One task exists per record identity and is shared immutably: the
/// renderer's task table holds it, and every mention resolving to the page
/// gets the same `Arc`. The async action that writes the file is not part
/// of this struct; the pending queue owns it, so it can run at most once.
#[derive(Debug)]
pub struct PageTask {
    /// Record identity.
    pub id: String,
    /// Destination file, under the parent collection's output directory.
    /// Known at task creation time, which is what makes late link
    /// resolution possible.
    pub file: PathBuf,
    /// Parsed properties of the record.
    pub properties: ParsedProperties,
}

impl PageTask {
    /// Index projection of this task.
    #[must_use]
    pub fn rendered(&self) -> RenderedPage {
        RenderedPage {
            meta: self.properties.meta.clone(),
            file: self.file.clone(),
            properties: normalized(&self.properties),
        }
    }
}

/// An index-only row of a table collection. No file, no render action.
/// Shared between the collection result and the index list behind an `Arc`.
#[derive(Debug)]
pub struct EntryTask {
    /// Record identity.
    pub id: String,
    /// Parsed properties of the record.
    pub properties: ParsedProperties,
}

impl EntryTask {
    /// Index projection of this entry.
    #[must_use]
    pub fn rendered(&self) -> RenderedEntry {
        RenderedEntry {
            meta: self.properties.meta.clone(),
            properties: normalized(&self.properties),
        }
    }
}

/// One item of the JSON index artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedItem {
    Page(RenderedPage),
    Entry(RenderedEntry),
}

/// Index record of a written page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Path of the written markdown file.
    pub file: PathBuf,
    /// Parsed values under their normalized keys.
    pub properties: IndexMap<String, Value>,
}

/// Index record of a table entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedEntry {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Parsed values under their normalized keys.
    pub properties: IndexMap<String, Value>,
}

/// Re-key parsed values by their normalized keys, preserving column order.
fn normalized(properties: &ParsedProperties) -> IndexMap<String, Value> {
    properties
        .keys
        .iter()
        .filter_map(|(name, key)| {
            properties
                .values
                .get(name)
                .map(|value| (key.clone(), value.clone()))
        })
        .collect()
}
