//! Configuration for the notedown sync engine.
//!
//! Parses `notedown.toml` files with serde. A config names the root
//! collection, the output locations, and an optional render config per
//! collection id. Collections without an explicit entry get a synthesized
//! fallback: the root collection renders as `pages+views` into the sync
//! output directory, every other collection renders as an inline `table`.
//!
//! The last shape of the config format is authoritative; there is no
//! compatibility layer for earlier layouts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use nd_notion::SortSpec;
use serde::Deserialize;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Resolved sync configuration.
#[derive(Debug)]
pub struct SyncConfig {
    /// Id of the root collection that seeds the sync.
    pub root_collection: String,
    /// Output directory for pages of collections without an explicit config.
    pub out_dir: PathBuf,
    /// Path of the JSON index artifact.
    pub index_path: PathBuf,
    collections: HashMap<String, CollectionConfig>,
    fallback_pages: CollectionConfig,
    fallback_table: CollectionConfig,
}

impl SyncConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Parse`] on malformed TOML, and
    /// [`ConfigError::Validation`] if required fields are empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let config = Self::resolve(file);
        config.validate()?;
        Ok(config)
    }

    fn resolve(file: ConfigFile) -> Self {
        let collections = file
            .collections
            .into_iter()
            .map(|(id, raw)| {
                let config = match raw {
                    RawCollectionConfig::Pages(pages) => CollectionConfig::Pages(Arc::new(pages)),
                    RawCollectionConfig::Table(table) => CollectionConfig::Table(Arc::new(table)),
                };
                (id, config)
            })
            .collect();

        let fallback_pages = CollectionConfig::Pages(Arc::new(PagesConfig {
            out_dir: file.sync.out_dir.clone(),
            frontmatter: FrontmatterConfig::default(),
            views: Vec::new(),
            properties: PropertySelection::default(),
            sorts: Vec::new(),
        }));
        let fallback_table = CollectionConfig::Table(Arc::new(TableConfig::default()));

        Self {
            root_collection: file.sync.root_collection,
            out_dir: file.sync.out_dir,
            index_path: file.sync.index_path,
            collections,
            fallback_pages,
            fallback_table,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.root_collection, "sync.root_collection")?;
        require_non_empty_path(&self.out_dir, "sync.out_dir")?;
        require_non_empty_path(&self.index_path, "sync.index_path")?;

        for (id, config) in &self.collections {
            if let CollectionConfig::Pages(pages) = config {
                require_non_empty_path(&pages.out_dir, &format!("collections.{id}.out_dir"))?;
            }
        }
        Ok(())
    }

    /// Render configuration for a collection id.
    ///
    /// Collections without an explicit entry fall back to `pages+views` for
    /// the root collection and to an inline `table` for everything else.
    #[must_use]
    pub fn collection_config(&self, id: &str) -> CollectionConfig {
        if let Some(config) = self.collections.get(id) {
            return config.clone();
        }
        if id == self.root_collection {
            self.fallback_pages.clone()
        } else {
            self.fallback_table.clone()
        }
    }
}

/// Render configuration of one collection.
#[derive(Debug, Clone)]
pub enum CollectionConfig {
    /// Every record becomes its own page; reference sites embed the
    /// configured views.
    Pages(Arc<PagesConfig>),
    /// Records render as rows of an inline markdown table.
    Table(Arc<TableConfig>),
}

impl CollectionConfig {
    /// Sorts applied when querying the collection.
    #[must_use]
    pub fn sorts(&self) -> &[SortSpec] {
        match self {
            Self::Pages(pages) => &pages.sorts,
            Self::Table(table) => &table.sorts,
        }
    }
}

/// Configuration of a `pages+views` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesConfig {
    /// Directory the collection's pages are written to.
    pub out_dir: PathBuf,
    /// Frontmatter composition settings.
    #[serde(default)]
    pub frontmatter: FrontmatterConfig,
    /// Views rendered wherever the collection is embedded.
    #[serde(default)]
    pub views: Vec<ViewConfig>,
    /// Property selection applied when parsing records.
    #[serde(default)]
    pub properties: PropertySelection,
    /// Sorts applied when querying the collection.
    #[serde(default)]
    pub sorts: Vec<SortSpec>,
}

/// Configuration of a `table` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Property selection applied when parsing records.
    #[serde(default)]
    pub properties: PropertySelection,
    /// Sorts applied when querying the collection.
    #[serde(default)]
    pub sorts: Vec<SortSpec>,
    /// Index emission settings for the collection's entries.
    #[serde(default)]
    pub entries: EntriesConfig,
    /// Render the inline table at reference sites. Disable for collections
    /// that exist only to feed the index.
    #[serde(default = "default_render_table")]
    pub render_table: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            properties: PropertySelection::default(),
            sorts: Vec::new(),
            entries: EntriesConfig::default(),
            render_table: true,
        }
    }
}

fn default_render_table() -> bool {
    true
}

/// Index emission settings of a `table` collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntriesConfig {
    /// Append the collection's entries to the JSON index artifact.
    #[serde(default)]
    pub emit_to_index: bool,
}

/// Frontmatter composition settings of a `pages+views` collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontmatterConfig {
    /// Display name of the property that fills the `category` meta field.
    /// When set, every record must carry a value for it.
    #[serde(default)]
    pub category: Option<String>,
    /// Extra entries appended to every page's frontmatter.
    #[serde(default)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Explicit property include-list.
///
/// When set, parsed property order and membership match the list exactly;
/// otherwise all properties are kept with the title moved first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertySelection {
    #[serde(default)]
    pub include: Option<Vec<String>>,
}

/// One view of a `pages+views` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    /// Heading of the view. Omitted for a bare table.
    #[serde(default)]
    pub title: Option<String>,
    /// Display name of the property to group rows by.
    #[serde(default)]
    pub group_by: Option<String>,
    /// Columns of the view. Defaults to all parsed properties.
    #[serde(default)]
    pub include: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    sync: SyncSection,
    #[serde(default)]
    collections: HashMap<String, RawCollectionConfig>,
}

#[derive(Debug, Deserialize)]
struct SyncSection {
    root_collection: String,
    out_dir: PathBuf,
    index_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "render_as")]
enum RawCollectionConfig {
    #[serde(rename = "pages+views")]
    Pages(PagesConfig),
    #[serde(rename = "table")]
    Table(TableConfig),
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_non_empty_path(value: &Path, field: &str) -> Result<(), ConfigError> {
    if value.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use nd_notion::SortDirection;
    use pretty_assertions::assert_eq;

    use super::*;

    const FULL_CONFIG: &str = r#"
[sync]
root_collection = "root-db"
out_dir = "docs"
index_path = "docs/index.json"

[collections.root-db]
render_as = "pages+views"
out_dir = "docs/tools"

[collections.root-db.frontmatter]
category = "Category"

[collections.root-db.frontmatter.extra]
layout = "docs"
weight = 5

[collections.root-db.properties]
include = ["Name", "Category"]

[[collections.root-db.views]]
title = "Tools"
group_by = "Category"

[[collections.root-db.sorts]]
property = "order"

[collections.tbl-db]
render_as = "table"
render_table = false

[collections.tbl-db.entries]
emit_to_index = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = SyncConfig::parse(FULL_CONFIG).unwrap();
        assert_eq!(config.root_collection, "root-db");
        assert_eq!(config.out_dir, PathBuf::from("docs"));
        assert_eq!(config.index_path, PathBuf::from("docs/index.json"));

        let CollectionConfig::Pages(pages) = config.collection_config("root-db") else {
            panic!("expected pages+views config for root-db");
        };
        assert_eq!(pages.out_dir, PathBuf::from("docs/tools"));
        assert_eq!(pages.frontmatter.category.as_deref(), Some("Category"));
        assert_eq!(
            pages.frontmatter.extra["layout"],
            serde_yaml::Value::from("docs")
        );
        assert_eq!(pages.frontmatter.extra["weight"], serde_yaml::Value::from(5));
        assert_eq!(
            pages.properties.include.as_deref(),
            Some(&["Name".to_owned(), "Category".to_owned()][..])
        );
        assert_eq!(pages.views.len(), 1);
        assert_eq!(pages.views[0].title.as_deref(), Some("Tools"));
        assert_eq!(pages.views[0].group_by.as_deref(), Some("Category"));
        assert_eq!(pages.sorts.len(), 1);
        assert_eq!(pages.sorts[0].property, "order");
        assert_eq!(pages.sorts[0].direction, SortDirection::Ascending);

        let CollectionConfig::Table(table) = config.collection_config("tbl-db") else {
            panic!("expected table config for tbl-db");
        };
        assert!(table.entries.emit_to_index);
        assert!(!table.render_table);
    }

    #[test]
    fn test_fallback_configs() {
        let config = SyncConfig::parse(
            r#"
[sync]
root_collection = "root-db"
out_dir = "docs"
index_path = "docs/index.json"
"#,
        )
        .unwrap();

        // Root without an explicit entry renders as pages into the sync dir.
        let CollectionConfig::Pages(pages) = config.collection_config("root-db") else {
            panic!("expected pages fallback for the root collection");
        };
        assert_eq!(pages.out_dir, PathBuf::from("docs"));
        assert!(pages.views.is_empty());
        assert!(pages.frontmatter.category.is_none());

        // Any other id renders as a plain table.
        let CollectionConfig::Table(table) = config.collection_config("something-else") else {
            panic!("expected table fallback for unknown collections");
        };
        assert!(!table.entries.emit_to_index);
        assert!(table.render_table);
    }

    #[test]
    fn test_empty_root_collection_fails_validation() {
        let err = SyncConfig::parse(
            r#"
[sync]
root_collection = ""
out_dir = "docs"
index_path = "docs/index.json"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("sync.root_collection"));
    }

    #[test]
    fn test_unknown_render_mode_fails_to_parse() {
        let err = SyncConfig::parse(
            r#"
[sync]
root_collection = "root-db"
out_dir = "docs"
index_path = "docs/index.json"

[collections.x]
render_as = "carousel"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SyncConfig::load(Path::new("/nonexistent/notedown.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();
        let config = SyncConfig::load(file.path()).unwrap();
        assert_eq!(config.root_collection, "root-db");
    }

    #[test]
    fn test_table_entries_default_to_not_indexed() {
        let config = SyncConfig::parse(
            r#"
[sync]
root_collection = "root-db"
out_dir = "docs"
index_path = "docs/index.json"

[collections.t]
render_as = "table"
"#,
        )
        .unwrap();
        let CollectionConfig::Table(table) = config.collection_config("t") else {
            panic!("expected table config");
        };
        assert!(!table.entries.emit_to_index);
        assert!(table.render_table);
    }
}
