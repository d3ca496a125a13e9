//! Per-page rendering context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nd_notion::NotionApi;

use crate::assets::AssetWriter;
use crate::link::LinkResolver;

/// Everything a block needs to know about the page it lands in: where
/// relative links resolve from and where downloaded assets go. Built once
/// per page render and shared down the block tree.
pub(crate) struct PageContext {
    /// Public URL of the page, for log and error messages.
    pub url: String,
    /// Resolver for links relative to the page's directory.
    pub links: LinkResolver,
    /// Writer placing image assets next to the page.
    pub assets: AssetWriter,
}

impl PageContext {
    pub(crate) fn new(url: String, file: &Path, api: Arc<dyn NotionApi>) -> Self {
        let dir: PathBuf = file.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            url,
            links: LinkResolver::new(&dir),
            assets: AssetWriter::new(dir, api),
        }
    }
}
