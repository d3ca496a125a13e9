//! Image asset download and placement.

use std::path::PathBuf;
use std::sync::Arc;

use nd_notion::NotionApi;
use tracing::debug;

use crate::error::RenderError;

/// Downloads image assets into the directory of the page embedding them.
pub(crate) struct AssetWriter {
    dir: PathBuf,
    api: Arc<dyn NotionApi>,
}

impl AssetWriter {
    pub(crate) fn new(dir: impl Into<PathBuf>, api: Arc<dyn NotionApi>) -> Self {
        Self {
            dir: dir.into(),
            api,
        }
    }

    /// Download `url` and store it as `{base}.{ext}`, with the extension
    /// mapped from the response content type. Returns the stored basename
    /// for the markdown link.
    pub(crate) async fn download(&self, url: &str, base: &str) -> Result<String, RenderError> {
        let asset = self.api.fetch_asset(url).await?;
        let name = format!("{base}.{}", extension_for(asset.content_type.as_deref()));
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &asset.bytes).await?;
        debug!(path = %path.display(), bytes = asset.bytes.len(), "asset written");
        Ok(name)
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("image/png") => "png",
        Some("image/jpeg" | "image/jpg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/svg+xml") => "svg",
        Some("image/webp") => "webp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use nd_notion::MockNotionApi;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_download_names_file_by_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockNotionApi::new().with_asset(
            "https://files.example/a",
            vec![1, 2, 3],
            Some("image/png"),
        );
        let writer = AssetWriter::new(dir.path(), Arc::new(api));

        let name = writer
            .download("https://files.example/a", "block-1")
            .await
            .unwrap();

        assert_eq!(name, "block-1.png");
        assert_eq!(std::fs::read(dir.path().join("block-1.png")).unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_content_type_falls_back_to_bin() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockNotionApi::new().with_asset("https://files.example/b", vec![0], None);
        let writer = AssetWriter::new(dir.path(), Arc::new(api));

        let name = writer
            .download("https://files.example/b", "block-2")
            .await
            .unwrap();
        assert_eq!(name, "block-2.bin");
    }

    #[tokio::test]
    async fn test_missing_asset_propagates_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AssetWriter::new(dir.path(), Arc::new(MockNotionApi::new()));

        let err = writer
            .download("https://files.example/missing", "block-3")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Api(nd_notion::NotionError::NotFound { .. })
        ));
    }
}
