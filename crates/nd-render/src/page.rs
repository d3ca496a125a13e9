//! Page task construction and the queued render action.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use nd_config::PagesConfig;
use nd_notion::Record;
use tracing::{error, info, warn};

use crate::body;
use crate::context::PageContext;
use crate::deferred::{DeferredRenderer, RenderAction};
use crate::error::RenderError;
use crate::frontmatter;
use crate::properties;
use crate::task::PageTask;

/// Build a record's page task and its render action.
///
/// Everything here is synchronous on purpose: the caller runs it under the
/// task-table guard, so parsing, path derivation, and frontmatter assembly
/// must not suspend. The returned action owns everything it needs and is
/// only polled later, from the pending queue.
pub(crate) fn prepare(
    renderer: &Arc<DeferredRenderer>,
    record: &Record,
    config: &Arc<PagesConfig>,
) -> Result<(PageTask, RenderAction), RenderError> {
    let properties = properties::parse(
        record,
        config.properties.include.as_deref(),
        config.frontmatter.category.as_deref(),
    )?;
    let file = config
        .out_dir
        .join(format!("{}.md", slug::slugify(&properties.meta.title)));
    let frontmatter = frontmatter::build(&properties, &config.frontmatter.extra)?;

    let task = PageTask {
        id: record.id.clone(),
        file: file.clone(),
        properties,
    };
    let action = Box::pin(render_file(
        Arc::clone(renderer),
        record.clone(),
        file,
        frontmatter,
    ));
    Ok((task, action))
}

async fn render_file(
    renderer: Arc<DeferredRenderer>,
    record: Record,
    file: PathBuf,
    frontmatter: String,
) -> Result<(), RenderError> {
    if record.archived {
        warn!(id = %record.id, url = %record.url, "archived page skipped");
        return Ok(());
    }

    let started = Instant::now();
    let ctx = Arc::new(PageContext::new(
        record.url.clone(),
        &file,
        Arc::clone(&renderer.api),
    ));
    match write_page(&renderer, &record, &file, frontmatter, &ctx).await {
        Ok(()) => {
            info!(file = %file.display(), elapsed = ?started.elapsed(), "page rendered");
            Ok(())
        }
        Err(err) => {
            error!(url = %record.url, error = %err, "page render failed");
            Err(err)
        }
    }
}

async fn write_page(
    renderer: &Arc<DeferredRenderer>,
    record: &Record,
    file: &Path,
    frontmatter: String,
    ctx: &Arc<PageContext>,
) -> Result<(), RenderError> {
    let body = body::render_body(renderer, &record.id, ctx).await?;
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(file, format!("{frontmatter}{body}\n")).await?;
    Ok(())
}
