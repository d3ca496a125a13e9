//! Recursive page body rendering.
//!
//! Sibling subtrees render concurrently, but the assembled document follows
//! the original sibling order: fragments land in a slot per index and are
//! joined after the whole level settles.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use nd_notion::Block;
use tokio::task::JoinSet;

use crate::block;
use crate::context::PageContext;
use crate::deferred::DeferredRenderer;
use crate::error::RenderError;

type Subtree<'a> = Pin<Box<dyn Future<Output = Result<String, RenderError>> + Send + 'a>>;

/// Render a record's whole body: top-level blocks and their subtrees,
/// non-empty fragments joined by blank lines.
pub(crate) async fn render_body(
    renderer: &Arc<DeferredRenderer>,
    record_id: &str,
    ctx: &Arc<PageContext>,
) -> Result<String, RenderError> {
    let blocks = renderer.api.fetch_children(record_id).await?;
    render_siblings(renderer, blocks, ctx, "").await
}

async fn render_siblings(
    renderer: &Arc<DeferredRenderer>,
    blocks: Vec<Block>,
    ctx: &Arc<PageContext>,
    indent: &str,
) -> Result<String, RenderError> {
    let count = blocks.len();
    let mut subtrees = JoinSet::new();
    for (index, block) in blocks.into_iter().enumerate() {
        let renderer = Arc::clone(renderer);
        let ctx = Arc::clone(ctx);
        let indent = indent.to_owned();
        subtrees.spawn(async move {
            let fragment = render_subtree(&renderer, &block, &ctx, &indent).await;
            (index, fragment)
        });
    }

    let mut fragments = vec![String::new(); count];
    while let Some(joined) = subtrees.join_next().await {
        let (index, fragment) = joined?;
        fragments[index] = fragment?;
    }
    Ok(join_fragments(fragments))
}

/// One block and its children. Boxed because the recursion depth follows
/// the document, not the code.
fn render_subtree<'a>(
    renderer: &'a Arc<DeferredRenderer>,
    block: &'a Block,
    ctx: &'a Arc<PageContext>,
    indent: &'a str,
) -> Subtree<'a> {
    Box::pin(async move {
        let own = indent_lines(&block::render_block(renderer, block, ctx).await?, indent);

        let mut fragments = Vec::new();
        if !own.is_empty() {
            fragments.push(own);
        }
        if block.has_children {
            let children = renderer.api.fetch_children(&block.id).await?;
            let child_indent = format!("{indent}{}", block::child_indent(block));
            let rendered = render_siblings(renderer, children, ctx, &child_indent).await?;
            if !rendered.is_empty() {
                fragments.push(rendered);
            }
        }
        Ok(fragments.join("\n\n"))
    })
}

fn join_fragments(fragments: Vec<String>) -> String {
    let parts: Vec<String> = fragments.into_iter().filter(|f| !f.is_empty()).collect();
    parts.join("\n\n")
}

fn indent_lines(text: &str, indent: &str) -> String {
    if indent.is_empty() || text.is_empty() {
        return text.to_owned();
    }
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
