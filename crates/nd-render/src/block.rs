//! Block-to-markdown mapping.

use std::sync::Arc;

use nd_notion::{Block, BlockKind, Icon, KnownBlock, RichTextSpan};
use tracing::warn;

use crate::context::PageContext;
use crate::deferred::DeferredRenderer;
use crate::error::RenderError;
use crate::richtext;

/// Code blocks starting with this marker are emitted verbatim, unfenced.
/// The escape hatch for content markdown cannot express (raw HTML, shortcode
/// syntax of the downstream site generator).
pub(crate) const RAW_MARKER: &str = "<!--raw-->";

/// Render one block's own markdown, children excluded.
///
/// Blocks with nothing to say for themselves (column containers) return an
/// empty string and are filtered out by the body renderer.
pub(crate) async fn render_block(
    renderer: &Arc<DeferredRenderer>,
    block: &Block,
    ctx: &PageContext,
) -> Result<String, RenderError> {
    let known = match &block.kind {
        BlockKind::Known(known) => known,
        BlockKind::Other(other) => {
            warn!(id = %block.id, kind = %other.block_type, url = %ctx.url, "unsupported block type");
            return Ok(format!(
                "<!-- unsupported block type: {} -->",
                other.block_type
            ));
        }
    };

    Ok(match known {
        KnownBlock::Paragraph { paragraph } => {
            inline(renderer, &paragraph.rich_text, ctx).await?
        }
        // One level deeper than the source, so the page title owns `#`.
        KnownBlock::Heading1 { heading_1 } => {
            format!("## {}", inline(renderer, &heading_1.rich_text, ctx).await?)
        }
        KnownBlock::Heading2 { heading_2 } => {
            format!("### {}", inline(renderer, &heading_2.rich_text, ctx).await?)
        }
        KnownBlock::Heading3 { heading_3 } => {
            format!("#### {}", inline(renderer, &heading_3.rich_text, ctx).await?)
        }
        KnownBlock::BulletedListItem { bulleted_list_item } => {
            format!("* {}", inline(renderer, &bulleted_list_item.rich_text, ctx).await?)
        }
        KnownBlock::NumberedListItem { numbered_list_item } => {
            format!("1. {}", inline(renderer, &numbered_list_item.rich_text, ctx).await?)
        }
        KnownBlock::ToDo { to_do } => {
            let mark = if to_do.checked { "x" } else { " " };
            format!("* [{mark}] {}", inline(renderer, &to_do.rich_text, ctx).await?)
        }
        KnownBlock::Quote { quote } => {
            quoted(&inline(renderer, &quote.rich_text, ctx).await?, None)
        }
        KnownBlock::Callout { callout } => quoted(
            &inline(renderer, &callout.rich_text, ctx).await?,
            callout.icon.as_ref().and_then(Icon::emoji),
        ),
        KnownBlock::Code { code } => code_block(&code.rich_text, &code.language),
        KnownBlock::Divider => "---".to_owned(),
        KnownBlock::Image { image } => {
            let name = ctx.assets.download(image.url(), &block.id).await?;
            let caption = richtext::plain_text(&image.caption);
            let alt = if caption.is_empty() {
                format!("image-{}", block.id)
            } else {
                caption
            };
            format!("![{alt}](./{name})")
        }
        KnownBlock::ChildDatabase { .. } => {
            // The block id doubles as the database id.
            let result = renderer.render_collection(&block.id).await?;
            let fragment = result.fragment(&ctx.links)?;
            format!("<!-- included database {} -->\n{fragment}", block.id)
        }
        KnownBlock::ColumnList | KnownBlock::Column => String::new(),
    })
}

/// Indent applied to a block's children, on top of the block's own indent.
pub(crate) fn child_indent(block: &Block) -> &'static str {
    match &block.kind {
        BlockKind::Known(
            KnownBlock::BulletedListItem { .. }
            | KnownBlock::NumberedListItem { .. }
            | KnownBlock::ToDo { .. },
        ) => "    ",
        _ => "",
    }
}

async fn inline(
    renderer: &Arc<DeferredRenderer>,
    spans: &[RichTextSpan],
    ctx: &PageContext,
) -> Result<String, RenderError> {
    richtext::render_markdown_resolved(renderer, spans, ctx).await
}

fn quoted(text: &str, emoji: Option<&str>) -> String {
    let body = match emoji {
        Some(emoji) => format!("{emoji} {text}"),
        None => text.to_owned(),
    };
    body.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_block(spans: &[RichTextSpan], language: &str) -> String {
    let text = richtext::plain_text(spans);
    if let Some(raw) = text.strip_prefix(RAW_MARKER) {
        let raw = raw.strip_prefix('\n').unwrap_or(raw);
        return raw.to_owned();
    }
    format!("```{language}\n{text}\n```")
}
