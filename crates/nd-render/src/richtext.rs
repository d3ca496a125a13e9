//! Inline markdown rendering of rich text spans.

use std::sync::Arc;

use nd_notion::{Annotations, KnownSpan, Mention, RichTextSpan, SpanKind};

use crate::context::PageContext;
use crate::deferred::DeferredRenderer;
use crate::error::RenderError;
use crate::mention;

/// Concatenated plain text of the spans.
///
/// For sinks where inline markdown would corrupt the output: code fences,
/// image captions, mention placeholders.
#[must_use]
pub fn plain_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(|span| span.plain_text.as_str()).collect()
}

/// Pure inline markdown of the spans.
///
/// Page mentions render as their plain text; use
/// [`render_markdown_resolved`] inside page bodies where mentions must
/// become links.
#[must_use]
pub fn render_markdown(spans: &[RichTextSpan]) -> String {
    spans.iter().map(render_span).collect()
}

/// Inline markdown with page mentions resolved into relative links.
///
/// A mention of a page the API cannot see renders as an HTML comment
/// placeholder; a mention of a record that can never have its own file is
/// a fatal error.
pub(crate) async fn render_markdown_resolved(
    renderer: &Arc<DeferredRenderer>,
    spans: &[RichTextSpan],
    ctx: &PageContext,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for span in spans {
        if let SpanKind::Known(KnownSpan::Mention {
            mention: Mention::Page(page_mention),
        }) = &span.kind
        {
            let target = mention::resolve_page(renderer, &page_mention.page.id, &span.plain_text)
                .await?;
            match target {
                Some(task) => {
                    let text = wrap(&span.annotations, &span.plain_text);
                    out.push_str(&format!("[{text}]({})", ctx.links.resolve(&task.file)));
                }
                None => {
                    out.push_str(&format!(
                        "<!-- unresolved page mention '{}' ({}) -->",
                        span.plain_text, page_mention.page.id
                    ));
                }
            }
        } else {
            out.push_str(&render_span(span));
        }
    }
    Ok(out)
}

fn render_span(span: &RichTextSpan) -> String {
    match &span.kind {
        SpanKind::Known(KnownSpan::Text { text }) => {
            let wrapped = wrap(&span.annotations, &text.content);
            match &text.link {
                Some(link) => format!("[{wrapped}]({})", link.url),
                None => wrapped,
            }
        }
        SpanKind::Known(KnownSpan::Mention { .. } | KnownSpan::Equation { .. })
        | SpanKind::Other(_) => wrap(&span.annotations, &span.plain_text),
    }
}

/// Markdown modifiers of the annotations, in opening order.
fn modifier(annotations: &Annotations) -> String {
    let mut marker = String::new();
    if annotations.bold {
        marker.push_str("**");
    }
    if annotations.italic {
        marker.push('*');
    }
    if annotations.strikethrough {
        marker.push_str("~~");
    }
    if annotations.code {
        marker.push('`');
    }
    marker
}

/// Wrap text in annotation markers, keeping whitespace outside of them.
///
/// Leading and trailing whitespace within an annotated span would produce
/// broken markdown (`**Hello **World`), so it is emitted unwrapped around
/// the markers. Whitespace-only spans stay as they are.
fn wrap(annotations: &Annotations, text: &str) -> String {
    let marker = modifier(annotations);
    if marker.is_empty() {
        return text.to_owned();
    }

    let after_lead = text.trim_start();
    let lead = &text[..text.len() - after_lead.len()];
    let core = after_lead.trim_end();
    let trail = &after_lead[core.len()..];

    if core.is_empty() {
        return text.to_owned();
    }

    let closing: String = marker.chars().rev().collect();
    format!("{lead}{marker}{core}{closing}{trail}")
}
