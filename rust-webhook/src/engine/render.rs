//! Body rendering for enriched messages.
//!
//! Templates live in `templates/` and are compiled in by askama. Text
//! fields are HTML-escaped in the HTML body; the extracted article content is
//! already markup and is inserted as-is.

use askama::Template;

use crate::message::{InboundMessage, ParsedArticle};

#[derive(Template)]
#[template(path = "enriched.txt")]
struct EnrichedPlain<'a> {
    source: &'a InboundMessage,
}

#[derive(Template)]
#[template(path = "enriched.html")]
struct EnrichedHtml<'a> {
    source: &'a InboundMessage,
    article: &'a ParsedArticle,
}

/// Plain and HTML bodies for an enriched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBodies {
    pub plain: String,
    pub html: String,
}

/// Render both bodies of an enriched message.
pub fn render_enriched(
    source: &InboundMessage,
    article: &ParsedArticle,
) -> askama::Result<RenderedBodies> {
    Ok(RenderedBodies {
        plain: EnrichedPlain { source }.render()?,
        html: EnrichedHtml { source, article }.render()?,
    })
}
