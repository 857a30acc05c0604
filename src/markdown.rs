//! Markdown → HTML rendering for generated topic documents.
//!
//! GitHub-flavoured extensions are always on. Raw HTML inside a document is
//! passed through untouched unless [`RenderOptions::escape_html`] is set;
//! the page inserts the result as trusted markup.

use pulldown_cmark::{Event, Options, Parser, html};

/// Rendering switches. The default reproduces pass-through behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Turn raw HTML blocks and inline HTML into escaped text.
    pub escape_html: bool,
}

fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Render with default options (raw HTML passes through).
pub fn render_to_html(markdown: &str) -> String {
    render_with(markdown, RenderOptions::default())
}

pub fn render_with(markdown: &str, opts: RenderOptions) -> String {
    let parser = Parser::new_ext(markdown, gfm_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);

    if opts.escape_html {
        let events = parser.map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        html::push_html(&mut out, events);
    } else {
        html::push_html(&mut out, parser);
    }
    out
}
