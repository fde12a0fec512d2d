//! Markdown rendering behind a trait.
//!
//! The generator only ever sees [`RenderMarkdown`], so tests can swap in a
//! trivial renderer and the CommonMark flavour can be tuned from config
//! without touching the pipeline.

use crate::config::MarkdownConfig;
use pulldown_cmark::{Options, Parser, html as md_html};

/// Converts markdown text to an HTML fragment.
pub trait RenderMarkdown {
    fn render(&self, markdown: &str) -> String;
}

/// [`RenderMarkdown`] backed by `pulldown-cmark`.
#[derive(Debug, Clone)]
pub struct CommonMark {
    options: Options,
}

impl CommonMark {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
        Self { options }
    }
}

impl Default for CommonMark {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl RenderMarkdown for CommonMark {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut html, parser);
        html
    }
}
