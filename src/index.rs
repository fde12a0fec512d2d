//! Index page assembly.
//!
//! The index is itself written as markdown and rendered through the same
//! renderer as the posts, then dropped into the index template:
//!
//! ```text
//! Recent posts
//! ======
//! * 11 Apr 2021 - [Learning Rust](</2021-04-11-rust/rust.html>)
//! * 05 Mar 2021 - [Hello](</2021-03-05-hello/hello.html>)
//! ```
//!
//! Posts are listed in reverse generation order. Generation follows
//! directory-key order, so date-prefixed directories come out newest first.

use crate::config::IndexConfig;
use crate::markdown::RenderMarkdown;
use crate::report::PostSummary;
use crate::template::Template;
use crate::types::PostRecord;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const INDEX_FILE_NAME: &str = "index.html";

/// A fully assembled index page, ready to write.
#[derive(Debug, Clone)]
pub struct IndexPage {
    pub path: PathBuf,
    pub text: String,
    pub posts: Vec<PostSummary>,
}

/// Format a timestamp in UTC with a strftime format.
pub fn format_date(time: SystemTime, format: &str) -> String {
    DateTime::<Utc>::from(time).format(format).to_string()
}

/// One summary per post, newest first.
pub fn summarize(config: &IndexConfig, posts: &[PostRecord]) -> Vec<PostSummary> {
    posts
        .iter()
        .rev()
        .map(|post| PostSummary {
            title: post.title.clone(),
            link: post.link.clone(),
            date: format_date(post.item.effective_creation_time, &config.date_format),
        })
        .collect()
}

/// Markdown source of the index listing.
///
/// Link destinations are angle-bracketed so keys with spaces stay links.
pub fn index_markdown(heading: &str, posts: &[PostSummary]) -> String {
    let mut md = format!("{heading}\n======\n");
    for post in posts {
        md.push_str(&format!(
            "* {} - [{}](<{}>)\n",
            post.date, post.title, post.link
        ));
    }
    md
}

/// Render the index listing and fill the index template with it.
pub fn build_index(
    config: &IndexConfig,
    posts: &[PostRecord],
    renderer: &impl RenderMarkdown,
    template: &Template,
    output_dir: &Path,
) -> IndexPage {
    let summaries = summarize(config, posts);
    let html = renderer.render(&index_markdown(&config.heading, &summaries));
    let filled = template.fill(&html, "", "");
    IndexPage {
        path: output_dir.join(INDEX_FILE_NAME),
        text: filled.text,
        posts: summaries,
    }
}
