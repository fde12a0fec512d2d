//! Previous/next links between posts.
//!
//! Posts form a chain in directory-key order (date-prefixed directory names
//! make that chronological). Each end of the chain points back at the index
//! page:
//!
//! ```text
//! index ← a ⇄ b ⇄ c → index
//! ```
//!
//! `older` is the previous post in key order and `newer` the next one, which
//! is what the `{{older_link}}` and `{{newer_link}}` placeholders receive.

use serde::Serialize;

/// Links for one post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostLinks {
    /// This post's own page.
    pub page: String,
    /// Previous post in key order, or the index page.
    pub older: String,
    /// Next post in key order, or the index page.
    pub newer: String,
}

/// Link to the index page.
pub fn index_link(prefix: &str) -> String {
    format!("{prefix}/index.html")
}

/// Link to a post page: `<prefix>/<key>/<post>.html`, or
/// `<prefix>/<post>.html` for a post in the input root.
pub fn page_link(prefix: &str, key: &str, post_name: &str) -> String {
    match key {
        "" => format!("{prefix}/{post_name}.html"),
        key => format!("{prefix}/{key}/{post_name}.html"),
    }
}

/// Compute links for an ordered list of `(directory key, post name)` pairs.
///
/// The result is parallel to the input.
pub fn sequence<K, P>(prefix: &str, posts: &[(K, P)]) -> Vec<PostLinks>
where
    K: AsRef<str>,
    P: AsRef<str>,
{
    let pages: Vec<String> = posts
        .iter()
        .map(|(key, post)| page_link(prefix, key.as_ref(), post.as_ref()))
        .collect();
    let index = index_link(prefix);

    (0..pages.len())
        .map(|i| PostLinks {
            page: pages[i].clone(),
            older: match i {
                0 => index.clone(),
                _ => pages[i - 1].clone(),
            },
            newer: pages.get(i + 1).cloned().unwrap_or_else(|| index.clone()),
        })
        .collect()
}
