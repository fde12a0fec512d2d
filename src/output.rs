//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Each post is shown by its identity (title and position in the chain)
//! with filesystem paths as indented context lines. Paths are shown relative
//! to the input or output root so the listing reads as a content inventory.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Posts
//! 001 Hello → posts/a/one.html
//!     Source: posts/a/one.md
//!     Older: /index.html
//!     Newer: /posts/b/two.html
//!     Asset: posts/a/diagram.png
//! 002 World → posts/b/two.html
//!     Source: posts/b/two.md
//!     Older: /posts/a/one.html
//!     Newer: /index.html
//!
//! Assets
//!     assets/style.css
//!
//! Skipped
//!     .drafts (hidden)
//!
//! Index → index.html (2 posts)
//! Generated 2 posts, 2 assets
//! ```
//!
//! A dry run prints the same listing followed by `Dry run: nothing written`.
//!
//! ## Check
//!
//! ```text
//! 001 posts/a/one
//!     Older: /index.html
//!     Newer: /posts/b/two.html
//! 002 posts/b/two
//!     Older: /posts/a/one.html
//!     Newer: /index.html
//!
//! 2 posts, 1 asset directory
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::SitePlan;
use crate::report::{BuildEvent, RunReport, SkipReason};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root`, `/`-separated. Falls back to the full path.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(n: usize, word: &str) -> String {
    plural_with(n, word, &format!("{word}s"))
}

fn plural_with(n: usize, one: &str, many: &str) -> String {
    match n {
        1 => format!("1 {one}"),
        n => format!("{n} {many}"),
    }
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Hidden => "hidden",
        SkipReason::InsideOutput => "inside output",
        SkipReason::SymlinkedDir => "symlinked directory",
        SkipReason::Unreadable => "unreadable",
    }
}

// ============================================================================
// Build
// ============================================================================

/// A post being assembled while walking the event stream.
struct PostBlock {
    /// Directory key, used to attribute copied assets.
    dir: String,
    title: String,
    destination: String,
    lines: Vec<String>,
}

/// Format the result of a `build` run.
pub fn format_build_output(report: &RunReport) -> Vec<String> {
    let input = report.input_dir.as_path();
    let output = report.output_dir.as_path();

    let mut posts: Vec<PostBlock> = Vec::new();
    let mut assets = Vec::new();
    let mut skipped = Vec::new();
    let mut index_line = None;
    let mut copied = 0;

    for event in &report.events {
        match event {
            BuildEvent::Skipped { path, reason } => {
                skipped.push(format!(
                    "{}{} ({})",
                    indent(1),
                    relative(path, input),
                    skip_label(*reason)
                ));
            }
            BuildEvent::PostPlanned {
                dir,
                newer_link,
                older_link,
                ..
            } => posts.push(PostBlock {
                dir: dir.clone(),
                title: String::new(),
                destination: String::new(),
                lines: vec![
                    format!("{}Older: {}", indent(1), older_link),
                    format!("{}Newer: {}", indent(1), newer_link),
                ],
            }),
            BuildEvent::ExpandedTemplate { source, title } => {
                if let Some(post) = posts.last_mut() {
                    post.title = title.clone();
                    post.lines
                        .insert(0, format!("{}Source: {}", indent(1), relative(source, input)));
                }
            }
            BuildEvent::Wrote { destination, .. } => {
                if let Some(post) = posts.last_mut() {
                    post.destination = relative(destination, output);
                }
            }
            BuildEvent::Copied { source, .. } => {
                copied += 1;
                let shown = relative(source, input);
                match posts.last_mut() {
                    Some(post) if parent_of(&shown) == post.dir => {
                        post.lines.push(format!("{}Asset: {}", indent(1), shown));
                    }
                    _ => assets.push(format!("{}{}", indent(1), shown)),
                }
            }
            BuildEvent::WroteIndex { path, posts: n } => {
                index_line = Some(format!(
                    "Index → {} ({})",
                    relative(path, output),
                    plural(*n, "post")
                ));
            }
            BuildEvent::CreatedDir { .. } => {}
        }
    }

    let mut lines = Vec::new();
    if !posts.is_empty() {
        lines.push("Posts".to_string());
        for (i, post) in posts.iter().enumerate() {
            let title = match post.title.as_str() {
                "" => "(untitled)",
                t => t,
            };
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                title,
                post.destination
            ));
            lines.extend(post.lines.iter().cloned());
        }
    }
    for (heading, section) in [("Assets", &assets), ("Skipped", &skipped)] {
        if !section.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(heading.to_string());
            lines.extend(section.iter().cloned());
        }
    }
    if let Some(index_line) = index_line {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(index_line);
    }
    lines.push(format!(
        "Generated {}, {}",
        plural(posts.len(), "post"),
        plural(copied, "asset")
    ));
    if report.dry_run {
        lines.push("Dry run: nothing written".to_string());
    }
    lines
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

pub fn print_build_output(report: &RunReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a validated plan: each post with its neighbours.
pub fn format_check_output(site: &SitePlan) -> Vec<String> {
    let mut lines = Vec::new();
    let post_dirs = site.plan.iter_dirs().filter_map(Result::ok);
    for (i, (dir, links)) in post_dirs.zip(&site.links).enumerate() {
        let name = match dir.key {
            "" => dir.post_name.clone(),
            key => format!("{key}/{}", dir.post_name),
        };
        lines.push(format!("{} {}", format_index(i + 1), name));
        lines.push(format!("{}Older: {}", indent(1), links.older));
        lines.push(format!("{}Newer: {}", indent(1), links.newer));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{}, {}",
        plural(site.links.len(), "post"),
        plural_with(
            site.plan.asset_dirs().count(),
            "asset directory",
            "asset directories"
        )
    ));
    lines
}

pub fn print_check_output(site: &SitePlan) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}
