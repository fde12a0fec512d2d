//! # Scribe
//!
//! A minimal static blog generator. Your filesystem is the data source: each
//! directory holding exactly one markdown file is a post, everything next to
//! it is an asset, and directory names decide the order.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Plan      input/   →  Plan       (filesystem → items grouped by directory)
//! 2. Generate  Plan     →  output/    (post pages, copied assets, index page)
//! ```
//!
//! Planning never writes. It walks the input tree, classifies every file,
//! computes its destination, and groups items by input-relative directory.
//! Generation validates the whole plan (one markdown file per directory) and
//! loads both templates before the first write, then renders posts in
//! directory order, copies assets, and writes the index page.
//!
//! Every step is recorded as a [`report::BuildEvent`] rather than printed, so
//! the same run can be shown on the console by [`output`], dumped as JSON, or
//! asserted on in tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`plan`] | Stage 1: walks the input tree, skips hidden paths and the output directory, groups items |
//! | [`generate`] | Stage 2: renders posts, copies assets, writes the index page |
//! | [`template`] | Loads and validates templates, substitutes `{{content}}`, `{{title}}`, and link placeholders |
//! | [`title`] | Extracts a page title from the first element of rendered HTML |
//! | [`links`] | Older/newer links between consecutive posts |
//! | [`index`] | Builds the index page listing every post, newest first |
//! | [`markdown`] | Markdown to HTML, behind the [`markdown::RenderMarkdown`] trait |
//! | [`config`] | `scribe.toml` loading, validation, and command-line overrides |
//! | [`types`] | Shared data types (`Item`, `FileRecord`, `PostRecord`) |
//! | [`report`] | Structured log of what a run did |
//! | [`output`] | CLI output formatting for `build` and `check` |
//!
//! # Design Decisions
//!
//! ## Directory Order Is Post Order
//!
//! Posts are ordered by their directory key, compared as strings. Naming
//! directories `2021-03-05-hello/` makes that chronological without reading
//! dates out of files. There is no front-matter and no database: renaming a
//! directory is how you reorder posts.
//!
//! ## Plain Placeholder Templates
//!
//! A template is an HTML file with four literal placeholders. There is no
//! template language: no loops, no conditionals, no escaping rules to learn.
//! The index page is rendered as markdown and dropped into a template the
//! same way a post is, so one template can serve both.
//!
//! ## Validate Before Writing
//!
//! A missing template, a template without `{{content}}`, or a directory with
//! two markdown files fails the run before anything touches the output
//! directory. Failures after that point are I/O errors and abort the run.
//!
//! ## Output May Live Inside Input
//!
//! The output directory is excluded from traversal, so `scribe build . public`
//! can be re-run without feeding its own output back in.

pub mod config;
pub mod generate;
pub mod index;
pub mod links;
pub mod markdown;
pub mod output;
pub mod plan;
pub mod report;
pub mod template;
pub mod title;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
