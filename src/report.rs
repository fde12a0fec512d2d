//! Structured record of what a run did.
//!
//! Every stage appends [`BuildEvent`]s to a [`RunReport`] instead of printing.
//! The binary formats the report with [`crate::output`] and can also dump it
//! as JSON with `--report`. In dry-run mode the same events are recorded;
//! `dry_run` on the report tells the reader that none of them touched disk.

use serde::Serialize;
use std::path::PathBuf;

/// Why the plan builder passed over a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The path or one of its parents below the input root starts with `.`.
    Hidden,
    /// The path lies inside the output directory.
    InsideOutput,
    /// A symlink to a directory; links are not followed.
    SymlinkedDir,
    /// A subdirectory that could not be read.
    Unreadable,
}

/// One step of a run, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    /// A directory or file was left out of the plan.
    Skipped { path: PathBuf, reason: SkipReason },
    /// A post directory was scheduled, with its computed neighbours.
    PostPlanned {
        dir: String,
        post: String,
        newer_link: String,
        older_link: String,
    },
    /// An output directory was (or would be) created.
    CreatedDir { path: PathBuf },
    /// A markdown file was rendered and templated.
    ExpandedTemplate { source: PathBuf, title: String },
    /// Rendered content was (or would be) written.
    Wrote { source: PathBuf, destination: PathBuf },
    /// A file was (or would be) copied verbatim.
    Copied { source: PathBuf, destination: PathBuf },
    /// The index page was (or would be) written.
    WroteIndex { path: PathBuf, posts: usize },
}

/// A post as listed on the index page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub link: String,
    /// Date shown on the index page.
    pub date: String,
}

/// Everything a run did, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub events: Vec<BuildEvent>,
    /// Posts in index order (newest first).
    pub posts: Vec<PostSummary>,
}

impl RunReport {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            input_dir,
            output_dir,
            dry_run,
            events: Vec::new(),
            posts: Vec::new(),
        }
    }

    pub fn record(&mut self, event: BuildEvent) {
        self.events.push(event);
    }

    /// Number of files written or copied, index page included.
    pub fn files_written(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BuildEvent::Wrote { .. } | BuildEvent::Copied { .. } | BuildEvent::WroteIndex { .. }
                )
            })
            .count()
    }
}
