//! Shared data model used by every pipeline stage.
//!
//! A run discovers files ([`FileRecord`]), turns each into one planned
//! operation ([`Item`]), and collects a [`PostRecord`] for every markdown
//! item it renders. Items are created once by the plan builder and never
//! mutated afterwards.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// How a planned file is handled by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A `.md` source: rendered, templated, written as `.html`.
    Markdown,
    /// Any other file: copied byte-for-byte.
    Other,
}

impl FileKind {
    /// Classify a file name by its extension.
    pub fn classify(file_name: &Path) -> Self {
        match file_name.extension() {
            Some(ext) if ext == "md" => FileKind::Markdown,
            _ => FileKind::Other,
        }
    }
}

/// A path plus whatever timestamps could be read for it.
///
/// Timestamps are best-effort: a file that does not exist yet (every
/// destination on a fresh build) or whose metadata cannot be read simply has
/// `None` for both.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
    #[serde(skip)]
    pub created: Option<SystemTime>,
}

impl FileRecord {
    pub fn read(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let metadata = std::fs::metadata(&path).ok();
        let modified = metadata.as_ref().and_then(|m| m.modified().ok());
        let created = metadata.as_ref().and_then(|m| m.created().ok());
        Self {
            path,
            modified,
            created,
        }
    }
}

/// One planned source → destination operation.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub kind: FileKind,
    pub source: FileRecord,
    pub destination: FileRecord,
    /// Source creation time, or the wall clock when the item was planned.
    #[serde(skip)]
    pub effective_creation_time: SystemTime,
}

impl Item {
    pub fn new(kind: FileKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let source = FileRecord::read(source);
        let destination = FileRecord::read(destination);
        let effective_creation_time = source.created.unwrap_or_else(SystemTime::now);
        Self {
            kind,
            source,
            destination,
            effective_creation_time,
        }
    }

    /// Base name of the source without its extension (`one` for `a/one.md`).
    pub fn stem(&self) -> String {
        self.source
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// A rendered post, kept until the index page is assembled.
#[derive(Debug, Clone)]
pub struct PostRecord {
    /// Title extracted from the rendered HTML.
    pub title: String,
    pub item: Item,
    /// Link to the post's page, prefix included.
    pub link: String,
}
