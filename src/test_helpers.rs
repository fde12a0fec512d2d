//! Shared test utilities for the scribe test suite.
//!
//! Provides a throwaway blog layout on disk and lookup helpers over the
//! planning and generation results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new()
//!     .file("posts/a/one.md", "# Hello")
//!     .template("template.html", "{{content}}");
//! let plan = Plan::build(&site.input(), &site.output()).unwrap();
//! let item = find_item(&plan, "one.md");
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

use crate::plan::Plan;
use crate::types::Item;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp directory with `in/` as the blog source and `out/` as the
/// (not yet created) output directory. Templates live next to them.
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("in")).unwrap();
        Self { tmp }
    }

    /// Write a file under the input directory, creating parents.
    pub fn file(self, relative: &str, contents: &str) -> Self {
        let path = self.input().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        self
    }

    /// Write a template next to the input directory.
    pub fn template(self, name: &str, contents: &str) -> Self {
        std::fs::write(self.tmp.path().join(name), contents).unwrap();
        self
    }

    pub fn input(&self) -> PathBuf {
        self.tmp.path().join("in")
    }

    pub fn output(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Read a generated file. Panics with the list of outputs on a miss.
    pub fn read_output(&self, relative: &str) -> String {
        std::fs::read_to_string(self.output().join(relative)).unwrap_or_else(|e| {
            let files = self.output_files();
            panic!("could not read output '{relative}' ({e}). Outputs: {files:?}")
        })
    }

    /// All files under the output directory, relative and sorted.
    pub fn output_files(&self) -> Vec<String> {
        let out = self.output();
        if !out.exists() {
            return Vec::new();
        }
        let mut files: Vec<String> = walkdir::WalkDir::new(&out)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(&out)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

// =========================================================================
// Plan lookups — panics with a clear message on miss
// =========================================================================

/// Find a planned item by source file name. Panics if not found.
pub fn find_item<'a>(plan: &'a Plan, file_name: &str) -> &'a Item {
    plan.items()
        .iter()
        .find(|i| i.source.path.file_name().is_some_and(|n| n == file_name))
        .unwrap_or_else(|| {
            let names: Vec<String> = plan
                .items()
                .iter()
                .map(|i| i.source.path.display().to_string())
                .collect();
            panic!("item '{file_name}' not found. Available: {names:?}")
        })
}
