//! Input tree scanning and planning.
//!
//! Stage 1 of the scribe pipeline. Walks the input directory, classifies every
//! file, and groups the resulting [`Item`]s by the directory they live in.
//!
//! ## Directory Structure
//!
//! A post is a directory holding exactly one markdown file, plus any assets
//! it references. Date-prefixed directory names keep posts in order:
//!
//! ```text
//! posts/                           # Input root
//! ├── 2021-03-05-hello/            # Post directory
//! │   ├── hello.md                 # → 2021-03-05-hello/hello.html
//! │   └── diagram.png              # copied alongside
//! ├── 2021-04-11-rust/
//! │   └── rust.md
//! ├── assets/                      # No markdown: copied verbatim
//! │   └── style.css
//! ├── .drafts/                     # Hidden: skipped with its contents
//! └── out/                         # Output nested in input: skipped
//! ```
//!
//! ## Rules
//!
//! - Directories inside the output directory are skipped, so re-running with
//!   output nested inside input never re-processes generated files.
//! - Hidden directories (any segment below the input root starting with `.`)
//!   are skipped with everything under them; hidden files are skipped.
//! - Symlinks to directories are not followed. Subdirectories that cannot be
//!   read are skipped; only an unreadable input root is an error.
//! - `.md` files become `.html` pages; everything else is copied as-is.
//! - A directory may hold at most one `.md` file. A second one is reported by
//!   [`Plan::iter_dirs`] as [`PlanError::MultipleMarkdown`].

use crate::report::SkipReason;
use crate::types::{FileKind, Item};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error reading input directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Found more than 1 .md file in directory {dir:?} ({}); aborting.", list_files(.files))]
    MultipleMarkdown { dir: String, files: Vec<PathBuf> },
}

fn list_files(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every planned file, grouped by input-relative directory.
#[derive(Debug)]
pub struct Plan {
    input_dir: PathBuf,
    output_dir: PathBuf,
    items: Vec<Item>,
    /// Raw `/`-joined directory key → that directory's items. Keyed on the
    /// OS string so names that are not valid UTF-8 stay distinct.
    by_dir: BTreeMap<OsString, DirGroup>,
    skipped: Vec<(PathBuf, SkipReason)>,
}

/// The items registered under one input directory.
#[derive(Debug)]
struct DirGroup {
    relative: PathBuf,
    key: String,
    /// Indices into `Plan::items`, in registration order.
    items: Vec<usize>,
}

/// A directory containing a post, as yielded by [`Plan::iter_dirs`].
#[derive(Debug, Clone)]
pub struct PostDir<'a> {
    /// Input-relative directory, `/`-separated. Empty for the input root.
    pub key: &'a str,
    /// Input-relative directory as a path.
    pub dir: &'a Path,
    /// Markdown file name without extension.
    pub post_name: String,
    /// All items in the directory, markdown and assets, in registration order.
    pub items: Vec<&'a Item>,
}

/// A directory without markdown, as yielded by [`Plan::asset_dirs`].
#[derive(Debug, Clone)]
pub struct AssetDir<'a> {
    pub key: &'a str,
    pub dir: &'a Path,
    pub items: Vec<&'a Item>,
}

impl Plan {
    fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            items: Vec::new(),
            by_dir: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Walk `input_dir` and plan every file into `output_dir`.
    ///
    /// Both paths are made absolute and normalized first, so the
    /// output-inside-input check works for relative arguments and `..`.
    pub fn build(input_dir: &Path, output_dir: &Path) -> Result<Plan, PlanError> {
        let input_dir = normalize(input_dir)?;
        let output_dir = normalize(output_dir)?;
        let mut plan = Plan::new(input_dir.clone(), output_dir.clone());

        if input_dir.starts_with(&output_dir) {
            plan.skipped.push((input_dir, SkipReason::InsideOutput));
            return Ok(plan);
        }

        let mut walker = WalkDir::new(&input_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() > 0 => {
                    let path = err.path().unwrap_or(input_dir.as_path()).to_path_buf();
                    plan.skipped.push((path, SkipReason::Unreadable));
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let path = entry.path();

            if entry.file_type().is_dir() {
                let reason = if path.starts_with(&output_dir) {
                    Some(SkipReason::InsideOutput)
                } else if is_hidden(entry.file_name()) {
                    Some(SkipReason::Hidden)
                } else {
                    None
                };
                if let Some(reason) = reason {
                    plan.skipped.push((path.to_path_buf(), reason));
                    walker.skip_current_dir();
                }
                continue;
            }

            if is_hidden(entry.file_name()) {
                plan.skipped.push((path.to_path_buf(), SkipReason::Hidden));
                continue;
            }

            // Path::is_dir follows the link.
            if entry.path_is_symlink() && path.is_dir() {
                plan.skipped.push((path.to_path_buf(), SkipReason::SymlinkedDir));
                continue;
            }

            plan.add_file(path);
        }

        Ok(plan)
    }

    /// Classify one input file and register it under its directory key.
    fn add_file(&mut self, source: &Path) {
        let relative = source.strip_prefix(&self.input_dir).unwrap_or(source);
        let relative_dir = relative.parent().unwrap_or(Path::new(""));
        let file_name = relative.file_name().map(Path::new).unwrap_or(relative);

        let kind = FileKind::classify(file_name);
        let dest_name = match kind {
            FileKind::Markdown => file_name.with_extension("html"),
            FileKind::Other => file_name.to_path_buf(),
        };
        let destination = self.output_dir.join(relative_dir).join(dest_name);

        self.add_item(relative_dir, Item::new(kind, source, destination));
    }

    fn add_item(&mut self, relative_dir: &Path, item: Item) {
        self.items.push(item);
        let index = self.items.len() - 1;
        let raw = dir_key(relative_dir);
        self.by_dir
            .entry(raw.clone())
            .or_insert_with(|| DirGroup {
                relative: relative_dir.to_path_buf(),
                key: raw.to_string_lossy().into_owned(),
                items: Vec::new(),
            })
            .items
            .push(index);
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// All planned items, in traversal order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Paths left out of the plan, with the reason.
    pub fn skipped(&self) -> &[(PathBuf, SkipReason)] {
        &self.skipped
    }

    /// Mirrored output directory for an input-relative directory.
    pub fn output_dir_for(&self, dir: &Path) -> PathBuf {
        if dir.as_os_str().is_empty() {
            self.output_dir.clone()
        } else {
            self.output_dir.join(dir)
        }
    }

    fn dir_items(&self, group: &DirGroup) -> Vec<&Item> {
        group.items.iter().map(|&i| &self.items[i]).collect()
    }

    /// Post directories in ascending key order.
    ///
    /// Only directories with at least one markdown item are yielded. The
    /// iterator is lazy and can be restarted by calling this again; a
    /// directory with two or more markdown items yields an error.
    pub fn iter_dirs(&self) -> impl Iterator<Item = Result<PostDir<'_>, PlanError>> + '_ {
        self.by_dir.values().filter_map(|group| {
            let items = self.dir_items(group);
            let markdown: Vec<&Item> = items
                .iter()
                .copied()
                .filter(|item| item.kind == FileKind::Markdown)
                .collect();
            match markdown.as_slice() {
                [] => None,
                [post] => Some(Ok(PostDir {
                    key: group.key.as_str(),
                    dir: group.relative.as_path(),
                    post_name: post.stem(),
                    items,
                })),
                _ => Some(Err(PlanError::MultipleMarkdown {
                    dir: group.key.clone(),
                    files: markdown.iter().map(|i| i.source.path.clone()).collect(),
                })),
            }
        })
    }

    /// Directories without any markdown item, in ascending key order.
    pub fn asset_dirs(&self) -> impl Iterator<Item = AssetDir<'_>> + '_ {
        self.by_dir
            .values()
            .map(|group| AssetDir {
                key: group.key.as_str(),
                dir: group.relative.as_path(),
                items: self.dir_items(group),
            })
            .filter(|dir| dir.items.iter().all(|item| item.kind == FileKind::Other))
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// `/`-joined form of an input-relative directory.
fn dir_key(relative_dir: &Path) -> OsString {
    let mut key = OsString::new();
    for (i, component) in relative_dir.components().enumerate() {
        if i > 0 {
            key.push("/");
        }
        key.push(component.as_os_str());
    }
    key
}

/// Make `path` absolute and resolve `.` and `..` lexically.
fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn keys(plan: &Plan) -> Vec<String> {
        plan.iter_dirs()
            .map(|d| d.unwrap().key.to_string())
            .collect()
    }

    #[test]
    fn finds_post_directories_in_key_order() {
        let site = SiteFixture::new()
            .file("posts/b/two.md", "# World")
            .file("posts/a/one.md", "# Hello");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        assert_eq!(keys(&plan), vec!["posts/a", "posts/b"]);
    }

    #[test]
    fn post_name_is_markdown_stem() {
        let site = SiteFixture::new().file("2021-03-05/hello-world.md", "# Hi");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let dir = plan.iter_dirs().next().unwrap().unwrap();
        assert_eq!(dir.post_name, "hello-world");
    }

    #[test]
    fn markdown_destination_uses_html_extension() {
        let site = SiteFixture::new().file("posts/a/one.md", "# Hello");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let item = find_item(&plan, "one.md");
        assert_eq!(item.kind, FileKind::Markdown);
        assert_eq!(item.destination.path, site.output().join("posts/a/one.html"));
    }

    #[test]
    fn other_files_keep_their_name() {
        let site = SiteFixture::new()
            .file("posts/a/one.md", "# Hello")
            .file("posts/a/photo.jpg", "jpeg");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let item = find_item(&plan, "photo.jpg");
        assert_eq!(item.kind, FileKind::Other);
        assert_eq!(item.destination.path, site.output().join("posts/a/photo.jpg"));
    }

    #[test]
    fn post_dir_includes_assets() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("a/pic.png", "png")
            .file("a/data.csv", "1,2");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let dir = plan.iter_dirs().next().unwrap().unwrap();
        assert_eq!(dir.items.len(), 3);
    }

    #[test]
    fn hidden_directories_skipped_with_contents() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file(".drafts/b/two.md", "# Draft")
            .file("c/.git/config", "x");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        assert_eq!(keys(&plan), vec!["a"]);
        assert_eq!(plan.items().len(), 1);
        let reasons: Vec<SkipReason> = plan.skipped().iter().map(|(_, r)| *r).collect();
        assert_eq!(reasons, vec![SkipReason::Hidden, SkipReason::Hidden]);
    }

    #[test]
    fn hidden_files_skipped() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("a/.DS_Store", "junk")
            .file("a/.secret.md", "# no");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let dir = plan.iter_dirs().next().unwrap().unwrap();
        assert_eq!(dir.items.len(), 1);
        assert_eq!(plan.skipped().len(), 2);
    }

    #[test]
    fn output_nested_in_input_is_skipped() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("out/a/one.html", "<h1>old</h1>")
            .file("out/b/two.md", "# stale");
        let output = site.input().join("out");
        let plan = Plan::build(&site.input(), &output).unwrap();
        assert_eq!(keys(&plan), vec!["a"]);
        assert_eq!(plan.skipped()[0].1, SkipReason::InsideOutput);
    }

    #[test]
    fn relative_paths_are_resolved() {
        let site = SiteFixture::new().file("a/one.md", "# Hello");
        let plan = Plan::build(&site.input(), Path::new("relative-out")).unwrap();
        assert!(plan.output_dir().is_absolute());
        assert!(plan.input_dir().is_absolute());
    }

    #[test]
    fn multiple_markdown_files_is_error_naming_directory() {
        let site = SiteFixture::new()
            .file("a/one.md", "# One")
            .file("b/two.md", "# Two")
            .file("b/three.md", "# Three");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let results: Vec<_> = plan.iter_dirs().collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(PlanError::MultipleMarkdown { dir, files }) => {
                assert_eq!(dir, "b");
                assert_eq!(files.len(), 2);
            }
            other => panic!("expected MultipleMarkdown, got {other:?}"),
        }
    }

    #[test]
    fn iter_dirs_is_restartable() {
        let site = SiteFixture::new()
            .file("a/one.md", "# One")
            .file("b/two.md", "# Two");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        assert_eq!(keys(&plan), keys(&plan));
    }

    #[test]
    fn asset_only_directories_listed_separately() {
        let site = SiteFixture::new()
            .file("a/one.md", "# One")
            .file("assets/style.css", "body {}")
            .file("assets/img/logo.svg", "<svg/>");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let asset_keys: Vec<&str> = plan.asset_dirs().map(|d| d.key).collect();
        assert_eq!(asset_keys, vec!["assets", "assets/img"]);
        assert_eq!(keys(&plan), vec!["a"]);
    }

    #[test]
    fn root_level_files_use_empty_key() {
        let site = SiteFixture::new()
            .file("about.md", "# About")
            .file("favicon.ico", "ico");
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        let dir = plan.iter_dirs().next().unwrap().unwrap();
        assert_eq!(dir.key, "");
        assert_eq!(plan.output_dir_for(dir.dir), plan.output_dir());
    }

    #[test]
    fn empty_input_has_no_dirs() {
        let site = SiteFixture::new();
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        assert_eq!(plan.iter_dirs().count(), 0);
        assert!(plan.items().is_empty());
    }

    #[test]
    fn output_path_with_parent_components_is_skipped() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("public/a/one.html", "<h1>old</h1>")
            .file("public/index.html", "old index");
        let plan = Plan::build(&site.input(), &site.input().join("x/../public")).unwrap();
        assert_eq!(plan.output_dir(), site.input().join("public"));
        assert_eq!(plan.items().len(), 1);
        assert_eq!(
            plan.skipped(),
            &[(site.input().join("public"), SkipReason::InsideOutput)]
        );
    }

    #[test]
    fn normalize_resolves_dot_components() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")).unwrap(),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize(Path::new("/a/b/..")).unwrap(), PathBuf::from("/a"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("shared/logo.svg", "<svg/>");
        std::os::unix::fs::symlink(site.input().join("shared"), site.input().join("a/linked"))
            .unwrap();
        let plan = Plan::build(&site.input(), &site.output()).unwrap();

        let dir = plan.iter_dirs().next().unwrap().unwrap();
        assert_eq!(dir.items.len(), 1);
        assert_eq!(
            plan.skipped(),
            &[(site.input().join("a/linked"), SkipReason::SymlinkedDir)]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_planned() {
        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("shared/logo.svg", "<svg/>");
        std::os::unix::fs::symlink(
            site.input().join("shared/logo.svg"),
            site.input().join("a/logo.svg"),
        )
        .unwrap();
        let plan = Plan::build(&site.input(), &site.output()).unwrap();
        assert_eq!(find_item(&plan, "logo.svg").kind, FileKind::Other);
        assert!(plan.skipped().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_directory_names_stay_distinct() {
        use std::os::unix::ffi::OsStrExt;

        let site = SiteFixture::new();
        for (raw, post) in [(&b"d\xfe"[..], "one.md"), (&b"d\xff"[..], "two.md")] {
            let dir = site.input().join(OsStr::from_bytes(raw));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(post), "# Post").unwrap();
        }
        let plan = Plan::build(&site.input(), &site.output()).unwrap();

        let dirs: Vec<PostDir> = plan.iter_dirs().map(|d| d.unwrap()).collect();
        assert_eq!(dirs.len(), 2);
        assert_eq!(
            plan.output_dir_for(dirs[1].dir),
            site.output().join(OsStr::from_bytes(b"d\xff"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let site = SiteFixture::new()
            .file("a/one.md", "# Hello")
            .file("locked/two.md", "# Locked");
        let locked = site.input().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_dir(&locked).is_ok() {
            // Running with privileges that ignore permissions.
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let plan = Plan::build(&site.input(), &site.output());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        let plan = plan.unwrap();

        assert_eq!(keys(&plan), vec!["a"]);
        assert_eq!(plan.skipped(), &[(locked, SkipReason::Unreadable)]);
    }

    #[test]
    fn missing_input_directory_is_error() {
        let site = SiteFixture::new();
        let result = Plan::build(&site.input().join("nope"), &site.output());
        assert!(matches!(result, Err(PlanError::Walk(_))));
    }
}
