//! Blog generation.
//!
//! Stage 2 of the scribe pipeline. Takes the plan from [`crate::plan`],
//! renders every post through the post template, copies assets, and writes
//! the index page.
//!
//! ## Generated Pages
//!
//! - **Post pages** (`/{dir}/{post}.html`): the post's markdown rendered into
//!   the post template, linked to its neighbours
//! - **Index page** (`/index.html`): every post, newest first
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── index.html                   # Post listing
//! ├── 2021-03-05-hello/
//! │   ├── hello.html               # Rendered post
//! │   └── diagram.png              # Copied asset
//! ├── 2021-04-11-rust/
//! │   └── rust.html
//! └── assets/                      # Asset-only directory, copied verbatim
//!     └── style.css
//! ```
//!
//! ## Ordering of Work
//!
//! Templates are loaded and the whole plan is validated before the first
//! write, so a bad template or a directory with two markdown files fails the
//! run with nothing written. After that, writes happen in order and a failure
//! aborts the run, leaving whatever was already written in place.
//!
//! Post directories are processed in key order, then asset-only directories,
//! then the index page. In dry-run mode every step runs except directory
//! creation and file writes.

use crate::config::BlogConfig;
use crate::index;
use crate::links::{self, PostLinks};
use crate::markdown::{CommonMark, RenderMarkdown};
use crate::plan::{Plan, PlanError, PostDir};
use crate::report::{BuildEvent, RunReport};
use crate::template::{Template, TemplateError};
use crate::types::{FileKind, Item, PostRecord};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where to read from and write to for one run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Plan and render everything, but create and write nothing.
    pub dry_run: bool,
}

/// Both templates, loaded eagerly so errors surface before any work.
#[derive(Debug, Clone)]
pub struct Templates {
    pub post: Template,
    pub index: Template,
}

impl Templates {
    pub fn load(config: &BlogConfig) -> Result<Self, TemplateError> {
        Ok(Self {
            post: Template::load(&config.post_template())?,
            index: Template::load(&config.index_template())?,
        })
    }
}

/// A validated plan with links computed for every post.
#[derive(Debug)]
pub struct SitePlan {
    pub plan: Plan,
    /// Parallel to `plan.iter_dirs()`.
    pub links: Vec<PostLinks>,
}

/// What the generator does with an item's destination.
#[derive(Debug, Clone, PartialEq)]
enum Output {
    Rendered(String),
    Copy,
}

/// Load templates, build the plan, and sequence links without writing.
pub fn check(options: &BuildOptions, config: &BlogConfig) -> Result<SitePlan, GenerateError> {
    Templates::load(config)?;
    let plan = Plan::build(&options.input_dir, &options.output_dir)?;
    let links = sequence_posts(&config.links.prefix, &collect_post_dirs(&plan)?);
    Ok(SitePlan { plan, links })
}

/// Build the blog with the markdown renderer configured in `config`.
pub fn generate(options: &BuildOptions, config: &BlogConfig) -> Result<RunReport, GenerateError> {
    let renderer = CommonMark::new(&config.markdown);
    generate_with_renderer(&renderer, options, config)
}

/// Build the blog with a specific renderer (allows testing with a stub).
pub fn generate_with_renderer(
    renderer: &impl RenderMarkdown,
    options: &BuildOptions,
    config: &BlogConfig,
) -> Result<RunReport, GenerateError> {
    let templates = Templates::load(config)?;
    let plan = Plan::build(&options.input_dir, &options.output_dir)?;
    let post_dirs = collect_post_dirs(&plan)?;
    let links = sequence_posts(&config.links.prefix, &post_dirs);

    let mut generator = Generator {
        renderer,
        templates: &templates,
        dry_run: options.dry_run,
        created: HashSet::new(),
        report: RunReport::new(
            plan.input_dir().to_path_buf(),
            plan.output_dir().to_path_buf(),
            options.dry_run,
        ),
    };

    for (path, reason) in plan.skipped() {
        generator.report.record(BuildEvent::Skipped {
            path: path.clone(),
            reason: *reason,
        });
    }

    let mut posts = Vec::new();
    for (dir, links) in post_dirs.iter().zip(&links) {
        generator.report.record(BuildEvent::PostPlanned {
            dir: dir.key.to_string(),
            post: dir.post_name.clone(),
            newer_link: links.newer.clone(),
            older_link: links.older.clone(),
        });
        generator.ensure_dir(&plan.output_dir_for(dir.dir))?;
        for item in &dir.items {
            let output = match item.kind {
                FileKind::Markdown => {
                    let (record, text) = generator.render_post(item, links)?;
                    posts.push(record);
                    Output::Rendered(text)
                }
                FileKind::Other => Output::Copy,
            };
            generator.write_item(item, output)?;
        }
    }

    for dir in plan.asset_dirs() {
        generator.ensure_dir(&plan.output_dir_for(dir.dir))?;
        for item in dir.items {
            generator.write_item(item, Output::Copy)?;
        }
    }

    let page = index::build_index(
        &config.index,
        &posts,
        renderer,
        &templates.index,
        plan.output_dir(),
    );
    generator.ensure_dir(plan.output_dir())?;
    if !options.dry_run {
        fs::write(&page.path, &page.text).map_err(|source| GenerateError::Write {
            path: page.path.clone(),
            source,
        })?;
    }
    generator.report.record(BuildEvent::WroteIndex {
        path: page.path.clone(),
        posts: page.posts.len(),
    });
    generator.report.posts = page.posts;

    Ok(generator.report)
}

/// Materialize every post directory, failing on the first invalid one.
fn collect_post_dirs(plan: &Plan) -> Result<Vec<PostDir<'_>>, PlanError> {
    plan.iter_dirs().collect()
}

fn sequence_posts(prefix: &str, dirs: &[PostDir<'_>]) -> Vec<PostLinks> {
    let keys: Vec<(&str, &str)> = dirs
        .iter()
        .map(|d| (d.key, d.post_name.as_str()))
        .collect();
    links::sequence(prefix, &keys)
}

struct Generator<'a, R: RenderMarkdown> {
    renderer: &'a R,
    templates: &'a Templates,
    dry_run: bool,
    /// Directories already created (or that would have been) in this run.
    created: HashSet<PathBuf>,
    report: RunReport,
}

impl<R: RenderMarkdown> Generator<'_, R> {
    /// Create `path` and its parents unless it exists or this is a dry run.
    fn ensure_dir(&mut self, path: &Path) -> Result<(), GenerateError> {
        if path.is_dir() || !self.created.insert(path.to_path_buf()) {
            return Ok(());
        }
        self.report.record(BuildEvent::CreatedDir {
            path: path.to_path_buf(),
        });
        if !self.dry_run {
            fs::create_dir_all(path).map_err(|source| GenerateError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Render a markdown item into the post template.
    fn render_post(
        &mut self,
        item: &Item,
        links: &PostLinks,
    ) -> Result<(PostRecord, String), GenerateError> {
        let markdown =
            fs::read_to_string(&item.source.path).map_err(|source| GenerateError::Read {
                path: item.source.path.clone(),
                source,
            })?;
        let html = self.renderer.render(&markdown);
        let filled = self.templates.post.fill(&html, &links.newer, &links.older);

        self.report.record(BuildEvent::ExpandedTemplate {
            source: item.source.path.clone(),
            title: filled.title.clone(),
        });

        let record = PostRecord {
            title: filled.title,
            item: item.clone(),
            link: links.page.clone(),
        };
        Ok((record, filled.text))
    }

    /// Write rendered content, or copy the source bytes.
    fn write_item(&mut self, item: &Item, output: Output) -> Result<(), GenerateError> {
        let source = item.source.path.clone();
        let destination = item.destination.path.clone();
        let write_error = |source| GenerateError::Write {
            path: destination.clone(),
            source,
        };

        match output {
            Output::Rendered(text) => {
                if !self.dry_run {
                    fs::write(&destination, text).map_err(write_error)?;
                }
                self.report.record(BuildEvent::Wrote {
                    source,
                    destination,
                });
            }
            Output::Copy => {
                if !self.dry_run {
                    fs::copy(&source, &destination).map_err(write_error)?;
                }
                self.report.record(BuildEvent::Copied {
                    source,
                    destination,
                });
            }
        }
        Ok(())
    }
}
