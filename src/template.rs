//! Page templates with literal `{{placeholder}}` substitution.
//!
//! A template is a plain text file, usually HTML, containing:
//!
//! | Placeholder      | Replaced with                                  |
//! |------------------|------------------------------------------------|
//! | `{{content}}`    | rendered markdown (required)                   |
//! | `{{title}}`      | title extracted from the rendered markdown     |
//! | `{{newer_link}}` | link to the next post, or to the index page    |
//! | `{{older_link}}` | link to the previous post, or to the index page|
//!
//! Substitution is plain text: values are inserted unescaped, and placeholders
//! are replaced in the order of the table above. A value that happens to
//! contain a later placeholder will therefore be substituted again, which is
//! stable from run to run.

use crate::title::extract_title;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONTENT: &str = "{{content}}";
pub const TITLE: &str = "{{title}}";
pub const NEWER_LINK: &str = "{{newer_link}}";
pub const OLDER_LINK: &str = "{{older_link}}";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Error reading template file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error in template {path}: missing {{{{content}}}} var")]
    Validation { path: PathBuf },
}

/// A loaded, validated template.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    body: String,
}

/// The result of filling a template for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Filled {
    pub title: String,
    pub text: String,
}

impl Template {
    /// Read and validate a template file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let body = std::fs::read_to_string(path).map_err(|source| TemplateError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_string(path, body)
    }

    /// Build a template from text already in memory. `path` is only used in
    /// error messages.
    pub fn from_string(path: &Path, body: String) -> Result<Self, TemplateError> {
        if !body.contains(CONTENT) {
            return Err(TemplateError::Validation {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            body,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Substitute rendered content and links into the template.
    ///
    /// Empty links leave their placeholders replaced with nothing.
    pub fn fill(&self, content: &str, newer_link: &str, older_link: &str) -> Filled {
        let title = extract_title(content);
        let text = self
            .body
            .replace(CONTENT, content)
            .replace(TITLE, &title)
            .replace(NEWER_LINK, newer_link)
            .replace(OLDER_LINK, older_link);
        Filled { title, text }
    }
}
