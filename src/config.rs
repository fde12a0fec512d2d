//! Blog configuration.
//!
//! Handles loading, validating, and layering `scribe.toml`. Stock defaults are
//! overridden by the config file, which is in turn overridden by command-line
//! flags (see [`Overrides`]).
//!
//! ## Config File Location
//!
//! `scribe.toml` is read from the working directory when present, or from the
//! path given with `--config`. It is never part of the input tree, so it is
//! not copied into the output.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [templates]
//! post = "template.html"       # Template for every post page
//! # index = "index.html"       # Template for index.html (defaults to post)
//!
//! [links]
//! prefix = ""                  # Prepended to every internal link, e.g. "/blog"
//!
//! [index]
//! heading = "Recent posts"     # Heading of the post listing
//! date_format = "%d %b %Y"     # strftime format for post dates (UTC)
//!
//! [markdown]
//! footnotes = true
//! tables = false
//! strikethrough = false
//! smart_punctuation = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "scribe.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Blog configuration loaded from `scribe.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Template file locations.
    pub templates: TemplatesConfig,
    /// Link generation settings.
    pub links: LinksConfig,
    /// Index page settings.
    pub index: IndexConfig,
    /// Markdown extensions.
    pub markdown: MarkdownConfig,
}

impl BlogConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.post.is_empty() {
            return Err(ConfigError::Validation(
                "templates.post must not be empty".into(),
            ));
        }
        if self.templates.index.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "templates.index must not be empty (omit it to reuse templates.post)".into(),
            ));
        }
        if self.index.heading.trim().is_empty() || self.index.heading.contains('\n') {
            return Err(ConfigError::Validation(
                "index.heading must be a single non-empty line".into(),
            ));
        }
        if self.index.date_format.is_empty()
            || StrftimeItems::new(&self.index.date_format).any(|i| matches!(i, Item::Error))
        {
            return Err(ConfigError::Validation(format!(
                "index.date_format is not a valid strftime format: {:?}",
                self.index.date_format
            )));
        }
        Ok(())
    }

    /// Path of the index template: `templates.index`, or the post template.
    pub fn index_template(&self) -> PathBuf {
        PathBuf::from(
            self.templates
                .index
                .as_deref()
                .unwrap_or(&self.templates.post),
        )
    }

    pub fn post_template(&self) -> PathBuf {
        PathBuf::from(&self.templates.post)
    }

    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(template) = &overrides.template {
            self.templates.post = template.to_string_lossy().to_string();
        }
        if let Some(index_template) = &overrides.index_template {
            self.templates.index = Some(index_template.to_string_lossy().to_string());
        }
        if let Some(prefix) = &overrides.link_prefix {
            self.links.prefix = prefix.clone();
        }
    }
}

/// Values given on the command line. `None` means "keep the config value".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub template: Option<PathBuf>,
    pub index_template: Option<PathBuf>,
    pub link_prefix: Option<String>,
}

/// Template file locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Template for post pages.
    pub post: String,
    /// Template for the index page. When absent the post template is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            post: "template.html".to_string(),
            index: None,
        }
    }
}

/// Link generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Prepended to every generated internal link, for sites served under a
    /// URL subpath. Empty means links are root-relative (`/posts/a/one.html`).
    pub prefix: String,
}

/// Index page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Heading line of the post listing.
    pub heading: String,
    /// strftime format for the date shown next to each post, in UTC.
    pub date_format: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            heading: "Recent posts".to_string(),
            date_format: "%d %b %Y".to_string(),
        }
    }
}

/// Markdown extensions passed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub footnotes: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub smart_punctuation: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            footnotes: true,
            tables: false,
            strikethrough: false,
            smart_punctuation: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BlogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BlogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BlogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is missing.
pub fn load_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Load config from `path`, which must exist.
pub fn load_required_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    match load_raw_config(path)? {
        Some(overlay) => resolve_config(stock_defaults_value(), Some(overlay)),
        None => Err(ConfigError::NotFound(path.to_path_buf())),
    }
}

/// Returns a fully-commented stock `scribe.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# scribe configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# Template for post pages. Must contain {{content}}; may contain {{title}},
# {{newer_link}} and {{older_link}}.
post = "template.html"

# Template for index.html. Omit to reuse the post template.
# index = "index-template.html"

# ---------------------------------------------------------------------------
# Links
# ---------------------------------------------------------------------------
[links]
# Prepended verbatim to every internal link, for blogs served under a
# subpath. Example: prefix = "/blog" gives links like /blog/2021-03-05/post.html
# (a trailing "/" is kept, giving "//" in links).
prefix = ""

# ---------------------------------------------------------------------------
# Index page
# ---------------------------------------------------------------------------
[index]
# Heading above the post listing.
heading = "Recent posts"

# strftime format for post dates (UTC). "%d %b %Y" renders as "05 Mar 2021".
date_format = "%d %b %Y"

# ---------------------------------------------------------------------------
# Markdown extensions
# ---------------------------------------------------------------------------
[markdown]
footnotes = true
tables = false
strikethrough = false
smart_punctuation = false
"##
}
