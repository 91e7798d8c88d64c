//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Configuration is a
//! single explicit struct constructed once and passed by reference through
//! the pipeline — there is no ambient global.
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "My Project Docs"
//! tagline = ""
//! url = "https://example.github.io"
//! base_url = "/my-project/"
//! organization_name = "example"
//! project_name = "my-project"
//! on_broken_links = "throw"     # ignore | warn | throw
//!
//! [i18n]
//! default_locale = "en"
//! locales = ["en"]
//!
//! [theme]
//! # Free-form aspect map layered over the stock preset. Unknown aspects
//! # pass through to the emitted route set untouched.
//!
//! [[navbar.items]]
//! type = "doc_sidebar"
//! sidebar_id = "docs"
//! label = "Documentation"
//! position = "left"
//!
//! [[footer.links]]
//! title = "Community"
//! items = [{ label = "GitHub", href = "https://github.com/example" }]
//!
//! [[sidebars]]
//! name = "docs"
//! entries = ["intro", { label = "Guide", items = ["guide/install"] }]
//! ```
//!
//! ## Partial Configuration
//!
//! `site.toml` is sparse — user values are merged on top of stock defaults,
//! so a config file only needs the keys it overrides. Unknown keys in the
//! structured sections are rejected to catch typos early; the `[theme]`
//! table is the one deliberate exception (aspects pass through opaquely).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the config file looked up in the content root.
pub const CONFIG_FILE: &str = "site.toml";

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected except in
/// the free-form `theme` aspect map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown by consumers of the route set.
    pub title: String,
    /// Short tagline for the landing page.
    pub tagline: String,
    /// Canonical site URL (host only, no path).
    pub url: String,
    /// Path prefix every emitted route starts with. Must begin and end
    /// with `/`.
    pub base_url: String,
    /// GitHub organization or user that owns the site.
    pub organization_name: String,
    /// Repository / project name.
    pub project_name: String,
    /// What to do when an internal link does not resolve to a route.
    pub on_broken_links: BrokenLinkPolicy,
    /// Locale declarations.
    pub i18n: I18nConfig,
    /// Free-form theme aspect overrides, layered over the stock preset.
    pub theme: toml::Table,
    /// Top navigation bar.
    pub navbar: NavbarConfig,
    /// Footer link groups.
    pub footer: FooterConfig,
    /// Explicit sidebar definitions.
    pub sidebars: Vec<SidebarDef>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            tagline: String::new(),
            url: String::new(),
            base_url: "/".to_string(),
            organization_name: String::new(),
            project_name: String::new(),
            on_broken_links: BrokenLinkPolicy::default(),
            i18n: I18nConfig::default(),
            theme: toml::Table::new(),
            navbar: NavbarConfig::default(),
            footer: FooterConfig::default(),
            sidebars: Vec::new(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values after merging.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with('/') || !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_url must start and end with '/', got {:?}",
                self.base_url
            )));
        }
        if self.i18n.locales.is_empty() {
            return Err(ConfigError::Validation(
                "i18n.locales must not be empty".into(),
            ));
        }
        if self.i18n.default_locale.is_empty() {
            return Err(ConfigError::Validation(
                "i18n.default_locale must not be empty".into(),
            ));
        }
        for item in &self.navbar.items {
            match item.kind {
                NavbarItemKind::DocSidebar if item.sidebar_id.is_none() => {
                    return Err(ConfigError::Validation(format!(
                        "navbar item {:?} has type doc_sidebar but no sidebar_id",
                        item.label
                    )));
                }
                NavbarItemKind::Link if item.href.is_none() => {
                    return Err(ConfigError::Validation(format!(
                        "navbar item {:?} has type link but no href",
                        item.label
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Failure policy for unresolved internal links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokenLinkPolicy {
    /// Skip link resolution entirely.
    Ignore,
    /// Report broken links in the build report, build still succeeds.
    Warn,
    /// Fail the build on the first validation pass that finds broken links.
    #[default]
    Throw,
}

impl fmt::Display for BrokenLinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenLinkPolicy::Ignore => write!(f, "ignore"),
            BrokenLinkPolicy::Warn => write!(f, "warn"),
            BrokenLinkPolicy::Throw => write!(f, "throw"),
        }
    }
}

/// Locale declarations. Exactly one locale — the default — must appear in
/// `locales`; the others are translated via the `i18n/<code>/` tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    pub default_locale: String,
    pub locales: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: vec!["en".to_string()],
        }
    }
}

/// Top navigation bar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarConfig {
    pub items: Vec<NavbarItem>,
}

/// One navbar entry: either a sidebar reference or a plain link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavbarItem {
    #[serde(rename = "type")]
    pub kind: NavbarItemKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_id: Option<String>,
    #[serde(default)]
    pub position: NavbarPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavbarItemKind {
    /// Points at a named sidebar; the item links to the sidebar's first doc.
    DocSidebar,
    /// Plain link, internal (`/path`) or external (`https://...`).
    Link,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavbarPosition {
    #[default]
    Left,
    Right,
}

/// Footer link groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterConfig {
    pub style: String,
    pub copyright: String,
    pub links: Vec<FooterGroup>,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            style: "dark".to_string(),
            copyright: String::new(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FooterGroup {
    pub title: String,
    pub items: Vec<FooterItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FooterItem {
    pub label: String,
    pub href: String,
}

/// An explicit sidebar definition from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarDef {
    pub name: String,
    pub entries: Vec<SidebarDefEntry>,
}

/// One declared sidebar entry: a bare document id, or a labelled category
/// with nested entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarDefEntry {
    Doc(String),
    Category {
        label: String,
        items: Vec<SidebarDefEntry>,
    },
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for scanning and link resolution.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
///
/// This deep merge is for *config file* loading only. Theme aspect layering
/// uses the shallow per-aspect merge in [`crate::theme`].
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

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if it exists but contains invalid TOML.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docsmith Site Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error,
# except inside [theme], which passes every aspect through to the emitted
# route set untouched.

# Site identity.
title = "Documentation"
tagline = ""

# Canonical URL (host only) and the path prefix for every route.
# base_url must start and end with '/'.
url = ""
base_url = "/"

# Repository coordinates, surfaced to route-set consumers.
organization_name = ""
project_name = ""

# What to do when an internal link does not resolve to a route:
#   "ignore" - skip link resolution entirely
#   "warn"   - report broken links, build still succeeds
#   "throw"  - fail the build, listing every broken link
on_broken_links = "throw"

# ---------------------------------------------------------------------------
# Locales
# ---------------------------------------------------------------------------
# The default locale is served at base_url; every other locale is served
# under base_url + "<code>/". Translations live in i18n/<code>/, mirroring
# the content tree. A missing translation falls back to the default locale
# per document.
[i18n]
default_locale = "en"
locales = ["en"]

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
# Free-form aspect map merged over the stock preset, one aspect at a time,
# last layer wins. Overriding an aspect replaces it wholesale.
[theme]
# [theme.color_mode]
# default_mode = "light"
# respect_prefers_color_scheme = true
#
# [theme.prism]
# theme = "github"
# dark_theme = "dracula"

# ---------------------------------------------------------------------------
# Navbar
# ---------------------------------------------------------------------------
# [[navbar.items]]
# type = "doc_sidebar"       # links to the first doc of a named sidebar
# sidebar_id = "docs"
# label = "Documentation"
# position = "left"
#
# [[navbar.items]]
# type = "link"
# label = "GitHub"
# href = "https://github.com/example/project"
# position = "right"

# ---------------------------------------------------------------------------
# Footer
# ---------------------------------------------------------------------------
[footer]
style = "dark"
copyright = ""
# [[footer.links]]
# title = "Contact us"
# items = [{ label = "Maintainer", href = "mailto:docs@example.org" }]

# ---------------------------------------------------------------------------
# Sidebars
# ---------------------------------------------------------------------------
# Explicit ordering for navigation trees. Entries are document ids
# (relative path without extension) or categories with nested items.
# Documents not mentioned by any sidebar are auto-appended in scan order,
# grouped by directory.
# [[sidebars]]
# name = "docs"
# entries = [
#     "intro",
#     { label = "Guide", items = ["guide/install", "guide/usage"] },
# ]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for scanning and link resolution.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4
"##
}
