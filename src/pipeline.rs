//! Build orchestration.
//!
//! Drives the stages in dependency order:
//!
//! ```text
//! Scanning → SidebarBuilding → LocaleComposing → ThemeComposing
//!          → LinkValidating → Emitting → Done
//! ```
//!
//! Any stage error is terminal for the current build — a partially-resolved
//! documentation site is worse than a failed build — and carries the stage
//! that detected it plus the offending path or reference. The one
//! configurable leniency is link validation under the `warn`/`ignore`
//! policies. No state survives between builds; `build` is a pure transform
//! of (content tree, config) → (route set | failure), so aborting between
//! stages simply drops the partial state.

use crate::config::{self, ConfigError, SiteConfig};
use crate::links::{self, BrokenLink, LinkError, LinkTarget};
use crate::locale::{self, LocaleError};
use crate::routes::{self, RouteError, RouteSet};
use crate::scan::{self, ScanError};
use crate::sidebar::{self, Sidebar, SidebarError};
use crate::theme;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Pipeline stage names, used in diagnostics and the build report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStage {
    Scanning,
    SidebarBuilding,
    LocaleComposing,
    ThemeComposing,
    LinkValidating,
    Emitting,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Scanning => "scanning",
            BuildStage::SidebarBuilding => "sidebar building",
            BuildStage::LocaleComposing => "locale composing",
            BuildStage::ThemeComposing => "theme composing",
            BuildStage::LinkValidating => "link validating",
            BuildStage::Emitting => "emitting",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("scan: {0}")]
    Scan(#[from] ScanError),
    #[error("sidebar: {0}")]
    Sidebar(#[from] SidebarError),
    #[error("locale: {0}")]
    Locale(#[from] LocaleError),
    #[error("routes: {0}")]
    Route(#[from] RouteError),
    #[error("links: {0}")]
    Link(#[from] LinkError),
}

impl BuildError {
    /// The stage that detected the failure.
    pub fn stage(&self) -> BuildStage {
        match self {
            BuildError::Config(_) | BuildError::Scan(_) => BuildStage::Scanning,
            BuildError::Sidebar(_) => BuildStage::SidebarBuilding,
            BuildError::Locale(_) => BuildStage::LocaleComposing,
            BuildError::Route(_) => BuildStage::Emitting,
            BuildError::Link(_) => BuildStage::LinkValidating,
        }
    }
}

/// Summary of a successful build, serialized next to the route manifest.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub documents: usize,
    pub assets: usize,
    pub locales: usize,
    pub sidebars: usize,
    pub routes: usize,
    /// Broken links found under the `warn` policy (empty otherwise).
    pub warnings: Vec<BrokenLink>,
    /// Off-site targets, recorded for external liveness tooling.
    pub external_links: usize,
}

/// Everything a successful build produces.
#[derive(Debug)]
pub struct BuildOutput {
    pub config: SiteConfig,
    pub sidebars: Vec<Sidebar>,
    pub routes: RouteSet,
    pub report: BuildReport,
}

/// Run the whole pipeline over a content root.
pub fn build(root: &Path) -> Result<BuildOutput, BuildError> {
    let config = config::load_config(root)?;
    build_with_config(root, config)
}

/// Run the pipeline with an already-loaded config (the CLI loads it first
/// to size the worker pool).
pub fn build_with_config(root: &Path, config: SiteConfig) -> Result<BuildOutput, BuildError> {
    // Scanning
    let nodes = scan::scan(root)?;

    // SidebarBuilding
    let sidebars = sidebar::resolve(&nodes, &config.sidebars)?;

    // LocaleComposing
    let locales = locale::locales_from_config(&config.i18n)?;
    let mut translations = BTreeMap::new();
    for loc in locales.iter().filter(|l| !l.default) {
        translations.insert(loc.code.clone(), scan::scan_translations(root, &loc.code)?);
    }
    let views = locale::compose(&locales, &nodes, &translations)?;

    // ThemeComposing
    let resolved_theme = theme::compose(&config.theme);

    // Emitting runs before LinkValidating because targets resolve against
    // the route set; nothing is written until validation passes.
    let route_set = routes::emit(&config, &views, &nodes, resolved_theme)?;

    // LinkValidating
    let mut targets: Vec<LinkTarget> = Vec::new();
    for view in &views {
        for node in &view.nodes {
            targets.extend(links::extract_doc_links(node));
        }
    }
    targets.extend(links::extract_config_links(&config));
    targets.sort();
    targets.dedup();
    let validation = links::validate(targets, &route_set, &sidebars, config.on_broken_links)?;

    let report = BuildReport {
        documents: nodes.iter().filter(|n| n.is_document()).count(),
        assets: nodes.len() - nodes.iter().filter(|n| n.is_document()).count(),
        locales: views.len(),
        sidebars: sidebars.len(),
        routes: route_set.routes.len(),
        warnings: validation.broken,
        external_links: validation.external.len(),
    };

    Ok(BuildOutput {
        config,
        sidebars,
        routes: route_set,
        report,
    })
}
