//! Internal link validation.
//!
//! Extracts every cross-reference — markdown links and images in document
//! bodies, navbar and footer hrefs, navbar sidebar references — and resolves
//! each internal one against the emitted route set. What happens on a miss
//! is governed by `on_broken_links`:
//!
//! - `ignore` — no resolution at all
//! - `warn`   — broken links land in the build report, build succeeds
//! - `throw`  — the build fails, listing every broken link (the default;
//!   broken internal links must never silently ship)
//!
//! External targets (`http://`, `https://`, protocol-relative `//host/...`,
//! `mailto:`, `tel:`) are exempt from resolution but recorded so a liveness
//! checker outside this pipeline could consume them. Pure-fragment links
//! (`#section`) are skipped.
//!
//! Targets are resolved in parallel and the results re-sorted by
//! (source, target), so reports are deterministic regardless of worker order.

use crate::config::{BrokenLinkPolicy, NavbarItemKind, SiteConfig};
use crate::routes::RouteSet;
use crate::sidebar::Sidebar;
use crate::types::ContentNode;
use pulldown_cmark::{Event, Parser, Tag};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("{} broken internal link(s):\n{}", .0.len(), format_broken(.0))]
    Broken(Vec<BrokenLink>),
}

fn format_broken(links: &[BrokenLink]) -> String {
    links
        .iter()
        .map(|b| format!("  {b}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A reference extracted from content or config, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkTarget {
    /// Where the link was written: a source path, or a config location
    /// like `navbar` / `footer:Contact us`.
    pub source: String,
    /// The raw href as written.
    pub target: String,
}

/// An internal target that resolved to no route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BrokenLink {
    pub source: String,
    pub target: String,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Broken links found (empty under `ignore`, fatal under `throw`).
    pub broken: Vec<BrokenLink>,
    /// External targets, recorded for out-of-pipeline liveness checking.
    pub external: Vec<LinkTarget>,
}

/// Extract link and image destinations from a document body.
pub fn extract_doc_links(node: &ContentNode) -> Vec<LinkTarget> {
    let mut targets = Vec::new();
    for event in Parser::new(&node.body) {
        let dest = match event {
            Event::Start(Tag::Link { dest_url, .. }) => dest_url,
            Event::Start(Tag::Image { dest_url, .. }) => dest_url,
            _ => continue,
        };
        targets.push(LinkTarget {
            source: node.source_path.clone(),
            target: dest.to_string(),
        });
    }
    targets
}

/// Extract targets declared in config: navbar hrefs, navbar sidebar
/// references (`sidebar:<id>`), and footer item hrefs.
pub fn extract_config_links(config: &SiteConfig) -> Vec<LinkTarget> {
    let mut targets = Vec::new();
    for item in &config.navbar.items {
        match item.kind {
            NavbarItemKind::Link => {
                if let Some(href) = &item.href {
                    targets.push(LinkTarget {
                        source: "navbar".to_string(),
                        target: href.clone(),
                    });
                }
            }
            NavbarItemKind::DocSidebar => {
                if let Some(id) = &item.sidebar_id {
                    targets.push(LinkTarget {
                        source: "navbar".to_string(),
                        target: format!("sidebar:{id}"),
                    });
                }
            }
        }
    }
    for group in &config.footer.links {
        for item in &group.items {
            targets.push(LinkTarget {
                source: format!("footer:{}", group.title),
                target: item.href.clone(),
            });
        }
    }
    targets
}

/// Whether a target points off-site and is exempt from resolution.
/// Protocol-relative targets (`//host/...`) name another host too.
pub fn is_external(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//")
        || target.starts_with("mailto:")
        || target.starts_with("tel:")
}

/// Resolve every target against the route set under the configured policy.
///
/// Returns the report on success; under `throw`, any broken link is an
/// error carrying the full sorted list.
pub fn validate(
    targets: Vec<LinkTarget>,
    routes: &RouteSet,
    sidebars: &[Sidebar],
    policy: BrokenLinkPolicy,
) -> Result<ValidationReport, LinkError> {
    if policy == BrokenLinkPolicy::Ignore {
        return Ok(ValidationReport::default());
    }

    let (external, internal): (Vec<_>, Vec<_>) =
        targets.into_iter().partition(|t| is_external(&t.target));

    let mut broken: Vec<BrokenLink> = internal
        .par_iter()
        .filter(|t| !resolves(t, routes, sidebars))
        .map(|t| BrokenLink {
            source: t.source.clone(),
            target: t.target.clone(),
        })
        .collect();
    broken.sort();

    let mut external = external;
    external.sort();

    if policy == BrokenLinkPolicy::Throw && !broken.is_empty() {
        return Err(LinkError::Broken(broken));
    }
    Ok(ValidationReport { broken, external })
}

fn resolves(target: &LinkTarget, routes: &RouteSet, sidebars: &[Sidebar]) -> bool {
    if let Some(id) = target.target.strip_prefix("sidebar:") {
        return sidebars.iter().any(|s| s.name == id);
    }
    let Some(path) = normalize(&target.target, &target.source, &routes.base_url) else {
        // Pure fragments and unresolvable relative paths that escape the
        // site root; the former are fine, the latter can't match anything.
        return target.target.starts_with('#');
    };
    routes.resolves(&path)
}

/// Normalize an internal href into a site-relative route slug.
///
/// Handles absolute site paths (`/base/guide/install`), document-relative
/// markdown links (`../install.md`), fragments, and queries. Returns None
/// for pure-fragment links and for relative paths that climb out of the
/// content root.
fn normalize(target: &str, source: &str, base_url: &str) -> Option<String> {
    let raw = target
        .split(['#', '?'])
        .next()
        .unwrap_or_default();
    if raw.is_empty() {
        return None;
    }

    let site_relative = if let Some(abs) = raw.strip_prefix('/') {
        // Absolute: strip the base_url prefix when present. The prefix
        // only counts at a `/` boundary ("/projectX" is not under
        // "/project/").
        let base = base_url.trim_matches('/');
        let abs = abs.strip_suffix('/').unwrap_or(abs);
        if base.is_empty() {
            abs.to_string()
        } else if abs == base {
            String::new()
        } else if let Some(rest) = abs
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            rest.to_string()
        } else {
            abs.to_string()
        }
    } else {
        // Document-relative: resolve against the source file's directory.
        let dir = match source.rfind('/') {
            Some(pos) => &source[..pos],
            None => "",
        };
        resolve_relative(dir, raw)?
    };

    // A .md target names a document by source path; its route slug is the
    // extension-stripped id (index files route as their directory).
    let slug = if let Some(stem) = site_relative
        .strip_suffix(".md")
        .or_else(|| site_relative.strip_suffix(".mdx"))
    {
        match stem.rsplit_once('/') {
            Some((dir, leaf)) if leaf == "index" || leaf == "README" => dir.to_string(),
            None if stem == "index" || stem == "README" => String::new(),
            _ => stem.to_string(),
        }
    } else {
        site_relative
    };
    Some(slug)
}

/// Join a directory and a relative path, folding `.` and `..`.
fn resolve_relative(dir: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };
    for component in rel.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
