//! Route emission.
//!
//! Final stage of the build pipeline. Combines the per-locale document
//! views, the resolved theme, and the site configuration into the route set:
//! a mapping from route path to page descriptor, suitable for static file
//! emission by a renderer.
//!
//! Emission is a pure function of its inputs — no filesystem access, no
//! global state — and the route map is a `BTreeMap`, so serializing the
//! same inputs twice yields byte-identical output.
//!
//! Route paths must be unique. Slug uniqueness within a locale is enforced
//! at scan time, but paths can still collide across namespaces: a content
//! directory named like a locale code shadows that locale's prefix, and an
//! extensionless asset can share a path with a document slug. Emission
//! refuses to overwrite — any collision is a [`RouteError`] naming both
//! occupants.
//!
//! ## Path Layout
//!
//! ```text
//! /<base_url>/                      landing page (default locale)
//! /<base_url>/<slug>                default-locale document
//! /<base_url>/<code>/               landing page, locale <code>
//! /<base_url>/<code>/<slug>         translated (or fallback) document
//! /<base_url>/<asset path>          asset, emitted once, not per locale
//! ```

use crate::config::SiteConfig;
use crate::locale::LocaleView;
use crate::types::{ContentKind, ContentNode};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("{first} and {second} both emit route path {path:?}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
}

/// What a route points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Document,
    Index,
    Asset,
    /// Synthesized landing page when the content tree has no root index.
    Landing,
}

/// Everything a renderer needs to emit one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageDescriptor {
    /// Content identity, or `"__landing"` for the synthetic landing page.
    pub id: String,
    /// Source file relative to the content root. Empty for synthetic pages.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_path: String,
    pub kind: PageKind,
    pub locale: String,
    pub title: String,
    /// True when the page body comes from an `i18n/<code>/` translation
    /// rather than default-locale fallback.
    pub translated: bool,
}

/// The emitted site: unique route paths, the resolved theme snapshot, and
/// enough config for a renderer to build chrome around each page.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSet {
    pub title: String,
    pub base_url: String,
    pub theme: toml::Table,
    pub routes: BTreeMap<String, PageDescriptor>,
}

impl RouteSet {
    /// Whether a normalized site-relative path (no base_url, no leading or
    /// trailing slash) resolves to a route. Locale roots are keyed with a
    /// trailing slash, so both forms are checked.
    pub fn resolves(&self, site_relative: &str) -> bool {
        self.routes.contains_key(&join_path(&self.base_url, site_relative))
            || (!site_relative.is_empty()
                && self
                    .routes
                    .contains_key(&format!("{}{}/", self.base_url, site_relative)))
    }

    /// Deterministic JSON form of the route set.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the full route path for a site-relative slug.
pub fn join_path(base_url: &str, slug: &str) -> String {
    if slug.is_empty() {
        base_url.to_string()
    } else {
        format!("{base_url}{slug}")
    }
}

/// Slug as seen from one locale: non-default locales are namespaced by a
/// `<code>/` prefix, which keeps paths unique across locales.
fn locale_slug(view_code: &str, default: bool, slug: &str) -> String {
    if default {
        slug.to_string()
    } else if slug.is_empty() {
        format!("{view_code}/")
    } else {
        format!("{view_code}/{slug}")
    }
}

/// Insert a route, refusing to overwrite an occupied path.
fn insert_route(
    routes: &mut BTreeMap<String, PageDescriptor>,
    path: String,
    descriptor: PageDescriptor,
) -> Result<(), RouteError> {
    if let Some(existing) = routes.get(&path) {
        return Err(RouteError::DuplicatePath {
            path,
            first: format!("{} ({})", existing.id, existing.locale),
            second: format!("{} ({})", descriptor.id, descriptor.locale),
        });
    }
    routes.insert(path, descriptor);
    Ok(())
}

/// Emit the route set from composed views and the resolved theme.
///
/// Document slugs are unique within a view (enforced at scan time), but a
/// directory named like a locale code or an extensionless asset can still
/// land on an occupied path; those collisions are errors, never overwrites.
pub fn emit(
    config: &SiteConfig,
    views: &[LocaleView],
    assets: &[ContentNode],
    theme: toml::Table,
) -> Result<RouteSet, RouteError> {
    let mut routes = BTreeMap::new();

    for view in views {
        let mut has_root = false;
        for node in &view.nodes {
            if node.slug.is_empty() {
                has_root = true;
            }
            let slug = locale_slug(&view.code, view.default, &node.slug);
            insert_route(
                &mut routes,
                join_path(&config.base_url, &slug),
                PageDescriptor {
                    id: node.id.clone(),
                    source_path: node.source_path.clone(),
                    kind: match node.kind {
                        ContentKind::Index => PageKind::Index,
                        _ => PageKind::Document,
                    },
                    locale: view.code.clone(),
                    title: node.title.clone(),
                    translated: view.translated.contains(&node.id),
                },
            )?;
        }

        // A root index doc claims the landing slot; synthesize one per
        // locale otherwise.
        if !has_root {
            let slug = locale_slug(&view.code, view.default, "");
            insert_route(
                &mut routes,
                join_path(&config.base_url, &slug),
                PageDescriptor {
                    id: "__landing".to_string(),
                    source_path: String::new(),
                    kind: PageKind::Landing,
                    locale: view.code.clone(),
                    title: config.title.clone(),
                    translated: false,
                },
            )?;
        }
    }

    let default_code = views
        .iter()
        .find(|v| v.default)
        .map(|v| v.code.clone())
        .unwrap_or_default();
    for asset in assets.iter().filter(|n| n.kind == ContentKind::Asset) {
        insert_route(
            &mut routes,
            join_path(&config.base_url, &asset.source_path),
            PageDescriptor {
                id: asset.id.clone(),
                source_path: asset.source_path.clone(),
                kind: PageKind::Asset,
                locale: default_code.clone(),
                title: String::new(),
                translated: false,
            },
        )?;
    }

    Ok(RouteSet {
        title: config.title.clone(),
        base_url: config.base_url.clone(),
        theme,
        routes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale;
    use crate::test_helpers::*;
    use crate::theme;
    use std::collections::BTreeMap as Map;

    fn emit_fixture(config: &SiteConfig) -> RouteSet {
        let tmp = setup_fixtures();
        let nodes = crate::scan::scan(tmp.path()).unwrap();
        let fr = crate::scan::scan_translations(tmp.path(), "fr").unwrap();
        let translations = Map::from([("fr".to_string(), fr)]);
        let locales = locale::locales_from_config(&config.i18n).unwrap();
        let views = locale::compose(&locales, &nodes, &translations).unwrap();
        emit(config, &views, &nodes, theme::compose(&config.theme)).unwrap()
    }

    fn two_locale_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.base_url = "/project/".to_string();
        config.i18n.locales = vec!["en".to_string(), "fr".to_string()];
        config
    }

    #[test]
    fn default_locale_routes_at_base_url() {
        let routes = emit_fixture(&two_locale_config());
        assert!(routes.routes.contains_key("/project/"));
        assert!(routes.routes.contains_key("/project/getting-started"));
        assert!(routes.routes.contains_key("/project/guide/install"));
    }

    #[test]
    fn non_default_locale_routes_namespaced() {
        let routes = emit_fixture(&two_locale_config());
        assert!(routes.routes.contains_key("/project/fr/"));
        assert!(routes.routes.contains_key("/project/fr/getting-started"));
        // Fallback docs still get a route under the locale prefix.
        assert!(routes.routes.contains_key("/project/fr/reference/protocol"));
    }

    #[test]
    fn translated_flag_reflects_actual_translation() {
        let routes = emit_fixture(&two_locale_config());
        assert!(routes.routes["/project/fr/getting-started"].translated);
        assert!(!routes.routes["/project/fr/reference/protocol"].translated);
        assert!(!routes.routes["/project/getting-started"].translated);
    }

    #[test]
    fn assets_emitted_once_without_locale_prefix() {
        let routes = emit_fixture(&two_locale_config());
        assert!(routes.routes.contains_key("/project/img/logo.svg"));
        assert!(!routes.routes.contains_key("/project/fr/img/logo.svg"));
        assert_eq!(routes.routes["/project/img/logo.svg"].kind, PageKind::Asset);
    }

    #[test]
    fn root_index_doc_claims_landing_slot() {
        let routes = emit_fixture(&two_locale_config());
        // Fixtures have a root index.md, so no synthetic landing page.
        assert_eq!(routes.routes["/project/"].kind, PageKind::Index);
    }

    #[test]
    fn landing_synthesized_when_no_root_index() {
        let tmp = content_dir(&[("getting-started.md", "# Start\n")]);
        let config = SiteConfig::default();
        let nodes = crate::scan::scan(tmp.path()).unwrap();
        let locales = locale::locales_from_config(&config.i18n).unwrap();
        let views = locale::compose(&locales, &nodes, &Map::new()).unwrap();
        let routes = emit(&config, &views, &nodes, toml::Table::new()).unwrap();

        let landing = &routes.routes["/"];
        assert_eq!(landing.kind, PageKind::Landing);
        assert_eq!(landing.id, "__landing");
        assert_eq!(landing.title, config.title);
    }

    #[test]
    fn route_paths_unique_across_locales() {
        let routes = emit_fixture(&two_locale_config());
        // BTreeMap keys are unique by construction; verify the locale split
        // actually produced distinct path spaces.
        let en = routes
            .routes
            .iter()
            .filter(|(_, d)| d.locale == "en" && d.kind != PageKind::Asset)
            .count();
        let fr = routes
            .routes
            .iter()
            .filter(|(_, d)| d.locale == "fr")
            .count();
        assert_eq!(en, fr);
    }

    #[test]
    fn emission_is_deterministic() {
        let config = two_locale_config();
        let first = emit_fixture(&config).to_json().unwrap();
        let second = emit_fixture(&config).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resolves_normalized_site_relative_paths() {
        let routes = emit_fixture(&two_locale_config());
        assert!(routes.resolves("getting-started"));
        assert!(routes.resolves("fr/getting-started"));
        assert!(routes.resolves(""));
        assert!(!routes.resolves("docs/nope"));
    }

    #[test]
    fn directory_named_like_locale_code_collides() {
        // fr/page.md emits /fr/page in the default locale; the fr view of
        // page.md claims the same path. Must error, not overwrite.
        let tmp = content_dir(&[("page.md", "# Page\n"), ("fr/page.md", "# Page\n")]);
        let mut config = SiteConfig::default();
        config.i18n.locales = vec!["en".to_string(), "fr".to_string()];
        let nodes = crate::scan::scan(tmp.path()).unwrap();
        let locales = locale::locales_from_config(&config.i18n).unwrap();
        let views = locale::compose(&locales, &nodes, &Map::new()).unwrap();

        let err = emit(&config, &views, &nodes, toml::Table::new()).unwrap_err();
        let RouteError::DuplicatePath { path, first, second } = &err;
        assert_eq!(path, "/fr/page");
        assert!(first.contains("fr/page"), "first: {first}");
        assert!(second.contains("page"), "second: {second}");
    }

    #[test]
    fn asset_sharing_a_document_slug_collides() {
        // An extensionless asset named "guide" lands on guide.md's route.
        let tmp = content_dir(&[("guide.md", "# Guide\n"), ("guide", "raw bytes")]);
        let config = SiteConfig::default();
        let nodes = crate::scan::scan(tmp.path()).unwrap();
        let locales = locale::locales_from_config(&config.i18n).unwrap();
        let views = locale::compose(&locales, &nodes, &Map::new()).unwrap();

        let err = emit(&config, &views, &nodes, toml::Table::new()).unwrap_err();
        let RouteError::DuplicatePath { path, .. } = &err;
        assert_eq!(path, "/guide");
    }

    #[test]
    fn theme_snapshot_carried_in_route_set() {
        let mut config = two_locale_config();
        config.theme = toml::from_str("[prism]\ntheme = \"nord\"").unwrap();
        let routes = emit_fixture(&config);
        assert_eq!(
            routes.theme["prism"].get("theme").unwrap().as_str(),
            Some("nord")
        );
        // Preset aspects composed underneath.
        assert!(routes.theme.contains_key("color_mode"));
    }
}
