//! # docsmith
//!
//! A minimal build pipeline for static documentation sites. A tree of
//! markdown documents plus one declarative `site.toml` becomes a navigable,
//! themed, internationalized, link-checked route set.
//!
//! # Architecture: Staged Pipeline
//!
//! A build runs the stages in dependency order, each a pure function from
//! the previous stage's output:
//!
//! ```text
//! 1. Scan      docs/      →  Vec<ContentNode>     (filesystem → structured data)
//! 2. Sidebars  nodes      →  navigation trees     (explicit order + inference)
//! 3. Locales   nodes      →  per-locale views     (translation + fallback)
//! 4. Theme     site.toml  →  resolved aspect map  (preset < overrides)
//! 5. Links     routes     →  validation report    (ignore | warn | throw)
//! 6. Emit      all above  →  route set            (path → page descriptor)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Strictness**: every stage fails loudly on its own error class
//!   (`ScanError`, `SidebarError`, `LocaleError`, `RouteError`,
//!   `LinkError`) — a partially-resolved site never ships.
//! - **Determinism**: per-file parsing and per-target link resolution run in
//!   parallel, but every intermediate sequence is re-sorted by a stable key,
//!   so identical inputs always emit byte-identical output.
//! - **Testability**: stages are pure functions over plain data; unit tests
//!   exercise pipeline logic without a renderer or a server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — walks the content tree, parses front-matter, produces the node sequence |
//! | [`sidebar`] | Stage 2 — resolves named navigation trees from config and ordering hints |
//! | [`locale`] | Stage 3 — composes per-locale document views with per-document fallback |
//! | [`theme`] | Stage 4 — layers theme aspects, preset under site overrides |
//! | [`links`] | Stage 5 — extracts and resolves internal cross-references |
//! | [`routes`] | Stage 6 — emits the final route-path → page-descriptor map |
//! | [`pipeline`] | Orchestration: runs the stages, builds the report |
//! | [`config`] | `site.toml` loading, merging, and validation |
//! | [`frontmatter`] | YAML front-matter block parsing |
//! | [`types`] | Shared types (`ContentNode`, `FrontValue`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Explicit Config, No Globals
//!
//! `SiteConfig` is constructed once and passed by reference through the
//! pipeline. Nothing reads ambient state, which is what makes a build a
//! pure transform of (content tree, config).
//!
//! ## Shallow Per-Aspect Theme Merge
//!
//! Theme layers merge per top-level aspect key, last layer winning
//! wholesale. Deep-merging arbitrary nested aspect shapes is ambiguous;
//! replacing an aspect outright keeps overrides predictable. The config
//! file itself, whose shape *is* known, merges deeply over stock defaults.
//!
//! ## Broken Links Fail Production Builds
//!
//! `on_broken_links` defaults to `throw`. A documentation site with dead
//! internal links is worse than a failed build; `warn` and `ignore` exist
//! for migration and local iteration.

pub mod config;
pub mod frontmatter;
pub mod links;
pub mod locale;
pub mod output;
pub mod pipeline;
pub mod routes;
pub mod scan;
pub mod sidebar;
pub mod theme;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
