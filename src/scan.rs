//! Content tree scanning.
//!
//! Stage 1 of the build pipeline. Walks a content directory, classifies each
//! file, parses front-matter, and produces the deterministic sequence of
//! [`ContentNode`]s that every later stage consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                            # Content root
//! ├── site.toml                    # Site configuration (optional)
//! ├── index.md                     # Root index → the "" route
//! ├── getting-started.md           # Document → "getting-started" route
//! ├── guide/
//! │   ├── index.md                 # Index → "guide" route
//! │   ├── install.md
//! │   └── advanced/
//! │       └── networking.md
//! ├── img/
//! │   └── logo.svg                 # Asset, routed verbatim
//! └── i18n/
//!     └── fr/
//!         └── getting-started.md   # French translation, same relative path
//! ```
//!
//! ## Determinism
//!
//! Files are parsed in parallel, then the node sequence is sorted by source
//! path before anything downstream sees it, so the output is identical
//! regardless of walk or worker order.
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - The content root must exist
//! - Malformed front-matter fails the scan (absent front-matter is fine)
//! - No two documents may resolve to the same route slug

use crate::frontmatter::{self, FrontmatterError};
use crate::types::{ContentKind, ContentNode, FrontValue};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content root does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk content tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid front-matter in {path}: {source}")]
    Frontmatter {
        path: String,
        source: FrontmatterError,
    },
    #[error("documents {first} and {second} both resolve to route slug {slug:?}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
}

/// Directory under the content root that holds per-locale translations.
pub const I18N_DIR: &str = "i18n";

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx"];
const INDEX_STEMS: &[&str] = &["index", "README"];

/// Scan the content root into a sorted sequence of nodes.
///
/// Skips `site.toml`, hidden files, and the `i18n/` translation tree
/// (scanned separately via [`scan_translations`]).
pub fn scan(root: &Path) -> Result<Vec<ContentNode>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    let files = collect_files(root, true)?;
    let nodes = parse_files(root, &files)?;
    check_duplicate_slugs(&nodes)?;
    Ok(nodes)
}

/// Scan the translation tree for one locale (`<root>/i18n/<code>/`).
///
/// A missing translation directory is not an error — it simply means every
/// document falls back to the default locale.
pub fn scan_translations(root: &Path, code: &str) -> Result<Vec<ContentNode>, ScanError> {
    let dir = root.join(I18N_DIR).join(code);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let files = collect_files(&dir, false)?;
    parse_files(&dir, &files)
}

/// Walk a tree and return the sorted list of content files.
fn collect_files(root: &Path, skip_i18n: bool) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if entry.depth() > 0 && name.starts_with('.') {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.file_type().is_dir() {
            if skip_i18n && entry.depth() == 1 && name == I18N_DIR {
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.depth() == 1 && name == crate::config::CONFIG_FILE {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

/// Parse every file into a node, in parallel, then restore path order.
fn parse_files(root: &Path, files: &[PathBuf]) -> Result<Vec<ContentNode>, ScanError> {
    let mut nodes = files
        .par_iter()
        .map(|path| parse_file(root, path))
        .collect::<Result<Vec<_>, _>>()?;
    // Worker completion order is arbitrary; the stable key is the path.
    nodes.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    Ok(nodes)
}

fn parse_file(root: &Path, path: &Path) -> Result<ContentNode, ScanError> {
    let rel = path
        .strip_prefix(root)
        .expect("walked paths are under root");
    let source_path = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(ContentNode {
            id: source_path.clone(),
            source_path,
            kind: ContentKind::Asset,
            front_matter: BTreeMap::new(),
            body: String::new(),
            title: String::new(),
            slug: String::new(),
            position: None,
        });
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let kind = if INDEX_STEMS.contains(&stem.as_str()) {
        ContentKind::Index
    } else {
        ContentKind::Document
    };

    let content = fs::read_to_string(path)?;
    let (front_matter, body) =
        frontmatter::parse(&content).map_err(|source| ScanError::Frontmatter {
            path: source_path.clone(),
            source,
        })?;

    let id = id_for(&source_path);
    let slug = slug_for(&front_matter, &source_path, kind);
    let title = title_for(&front_matter, &body, &stem);
    let position = front_matter
        .get("sidebar_position")
        .and_then(FrontValue::as_u32);

    Ok(ContentNode {
        id,
        source_path,
        kind,
        front_matter,
        body,
        title,
        slug,
        position,
    })
}

/// Document identity: the relative path with the extension dropped.
fn id_for(source_path: &str) -> String {
    match source_path.rfind('.') {
        Some(pos) => source_path[..pos].to_string(),
        None => source_path.to_string(),
    }
}

/// Route slug: front-matter `slug` override, else derived from the path.
/// Index documents take their directory's path; the root index is `""`.
fn slug_for(
    front_matter: &BTreeMap<String, FrontValue>,
    source_path: &str,
    kind: ContentKind,
) -> String {
    if let Some(custom) = front_matter.get("slug").and_then(FrontValue::as_str) {
        return custom.trim_matches('/').to_string();
    }
    let id = id_for(source_path);
    match kind {
        ContentKind::Index => match id.rfind('/') {
            Some(pos) => id[..pos].to_string(),
            None => String::new(),
        },
        _ => id,
    }
}

/// Display title: front-matter `title`, else first `# heading` in the body,
/// else the file stem with dashes converted to spaces.
fn title_for(
    front_matter: &BTreeMap<String, FrontValue>,
    body: &str,
    stem: &str,
) -> String {
    if let Some(title) = front_matter.get("title").and_then(FrontValue::as_str) {
        return title.to_string();
    }
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .unwrap_or_else(|| stem.replace('-', " "))
}

fn check_duplicate_slugs(nodes: &[ContentNode]) -> Result<(), ScanError> {
    let mut seen: BTreeMap<&str, &ContentNode> = BTreeMap::new();
    for node in nodes.iter().filter(|n| n.is_document()) {
        if let Some(first) = seen.insert(&node.slug, node) {
            return Err(ScanError::DuplicateSlug {
                slug: node.slug.clone(),
                first: first.source_path.clone(),
                second: node.source_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn scan_finds_all_fixture_files() {
        let tmp = setup_fixtures();
        let nodes = scan(tmp.path()).unwrap();

        let ids = node_ids(&nodes);
        assert!(ids.contains(&"index"));
        assert!(ids.contains(&"getting-started"));
        assert!(ids.contains(&"guide/install"));
        assert!(ids.contains(&"guide/advanced/networking"));
        assert!(ids.contains(&"reference/protocol"));
        assert!(ids.contains(&"img/logo.svg"));
    }

    #[test]
    fn nodes_sorted_by_source_path() {
        let tmp = setup_fixtures();
        let nodes = scan(tmp.path()).unwrap();
        let paths: Vec<&str> = nodes.iter().map(|n| n.source_path.as_str()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn i18n_tree_and_config_excluded_from_scan() {
        let tmp = setup_fixtures();
        let nodes = scan(tmp.path()).unwrap();
        assert!(
            nodes
                .iter()
                .all(|n| !n.source_path.starts_with("i18n/") && n.source_path != "site.toml")
        );
    }

    #[test]
    fn missing_root_is_error() {
        let result = scan(Path::new("/nonexistent/docs-root"));
        assert!(matches!(result, Err(ScanError::MissingRoot(_))));
    }

    #[test]
    fn markdown_classified_as_document_or_index() {
        let tmp = setup_fixtures();
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(find_node(&nodes, "index").kind, ContentKind::Index);
        assert_eq!(
            find_node(&nodes, "getting-started").kind,
            ContentKind::Document
        );
        assert_eq!(find_node(&nodes, "img/logo.svg").kind, ContentKind::Asset);
    }

    #[test]
    fn index_slug_is_directory_path() {
        let tmp = content_dir(&[
            ("index.md", "# Home\n"),
            ("guide/index.md", "# Guide\n"),
            ("guide/install.md", "# Install\n"),
        ]);
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(find_node(&nodes, "index").slug, "");
        assert_eq!(find_node(&nodes, "guide/index").slug, "guide");
        assert_eq!(find_node(&nodes, "guide/install").slug, "guide/install");
    }

    #[test]
    fn readme_counts_as_index() {
        let tmp = content_dir(&[("guide/README.md", "# Guide\n")]);
        let nodes = scan(tmp.path()).unwrap();
        let node = find_node(&nodes, "guide/README");
        assert_eq!(node.kind, ContentKind::Index);
        assert_eq!(node.slug, "guide");
    }

    #[test]
    fn front_matter_slug_overrides_path() {
        let tmp = content_dir(&[(
            "deep/nested/page.md",
            "---\nslug: /shortcut/\n---\n# Page\n",
        )]);
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(find_node(&nodes, "deep/nested/page").slug, "shortcut");
    }

    #[test]
    fn title_resolution_order() {
        let tmp = content_dir(&[
            ("a.md", "---\ntitle: From Front-Matter\n---\n# From Heading\n"),
            ("b.md", "# From Heading\n"),
            ("c-and-d.md", "no heading here\n"),
        ]);
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(find_node(&nodes, "a").title, "From Front-Matter");
        assert_eq!(find_node(&nodes, "b").title, "From Heading");
        assert_eq!(find_node(&nodes, "c-and-d").title, "c and d");
    }

    #[test]
    fn sidebar_position_extracted() {
        let tmp = content_dir(&[("a.md", "---\nsidebar_position: 3\n---\n# A\n")]);
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(find_node(&nodes, "a").position, Some(3));
    }

    #[test]
    fn malformed_front_matter_is_error() {
        let tmp = content_dir(&[("bad.md", "---\ntitle: [unclosed\n---\nBody\n")]);
        match scan(tmp.path()) {
            Err(ScanError::Frontmatter { path, .. }) => assert_eq!(path, "bad.md"),
            other => panic!("expected Frontmatter error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_slug_is_error() {
        let tmp = content_dir(&[
            ("one.md", "---\nslug: same\n---\n# One\n"),
            ("two.md", "---\nslug: same\n---\n# Two\n"),
        ]);
        match scan(tmp.path()) {
            Err(ScanError::DuplicateSlug { slug, first, second }) => {
                assert_eq!(slug, "same");
                assert_eq!(first, "one.md");
                assert_eq!(second, "two.md");
            }
            other => panic!("expected DuplicateSlug error, got {other:?}"),
        }
    }

    #[test]
    fn assets_do_not_collide_with_document_slugs() {
        // Asset slugs are unused; only documents participate in the check.
        let tmp = content_dir(&[("logo.md", "# Logo docs\n")]);
        fs::write(tmp.path().join("logo.svg"), "<svg/>").unwrap();
        assert!(scan(tmp.path()).is_ok());
    }

    #[test]
    fn hidden_files_skipped() {
        let tmp = content_dir(&[("visible.md", "# V\n")]);
        fs::write(tmp.path().join(".hidden.md"), "# H\n").unwrap();
        let nodes = scan(tmp.path()).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn scan_translations_reads_locale_tree() {
        let tmp = setup_fixtures();
        let nodes = scan_translations(tmp.path(), "fr").unwrap();
        let ids = node_ids(&nodes);
        assert!(ids.contains(&"getting-started"));
        assert!(ids.contains(&"guide/install"));
    }

    #[test]
    fn scan_translations_missing_locale_is_empty() {
        let tmp = setup_fixtures();
        let nodes = scan_translations(tmp.path(), "de").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn scan_twice_yields_identical_nodes() {
        let tmp = setup_fixtures();
        let first = scan(tmp.path()).unwrap();
        let second = scan(tmp.path()).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
