//! Shared test utilities for the docsmith test suite.
//!
//! Provides fixture setup, ad-hoc content tree builders, node constructors,
//! and lookup helpers over scan-phase data (`ContentNode` sequences).

use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use crate::types::{ContentKind, ContentNode};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Build an ad-hoc content tree in a temp directory from (path, content)
/// pairs. Intermediate directories are created as needed.
pub fn content_dir(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
    tmp
}

/// Merge a TOML snippet into the content root's `site.toml`.
///
/// Uses the same deep merge as config loading, so a snippet can override a
/// single key without restating the rest of the file.
pub fn override_config(root: &Path, snippet: &str) {
    let existing = crate::config::load_raw_config(root)
        .unwrap()
        .unwrap_or(toml::Value::Table(toml::Table::new()));
    let overlay: toml::Value = toml::from_str(snippet).unwrap();
    let merged = crate::config::merge_toml(existing, overlay);
    std::fs::write(
        root.join(crate::config::CONFIG_FILE),
        toml::to_string(&merged).unwrap(),
    )
    .unwrap();
}

// =========================================================================
// Node constructors
// =========================================================================

/// A bare document node for one id (`source_path` is `<id>.md`, slug = id,
/// title = id).
pub fn doc_node(source_path: &str, body: &str) -> ContentNode {
    let id = source_path.trim_end_matches(".md").to_string();
    ContentNode {
        id: id.clone(),
        source_path: source_path.to_string(),
        kind: ContentKind::Document,
        front_matter: BTreeMap::new(),
        body: body.to_string(),
        title: id.clone(),
        slug: id,
        position: None,
    }
}

/// Document nodes for a list of ids, in the given (scan) order.
pub fn doc_nodes(ids: &[&str]) -> Vec<ContentNode> {
    ids.iter()
        .map(|id| doc_node(&format!("{id}.md"), ""))
        .collect()
}

/// Set the `sidebar_position` hint on the node with the given id.
pub fn set_position(nodes: &mut [ContentNode], id: &str, position: u32) {
    nodes
        .iter_mut()
        .find(|n| n.id == id)
        .unwrap_or_else(|| panic!("node '{id}' not found"))
        .position = Some(position);
}

// =========================================================================
// Lookups — panic with a clear message on miss
// =========================================================================

/// Find a node by id. Panics if not found.
pub fn find_node<'a>(nodes: &'a [ContentNode], id: &str) -> &'a ContentNode {
    nodes.iter().find(|n| n.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        panic!("node '{id}' not found. Available: {ids:?}")
    })
}

/// All node ids in sequence order.
pub fn node_ids(nodes: &[ContentNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}
