//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → compose → emit)
//! and must be identical across all modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification of a file discovered in the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A markdown document that becomes its own route.
    Document,
    /// An `index.md`/`README.md` that becomes the route of its directory.
    Index,
    /// Any non-markdown file, routed verbatim (images, fonts, downloads).
    Asset,
}

/// A tagged front-matter value.
///
/// Front-matter is dynamically typed in the source files; each value is
/// resolved into one of these variants at scan time and looked up explicitly
/// per key afterwards. Mappings are rejected as malformed — nothing in the
/// pipeline consumes nested front-matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<FrontValue>),
}

impl FrontValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FrontValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as u32),
            _ => None,
        }
    }
}

/// A single file from the content tree, immutable once scanned.
///
/// Identity is the relative source path; for documents the `id` is that path
/// with the markdown extension stripped (`guide/install.md` → `guide/install`),
/// which is what sidebars and cross-references name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentNode {
    /// Stable identity: extension-stripped relative path for documents,
    /// the full relative path for assets.
    pub id: String,
    /// Path relative to the content root, `/`-separated.
    pub source_path: String,
    pub kind: ContentKind,
    /// Parsed front-matter (empty map when the file has none).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub front_matter: BTreeMap<String, FrontValue>,
    /// Raw body with the front-matter block removed. Empty for assets.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Display title: front-matter `title`, else first `# heading`,
    /// else the file stem with dashes converted to spaces.
    pub title: String,
    /// Route slug relative to the site root, no leading or trailing slash.
    /// Empty string is the root route. Front-matter `slug` overrides the
    /// path-derived default.
    pub slug: String,
    /// Explicit ordering hint from front-matter `sidebar_position`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ContentNode {
    /// Whether this node participates in sidebars, locales, and doc routes.
    pub fn is_document(&self) -> bool {
        matches!(self.kind, ContentKind::Document | ContentKind::Index)
    }

    /// Directory portion of the source path (`""` for root-level files).
    pub fn directory(&self) -> &str {
        match self.source_path.rfind('/') {
            Some(pos) => &self.source_path[..pos],
            None => "",
        }
    }
}
