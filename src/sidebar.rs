//! Sidebar resolution.
//!
//! Stage 2 of the build pipeline. Turns the scanned node sequence plus the
//! explicit sidebar definitions from `site.toml` into ordered navigation
//! trees, one per named sidebar.
//!
//! ## Placement Rules
//!
//! - Explicit entries are placed exactly in declared order; a declared
//!   document id that does not exist in the scanned set fails the build.
//! - Every document not mentioned by any explicit sidebar is auto-appended
//!   in scan order: root-level documents as plain leaves, nested documents
//!   under categories inferred from their directory path (one category per
//!   path component, created on first use).
//! - Documents with a `sidebar_position` front-matter hint are ordered by
//!   it within their inferred category; explicit ordering always dominates
//!   inferred ordering.
//! - When no sidebar is declared, a single sidebar named `docs` is
//!   synthesized to hold the auto-appended entries.
//!
//! Cycles cannot occur: entries are an owned tree, and a document id may
//! appear at most once across all sidebars (duplicates are rejected).

use crate::config::{SidebarDef, SidebarDefEntry};
use crate::types::ContentNode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("sidebar {sidebar:?} references unknown document {id:?}")]
    UnresolvedReference { sidebar: String, id: String },
    #[error("document {id:?} is listed more than once (last seen in sidebar {sidebar:?})")]
    DuplicateReference { sidebar: String, id: String },
}

/// Name of the sidebar synthesized when none is declared.
pub const DEFAULT_SIDEBAR: &str = "docs";

/// A resolved navigation tree.
#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub name: String,
    pub entries: Vec<SidebarEntry>,
}

/// One node of a navigation tree: a document leaf or a labelled category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarEntry {
    Doc { id: String, label: String },
    Category {
        label: String,
        items: Vec<SidebarEntry>,
    },
}

impl Sidebar {
    /// Id of the first document leaf, in tree order. Navbar `doc_sidebar`
    /// items link here.
    pub fn first_doc(&self) -> Option<&str> {
        fn first(entries: &[SidebarEntry]) -> Option<&str> {
            for entry in entries {
                match entry {
                    SidebarEntry::Doc { id, .. } => return Some(id),
                    SidebarEntry::Category { items, .. } => {
                        if let Some(id) = first(items) {
                            return Some(id);
                        }
                    }
                }
            }
            None
        }
        first(&self.entries)
    }

    /// All document ids in tree order.
    pub fn doc_ids(&self) -> Vec<&str> {
        fn walk<'a>(entries: &'a [SidebarEntry], out: &mut Vec<&'a str>) {
            for entry in entries {
                match entry {
                    SidebarEntry::Doc { id, .. } => out.push(id),
                    SidebarEntry::Category { items, .. } => walk(items, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.entries, &mut out);
        out
    }
}

/// Resolve all sidebars: explicit definitions first, then auto-append the
/// documents nothing mentions.
pub fn resolve(
    nodes: &[ContentNode],
    defs: &[SidebarDef],
) -> Result<Vec<Sidebar>, SidebarError> {
    let docs: BTreeMap<&str, &ContentNode> = nodes
        .iter()
        .filter(|n| n.is_document())
        .map(|n| (n.id.as_str(), n))
        .collect();

    let mut mentioned = BTreeSet::new();
    let mut sidebars = Vec::new();
    for def in defs {
        let entries = resolve_entries(&def.name, &def.entries, &docs, &mut mentioned)?;
        sidebars.push(Sidebar {
            name: def.name.clone(),
            entries,
        });
    }

    // Documents no explicit sidebar claimed, in scan order.
    let leftovers: Vec<&ContentNode> = nodes
        .iter()
        .filter(|n| n.is_document() && !mentioned.contains(n.id.as_str()))
        .collect();

    if !leftovers.is_empty() {
        if sidebars.is_empty() {
            sidebars.push(Sidebar {
                name: DEFAULT_SIDEBAR.to_string(),
                entries: Vec::new(),
            });
        }
        // Inferred entries go at the tail of the first sidebar, after
        // everything explicitly declared.
        let target = &mut sidebars[0];
        append_inferred(&mut target.entries, &leftovers);
    }

    Ok(sidebars)
}

fn resolve_entries(
    sidebar: &str,
    defs: &[SidebarDefEntry],
    docs: &BTreeMap<&str, &ContentNode>,
    mentioned: &mut BTreeSet<String>,
) -> Result<Vec<SidebarEntry>, SidebarError> {
    let mut entries = Vec::with_capacity(defs.len());
    for def in defs {
        match def {
            SidebarDefEntry::Doc(id) => {
                let node = docs.get(id.as_str()).ok_or_else(|| {
                    SidebarError::UnresolvedReference {
                        sidebar: sidebar.to_string(),
                        id: id.clone(),
                    }
                })?;
                if !mentioned.insert(id.clone()) {
                    return Err(SidebarError::DuplicateReference {
                        sidebar: sidebar.to_string(),
                        id: id.clone(),
                    });
                }
                entries.push(SidebarEntry::Doc {
                    id: id.clone(),
                    label: node.title.clone(),
                });
            }
            SidebarDefEntry::Category { label, items } => {
                entries.push(SidebarEntry::Category {
                    label: label.clone(),
                    items: resolve_entries(sidebar, items, docs, mentioned)?,
                });
            }
        }
    }
    Ok(entries)
}

/// Auto-append unmentioned documents, nesting categories per directory
/// component. Within one directory, `sidebar_position` hints order first,
/// then scan order.
fn append_inferred(entries: &mut Vec<SidebarEntry>, leftovers: &[&ContentNode]) {
    let mut ordered: Vec<&ContentNode> = leftovers.to_vec();
    ordered.sort_by_key(|n| {
        (
            n.directory().to_string(),
            n.position.unwrap_or(u32::MAX),
            n.source_path.clone(),
        )
    });

    for node in ordered {
        let target = category_for(entries, node.directory());
        target.push(SidebarEntry::Doc {
            id: node.id.clone(),
            label: node.title.clone(),
        });
    }
}

/// Walk (and create) the category chain for a directory path, returning the
/// item list documents in that directory belong to.
fn category_for<'a>(
    entries: &'a mut Vec<SidebarEntry>,
    directory: &str,
) -> &'a mut Vec<SidebarEntry> {
    if directory.is_empty() {
        return entries;
    }
    let mut current = entries;
    for component in directory.split('/') {
        let label = component.replace('-', " ");
        // Find an existing inferred category with this label, else create it.
        let pos = current.iter().position(
            |e| matches!(e, SidebarEntry::Category { label: l, .. } if *l == label),
        );
        let pos = match pos {
            Some(pos) => pos,
            None => {
                current.push(SidebarEntry::Category {
                    label,
                    items: Vec::new(),
                });
                current.len() - 1
            }
        };
        current = match &mut current[pos] {
            SidebarEntry::Category { items, .. } => items,
            SidebarEntry::Doc { .. } => unreachable!("position matched a category"),
        };
    }
    current
}
