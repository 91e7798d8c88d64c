//! Locale composition.
//!
//! Stage 3 of the build pipeline. For each configured locale, produces the
//! effective document view: the translated node where a translation exists
//! under `i18n/<code>/`, the default-locale node otherwise. Fallback is
//! per-document, never per-site — one missing translation does not drop a
//! locale back to the default wholesale.
//!
//! Composition is a pure function of its inputs: composing twice with the
//! same node sets yields identical views.

use crate::config::I18nConfig;
use crate::types::ContentNode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("no default locale: {code:?} is not listed in i18n.locales")]
    NoDefault { code: String },
    #[error("default locale {code:?} is listed more than once in i18n.locales")]
    DuplicateDefault { code: String },
    #[error("locale {code:?} is listed more than once in i18n.locales")]
    DuplicateLocale { code: String },
    #[error("translation {path} in locale {code:?} has no default-locale counterpart")]
    OrphanTranslation { code: String, path: String },
}

/// One declared locale. Exactly one locale in a valid set carries
/// `default = true`.
#[derive(Debug, Clone, Serialize)]
pub struct Locale {
    pub code: String,
    pub default: bool,
}

/// The effective per-locale view of the content tree.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleView {
    pub code: String,
    pub default: bool,
    /// Effective document nodes, sorted by id. Translated where a
    /// translation exists, the default node otherwise. Slugs always come
    /// from the default node so routes line up across locales.
    pub nodes: Vec<ContentNode>,
    /// Ids of the documents that are actually translated in this locale.
    pub translated: BTreeSet<String>,
}

/// Build the locale set from config, enforcing default cardinality.
///
/// The default locale must appear in `locales` exactly once; zero
/// occurrences means no locale is default, two means two are.
pub fn locales_from_config(i18n: &I18nConfig) -> Result<Vec<Locale>, LocaleError> {
    let mut seen = BTreeSet::new();
    let mut default_count = 0usize;
    for code in &i18n.locales {
        if code == &i18n.default_locale {
            default_count += 1;
        } else if !seen.insert(code.clone()) {
            return Err(LocaleError::DuplicateLocale { code: code.clone() });
        }
    }
    match default_count {
        0 => Err(LocaleError::NoDefault {
            code: i18n.default_locale.clone(),
        }),
        1 => Ok(i18n
            .locales
            .iter()
            .map(|code| Locale {
                code: code.clone(),
                default: code == &i18n.default_locale,
            })
            .collect()),
        _ => Err(LocaleError::DuplicateDefault {
            code: i18n.default_locale.clone(),
        }),
    }
}

/// Compose the effective view for every locale.
///
/// `translations` maps a locale code to the nodes scanned from its
/// `i18n/<code>/` tree; absent codes simply fall back everywhere. The
/// default locale's view is total over all documents by construction.
pub fn compose(
    locales: &[Locale],
    nodes: &[ContentNode],
    translations: &BTreeMap<String, Vec<ContentNode>>,
) -> Result<Vec<LocaleView>, LocaleError> {
    let mut documents: Vec<&ContentNode> = nodes.iter().filter(|n| n.is_document()).collect();
    documents.sort_by(|a, b| a.id.cmp(&b.id));

    let default_ids: BTreeSet<&str> = documents.iter().map(|n| n.id.as_str()).collect();

    let mut views = Vec::with_capacity(locales.len());
    for locale in locales {
        let translated_nodes: BTreeMap<&str, &ContentNode> = match translations.get(&locale.code)
        {
            Some(list) if !locale.default => {
                for node in list {
                    if node.is_document() && !default_ids.contains(node.id.as_str()) {
                        return Err(LocaleError::OrphanTranslation {
                            code: locale.code.clone(),
                            path: node.source_path.clone(),
                        });
                    }
                }
                list.iter()
                    .filter(|n| n.is_document())
                    .map(|n| (n.id.as_str(), n))
                    .collect()
            }
            _ => BTreeMap::new(),
        };

        let mut effective = Vec::with_capacity(documents.len());
        let mut translated = BTreeSet::new();
        for node in &documents {
            match translated_nodes.get(node.id.as_str()) {
                Some(translation) => {
                    // Translated title and body, default identity and slug.
                    let mut merged = (*translation).clone();
                    merged.slug = node.slug.clone();
                    merged.kind = node.kind;
                    effective.push(merged);
                    translated.insert(node.id.clone());
                }
                None => effective.push((*node).clone()),
            }
        }

        views.push(LocaleView {
            code: locale.code.clone(),
            default: locale.default,
            nodes: effective,
            translated,
        });
    }
    Ok(views)
}
