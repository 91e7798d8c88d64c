//! Front-matter parsing for markdown documents.
//!
//! Documents may open with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Installation
//! sidebar_position: 2
//! ---
//! # Installation
//! ...
//! ```
//!
//! Absent front-matter is fine — the document gets defaults. Malformed
//! front-matter (an unterminated block, invalid YAML, or a value outside the
//! supported string/number/bool/list shapes) is an error, never silently
//! ignored: a typo in metadata should fail the build, not vanish.

use crate::types::FrontValue;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("front-matter block opened with `---` but never closed")]
    Unterminated,
    #[error("invalid YAML in front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front-matter must be a key/value mapping")]
    NotAMapping,
    #[error("unsupported value for front-matter key `{0}` (expected string, number, bool, or list)")]
    UnsupportedValue(String),
    #[error("front-matter key is not a string")]
    NonStringKey,
}

/// Split a document into `(front_matter, body)`.
///
/// Returns an empty map and the full content when no front-matter block is
/// present. The body is everything after the closing `---` line.
pub fn parse(
    content: &str,
) -> Result<(BTreeMap<String, FrontValue>, String), FrontmatterError> {
    let Some(rest) = strip_open_delimiter(content) else {
        return Ok((BTreeMap::new(), content.to_string()));
    };

    let (yaml, body) = split_at_close_delimiter(rest)?;
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let map = convert_mapping(value)?;
    Ok((map, body.to_string()))
}

/// Returns the content after the opening `---` line, or None if the
/// document does not start with one.
fn strip_open_delimiter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n')
}

/// Find the closing `---` line and split into (yaml, body).
fn split_at_close_delimiter(rest: &str) -> Result<(&str, &str), FrontmatterError> {
    let mut offset = 0;
    // split_inclusive yields a final `---` without trailing newline too.
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

fn convert_mapping(
    value: serde_yaml::Value,
) -> Result<BTreeMap<String, FrontValue>, FrontmatterError> {
    let mapping = match value {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => return Ok(BTreeMap::new()),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    let mut out = BTreeMap::new();
    for (key, val) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            _ => return Err(FrontmatterError::NonStringKey),
        };
        let converted = convert_value(val).ok_or_else(|| {
            FrontmatterError::UnsupportedValue(key.clone())
        })?;
        out.insert(key, converted);
    }
    Ok(out)
}

/// Convert a YAML value into the tagged [`FrontValue`] type.
///
/// Mappings and nulls have no representation and return None.
fn convert_value(value: serde_yaml::Value) -> Option<FrontValue> {
    match value {
        serde_yaml::Value::Bool(b) => Some(FrontValue::Bool(b)),
        serde_yaml::Value::Number(n) => n.as_f64().map(FrontValue::Number),
        serde_yaml::Value::String(s) => Some(FrontValue::String(s)),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(convert_value)
            .collect::<Option<Vec<_>>>()
            .map(FrontValue::List),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_front_matter_passes_through() {
        let content = "# Hello\n\nBody text.\n";
        let (fm, body) = parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn front_matter_extracted_and_body_preserved() {
        let content = "---\ntitle: Install\nsidebar_position: 2\n---\n# Install\n";
        let (fm, body) = parse(content).unwrap();
        assert_eq!(fm.get("title").unwrap().as_str(), Some("Install"));
        assert_eq!(fm.get("sidebar_position").unwrap().as_u32(), Some(2));
        assert_eq!(body, "# Install\n");
    }

    #[test]
    fn bool_and_list_values() {
        let content = "---\ndraft: true\ntags:\n  - net\n  - protocol\n---\nBody";
        let (fm, _) = parse(content).unwrap();
        assert_eq!(fm.get("draft"), Some(&FrontValue::Bool(true)));
        assert_eq!(
            fm.get("tags"),
            Some(&FrontValue::List(vec![
                FrontValue::String("net".to_string()),
                FrontValue::String("protocol".to_string()),
            ]))
        );
    }

    #[test]
    fn unterminated_block_is_error() {
        let content = "---\ntitle: Oops\n# never closed\n";
        assert!(matches!(parse(content), Err(FrontmatterError::Unterminated)));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        assert!(matches!(parse(content), Err(FrontmatterError::Yaml(_))));
    }

    #[test]
    fn nested_mapping_value_is_rejected() {
        let content = "---\nmeta:\n  nested: true\n---\nBody";
        match parse(content) {
            Err(FrontmatterError::UnsupportedValue(key)) => assert_eq!(key, "meta"),
            other => panic!("expected UnsupportedValue, got {other:?}"),
        }
    }

    #[test]
    fn non_mapping_front_matter_is_rejected() {
        let content = "---\n- just\n- a list\n---\nBody";
        assert!(matches!(parse(content), Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn empty_front_matter_block_is_empty_map() {
        let content = "---\n---\nBody\n";
        let (fm, body) = parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn crlf_delimiters_accepted() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody";
        let (fm, _) = parse(content).unwrap();
        assert_eq!(fm.get("title").unwrap().as_str(), Some("Windows"));
    }

    #[test]
    fn dashes_inside_body_are_not_delimiters() {
        let content = "# Heading\n\n---\n\nA horizontal rule, not front-matter.\n";
        let (fm, body) = parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }
}
