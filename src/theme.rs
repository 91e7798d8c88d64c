//! Theme composition.
//!
//! Merges an ordered sequence of partial theme layers — the stock preset,
//! then site overrides — into one resolved presentation configuration.
//!
//! The merge is right-biased and *shallow per top-level aspect key*: each
//! aspect (`color_mode`, `prism`, `navbar`, ...) is an independent unit, and
//! the last layer that defines an aspect replaces it wholesale. Nested
//! structures are never deep-merged; partial-object merging of arbitrary
//! aspect shapes is ambiguous, and wholesale replacement keeps overrides
//! predictable. Unknown aspects pass through opaquely — this stage has no
//! failure mode.

use toml::Table;

/// The stock theme preset: the base layer under all site overrides.
pub fn stock_preset() -> Table {
    let preset = r#"
[color_mode]
default_mode = "light"
respect_prefers_color_scheme = false

[prism]
theme = "github"
dark_theme = "dracula"
"#;
    toml::from_str(preset).expect("stock preset must be valid TOML")
}

/// Merge theme layers left to right, later layers winning per aspect key.
///
/// Associative across layer concatenation:
/// `merge([a, b, c]) == merge([merge([a, b]), c])`.
pub fn merge_aspects<I>(layers: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let mut resolved = Table::new();
    for layer in layers {
        for (aspect, value) in layer {
            resolved.insert(aspect, value);
        }
    }
    resolved
}

/// Resolve the final theme: stock preset under the site's overrides.
pub fn compose(site_overrides: &Table) -> Table {
    merge_aspects([stock_preset(), site_overrides.clone()])
}
