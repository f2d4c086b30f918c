//! Formula placeholders and the legend shown next to the contract term list.
//!
//! Formulas are opaque text to this crate. They are stored and displayed,
//! never evaluated; the only structure recognized is `{identifier}`
//! placeholders that refer to legend variables.

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// One legend panel describing a formula variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    /// Placeholder name without braces.
    pub placeholder: &'static str,
    pub title: &'static str,
    pub formula: &'static str,
    pub example: &'static str,
}

const FORMULA_LEGEND: &[LegendEntry] = &[
    LegendEntry {
        placeholder: "app_install_count",
        title: "App: Per Installation Count",
        formula: "{app_install_count} * $n",
        example: "{app_install_count} * $0.52",
    },
    LegendEntry {
        placeholder: "app_usage",
        title: "App: Per Use",
        formula: "{app_usage} * time_in_minutes / time_in_pool * %",
        example: "{app_usage} * 1000 / 12525255 * 10%",
    },
];

/// Returns the formula legend in display order.
pub fn formula_legend() -> &'static [LegendEntry] {
    FORMULA_LEGEND
}

/// Extracts placeholder names in order of first appearance, deduplicated.
pub fn placeholders(formula: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(formula) {
        if let Some(name) = caps.get(1) {
            if !names.iter().any(|known| known == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}

/// Returns placeholders in `formula` that have no legend entry.
pub fn unknown_placeholders(formula: &str) -> Vec<String> {
    placeholders(formula)
        .into_iter()
        .filter(|name| {
            !FORMULA_LEGEND
                .iter()
                .any(|entry| entry.placeholder == name.as_str())
        })
        .collect()
}
