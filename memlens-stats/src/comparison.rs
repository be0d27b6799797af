//! Category Comparison
//!
//! Diffs the classified messages of two analyses (older → newer).
//!
//! The diff is set membership on normalized message strings: a message is
//! "new" when it appears in the newer analysis but not the older one, and
//! "resolved" in the opposite case. Duplicates are not multiplicity-counted.

use memlens_diagnostics::{Category, CategorySet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Change in one category's count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDelta {
    /// `newer - older`
    pub delta: i64,
    /// `"N/A"` when the older count is zero, otherwise the relative change (`"-50.00%"`)
    pub percentage: String,
}

/// Structural diff between two category sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryComparison {
    /// Count changes per category
    pub category_differences: BTreeMap<Category, CategoryDelta>,
    /// Messages only present in the newer analysis, in newer order
    pub new_errors: BTreeMap<Category, Vec<String>>,
    /// Messages only present in the older analysis, in older order
    pub resolved_errors: BTreeMap<Category, Vec<String>>,
}

impl CategoryComparison {
    /// Total number of new messages across categories
    pub fn new_error_count(&self) -> usize {
        self.new_errors.values().map(Vec::len).sum()
    }

    /// Total number of resolved messages across categories
    pub fn resolved_error_count(&self) -> usize {
        self.resolved_errors.values().map(Vec::len).sum()
    }
}

/// Relative change rendered with two decimals, `"N/A"` for a zero baseline
pub fn percentage_change(older: usize, newer: usize) -> String {
    if older == 0 {
        return "N/A".to_string();
    }
    let delta = newer as f64 - older as f64;
    format!("{:.2}%", delta / older as f64 * 100.0)
}

/// Messages of `from` that are absent from `against`, keeping `from` order
fn missing_from(from: &[String], against: &[String]) -> Vec<String> {
    let present: HashSet<&str> = against.iter().map(String::as_str).collect();
    from.iter()
        .filter(|message| !present.contains(message.as_str()))
        .cloned()
        .collect()
}

/// Diff two category sets; categories held by either side are compared
pub fn compare_categories(older: &CategorySet, newer: &CategorySet) -> CategoryComparison {
    let categories: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| older.contains_category(*c) || newer.contains_category(*c))
        .collect();

    let mut comparison = CategoryComparison::default();
    for category in categories {
        let before = older.get(category);
        let after = newer.get(category);

        comparison.category_differences.insert(
            category,
            CategoryDelta {
                delta: after.len() as i64 - before.len() as i64,
                percentage: percentage_change(before.len(), after.len()),
            },
        );
        comparison
            .new_errors
            .insert(category, missing_from(after, before));
        comparison
            .resolved_errors
            .insert(category, missing_from(before, after));
    }

    comparison
}
