//! Analysis Statistics
//!
//! Aggregates per-category counts, heap usage and the leak summary for one
//! transcript. Absent statistics stay absent; nothing defaults to zero.

use crate::heap::{HeapUsage, parse_heap_usage};
use crate::leaks::{LeakSummary, parse_leak_summary};
use memlens_diagnostics::{Category, CategorySet};
use std::collections::BTreeMap;

/// Aggregated statistics for one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisStatistics {
    /// Sum of all category counts
    pub total_errors: usize,
    /// Message count per category
    pub category_counts: BTreeMap<Category, usize>,
    /// Heap totals, if the tool printed them
    pub heap_usage: Option<HeapUsage>,
    /// Per-kind leak summary
    pub leak_summary: LeakSummary,
}

/// Count messages per category, for every category the set holds
pub fn count_categories(categories: &CategorySet) -> BTreeMap<Category, usize> {
    categories
        .iter()
        .map(|(category, messages)| (category, messages.len()))
        .collect()
}

/// Compute statistics from the raw transcript and its classified messages
pub fn compute_statistics(transcript: &str, categories: &CategorySet) -> AnalysisStatistics {
    let category_counts = count_categories(categories);
    AnalysisStatistics {
        total_errors: category_counts.values().sum(),
        category_counts,
        heap_usage: parse_heap_usage(transcript),
        leak_summary: parse_leak_summary(transcript),
    }
}
