//! Report Data Structures

use chrono::{DateTime, Utc};
use memlens_diagnostics::{Category, CategorySet, DiagnosticRecord};
use memlens_stats::{
    CategoryComparison, HeapUsage, LeakSummary, RuntimeMeasurement, count_categories,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete report written by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present for analyze requests
    pub analysis: Option<AnalysisResult>,
    /// Present for compare requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Report layout version
    pub schema_version: u32,
    /// memlens version that produced the report
    pub version: String,
    /// Generation time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Compiler program used by the build stage
    pub compiler: String,
    /// Instrumentation tool used by the instrumented run
    pub tool: String,
    /// Categories requested by a custom analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_categories: Option<Vec<Category>>,
}

/// Statistics attached to one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Sum of the per-category counts
    pub total_errors: usize,
    /// Message count per category held by the analysis
    pub category_counts: BTreeMap<Category, usize>,
    /// `"12.34ms"` or `"Not available"`
    pub runtime: String,
    /// Explicit outcome of the timed run
    pub execution: RuntimeMeasurement,
    /// `null` when the tool printed no heap totals
    pub heap_usage: Option<HeapUsage>,
    /// Per-kind leak totals from the tool's leak summary
    pub memory_leak_summary: LeakSummary,
}

/// Structured outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Messages grouped by category
    pub categories: CategorySet,
    /// Classified records with their stack traces, in transcript order
    pub records: Vec<DiagnosticRecord>,
    /// Counts and whole-run statistics
    pub summary: AnalysisSummary,
    /// Unmodified transcript the analysis was computed from
    pub raw_output: String,
}

impl AnalysisResult {
    /// Restrict the analysis to the requested categories and recompute the counts.
    ///
    /// Heap usage, leak summary, runtime and the raw transcript are kept as-is.
    pub fn filtered(mut self, requested: &[Category]) -> Self {
        self.categories.retain(requested);
        self.records
            .retain(|record| requested.contains(&record.category));
        self.summary.category_counts = count_categories(&self.categories);
        self.summary.total_errors = self.summary.category_counts.values().sum();
        self
    }
}

/// An analysis labeled with the source it was produced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledAnalysis {
    /// Source label, usually the file name
    pub name: String,
    /// Result for that source
    pub analysis: AnalysisResult,
}

/// Older/newer comparison of two analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Baseline analysis
    pub older: LabeledAnalysis,
    /// Candidate analysis
    pub newer: LabeledAnalysis,
    /// Deltas plus new and resolved messages
    #[serde(flatten)]
    pub comparison: CategoryComparison,
}
