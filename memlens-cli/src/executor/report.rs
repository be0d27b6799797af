//! Result Assembly
//!
//! Turns a captured transcript and runtime measurement into an
//! [`AnalysisResult`], and pairs two results into a [`ComparisonResult`].
//!
//! ```text
//! Transcript ──► parse_transcript ──► CategorySet + records
//!      │                                   │
//!      └──────► compute_statistics ◄───────┘
//!                      │
//!                      ▼
//!   AnalysisSummary (+ RuntimeMeasurement) ──► AnalysisResult
//! ```

use memlens_diagnostics::{Transcript, parse_transcript};
use memlens_report::{AnalysisResult, AnalysisSummary, ComparisonResult, LabeledAnalysis};
use memlens_stats::{RuntimeMeasurement, compare_categories, compute_statistics};
use tracing::debug;

/// Build the analysis result for one transcript
pub fn build_analysis(transcript: &Transcript, execution: RuntimeMeasurement) -> AnalysisResult {
    let parsed = parse_transcript(transcript);
    let stats = compute_statistics(transcript.as_str(), &parsed.categories);
    debug!(
        "classified {} records, {} errors total",
        parsed.records.len(),
        stats.total_errors
    );

    AnalysisResult {
        categories: parsed.categories,
        records: parsed.records,
        summary: AnalysisSummary {
            total_errors: stats.total_errors,
            category_counts: stats.category_counts,
            runtime: execution.display(),
            execution,
            heap_usage: stats.heap_usage,
            memory_leak_summary: stats.leak_summary,
        },
        raw_output: transcript.as_str().to_string(),
    }
}

/// Diff two labeled analyses (older → newer)
pub fn build_comparison(older: LabeledAnalysis, newer: LabeledAnalysis) -> ComparisonResult {
    let comparison = compare_categories(&older.analysis.categories, &newer.analysis.categories);
    debug!(
        "{} → {}: {} new, {} resolved",
        older.name,
        newer.name,
        comparison.new_error_count(),
        comparison.resolved_error_count()
    );
    ComparisonResult {
        older,
        newer,
        comparison,
    }
}
