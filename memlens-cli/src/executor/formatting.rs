//! Output Formatting
//!
//! Human-readable output formatting for analysis and comparison reports.
//!
//! Generates terminal-friendly output with:
//! - Per-category diagnostics with their stack traces
//! - Runtime, heap usage and leak summary (bytes in binary multiples)
//! - Comparison tables with count deltas and new/resolved messages

use memlens_diagnostics::Category;
use memlens_report::{AnalysisResult, ComparisonResult, Report};
use memlens_stats::{NOT_AVAILABLE, format_bytes, format_count, parse_grouped};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    if let Some(analysis) = &report.analysis {
        output.push('\n');
        output.push_str("Memlens Analysis\n");
        output.push_str(&"=".repeat(60));
        output.push_str("\n\n");
        format_analysis(&mut output, analysis);
    }

    if let Some(comparison) = &report.comparison {
        output.push('\n');
        output.push_str(&format!(
            "Memlens Comparison: {} → {}\n",
            comparison.older.name, comparison.newer.name
        ));
        output.push_str(&"=".repeat(60));
        output.push_str("\n\n");
        format_comparison(&mut output, comparison);
    }

    output
}

fn section(output: &mut String, title: &str) {
    output.push_str(&format!("{}\n", title));
    output.push_str(&"-".repeat(60));
    output.push('\n');
}

fn format_analysis(output: &mut String, analysis: &AnalysisResult) {
    for (category, messages) in analysis.categories.iter() {
        section(
            output,
            &format!("{} ({})", category.title(), messages.len()),
        );
        let records = analysis
            .records
            .iter()
            .filter(|record| record.category == category);
        let mut empty = true;
        for record in records {
            empty = false;
            for (i, line) in record.render().lines().enumerate() {
                let marker = if i == 0 { "✗" } else { " " };
                output.push_str(&format!("  {} {}\n", marker, line));
            }
        }
        if empty {
            output.push_str("  ✓ none\n");
        }
        output.push('\n');
    }

    let summary = &analysis.summary;
    section(output, "Summary");
    output.push_str(&format!(
        "  Total errors: {}\n",
        format_count(summary.total_errors as u64)
    ));
    output.push_str(&format!("  Runtime: {}\n", summary.runtime));
    if summary.execution.is_crash() {
        output.push_str(&format!("  Execution: {}\n", summary.execution));
    }

    match &summary.heap_usage {
        Some(heap) => {
            output.push_str(&format!(
                "  Heap: {} allocs, {} frees, {} allocated ({} unfreed)\n",
                format_count(heap.allocations),
                format_count(heap.frees),
                format_bytes(heap.bytes_allocated),
                format_count(heap.unfreed_allocations)
            ));
        }
        None => output.push_str(&format!("  Heap: {}\n", NOT_AVAILABLE)),
    }

    output.push_str("  Leaks:\n");
    for (label, entry) in summary.memory_leak_summary.entries() {
        let rendered = match entry {
            Some(entry) => {
                let bytes = parse_grouped(entry.bytes.trim_end_matches(" bytes"))
                    .map(format_bytes)
                    .unwrap_or_else(|| entry.bytes.clone());
                format!("{} in {} blocks", bytes, format_count(entry.blocks))
            }
            None => NOT_AVAILABLE.to_string(),
        };
        output.push_str(&format!("    {:<16} {}\n", format!("{}:", label), rendered));
    }
}

fn format_comparison(output: &mut String, comparison: &ComparisonResult) {
    let diff = &comparison.comparison;
    let older = &comparison.older.analysis.summary.category_counts;
    let newer = &comparison.newer.analysis.summary.category_counts;

    section(output, "Category changes");
    output.push_str(&format!(
        "  {:<22} {:>8} {:>8} {:>8} {:>10}\n",
        "Category", "Older", "Newer", "Delta", "Change"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(60)));
    for (category, delta) in &diff.category_differences {
        let count = |counts: &std::collections::BTreeMap<Category, usize>| {
            counts.get(category).copied().unwrap_or(0)
        };
        output.push_str(&format!(
            "  {:<22} {:>8} {:>8} {:>+8} {:>10}\n",
            category.title(),
            count(older),
            count(newer),
            delta.delta,
            delta.percentage
        ));
    }
    output.push('\n');

    for (title, messages) in [
        ("New errors", &diff.new_errors),
        ("Resolved errors", &diff.resolved_errors),
    ] {
        let total: usize = messages.values().map(Vec::len).sum();
        section(output, &format!("{} ({})", title, total));
        if total == 0 {
            output.push_str("  none\n");
        }
        for (category, list) in messages {
            for message in list {
                output.push_str(&format!("  [{}] {}\n", category.name(), message));
            }
        }
        output.push('\n');
    }

    section(output, "Runtime");
    output.push_str(&format!(
        "  {}: {}\n  {}: {}\n",
        comparison.older.name,
        comparison.older.analysis.summary.runtime,
        comparison.newer.name,
        comparison.newer.analysis.summary.runtime
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::report::{build_analysis, build_comparison};
    use crate::executor::metadata::build_report_meta;
    use crate::executor::pipeline::AnalyzerConfig;
    use memlens_diagnostics::Transcript;
    use memlens_report::LabeledAnalysis;
    use memlens_stats::RuntimeMeasurement;

    const TRANSCRIPT: &str = "\
==7== Invalid write of size 4
==7==    at 0x1091B2: fill (buf.c:12)
==7== HEAP SUMMARY:
==7==   total heap usage: 1,500 allocs, 1,499 frees, 2,097,152 bytes allocated
==7== LEAK SUMMARY:
==7==    definitely lost: 1,536 bytes in 3 blocks
==7== ERROR SUMMARY: 1 errors from 1 contexts
";

    fn analysis(text: &str) -> AnalysisResult {
        build_analysis(
            &Transcript::new(text),
            RuntimeMeasurement::Completed {
                elapsed_ms: 4.0,
                exit_code: 0,
            },
        )
    }

    fn report(analysis: Option<AnalysisResult>, comparison: Option<ComparisonResult>) -> Report {
        Report {
            meta: build_report_meta(&AnalyzerConfig::default(), None),
            analysis,
            comparison,
        }
    }

    #[test]
    fn test_analysis_output() {
        let text = format_human_output(&report(Some(analysis(TRANSCRIPT)), None));

        assert!(text.contains("Memlens Analysis"));
        assert!(text.contains("Invalid access (1)"));
        assert!(text.contains("✗ Invalid write of size 4 at 0x1091B2: fill (buf.c:12)"));
        assert!(text.contains("Stack trace:"));
        assert!(text.contains("Total errors: 1"));
        assert!(text.contains("Runtime: 4.00ms"));
        assert!(text.contains("1,500 allocs, 1,499 frees, 2.00 MB allocated (1 unfreed)"));
        assert!(text.contains("1.50 KB in 3 blocks"));
        assert!(text.contains("possibly lost:"));
        assert!(text.contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_missing_heap_is_not_available() {
        let text = format_human_output(&report(Some(analysis("")), None));
        assert!(text.contains("Heap: Not available"));
    }

    #[test]
    fn test_comparison_output() {
        let comparison = build_comparison(
            LabeledAnalysis {
                name: "old.c".to_string(),
                analysis: analysis(""),
            },
            LabeledAnalysis {
                name: "new.c".to_string(),
                analysis: analysis(TRANSCRIPT),
            },
        );
        let text = format_human_output(&report(None, Some(comparison)));

        assert!(text.contains("Memlens Comparison: old.c → new.c"));
        assert!(text.contains("N/A"));
        assert!(text.contains("New errors (1)"));
        assert!(text.contains("[invalidAccess] Invalid write of size 4"));
        assert!(text.contains("Resolved errors (0)"));
    }
}
