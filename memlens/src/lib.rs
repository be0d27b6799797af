#![warn(missing_docs)]
//! # Memlens
//!
//! Structured memory-safety diagnostics for C/C++ programs.
//!
//! Memlens compiles a source file, runs it once under a timer, runs it again
//! under a dynamic-instrumentation tool and turns the tool's transcript into a
//! categorized, queryable result:
//! - **Classification**: memory leaks, invalid access, uninitialized values and
//!   system-call errors via an ordered rule table
//! - **Statistics**: per-category counts, heap usage and per-kind leak summary
//! - **Comparison**: count deltas plus new/resolved errors between two versions
//! - **Hardening**: timeouts on every external process and request-scoped,
//!   self-cleaning workspaces
//!
//! ## Quick Start
//!
//! ```ignore
//! use memlens::{Analyzer, AnalyzerConfig};
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default());
//! let comparison = analyzer.run_comparison("v1/leak.c".as_ref(), "v2/leak.c".as_ref())?;
//! for (category, messages) in &comparison.comparison.new_errors {
//!     println!("{category}: {} new", messages.len());
//! }
//! ```
//!
//! ## Parsing a Captured Transcript
//!
//! ```ignore
//! let transcript = memlens::Transcript::new(std::fs::read_to_string("valgrind.log")?);
//! let parsed = memlens::parse_transcript(&transcript);
//! ```

// Re-export the pipeline
pub use memlens_cli::{
    AnalysisError, Analyzer, AnalyzerConfig, Disposition, MemlensConfig, SourceArtifact,
    build_analysis, build_comparison, resolve_categories,
};

// Re-export diagnostics
pub use memlens_diagnostics::{
    Category, CategorySet, DiagnosticRecord, ParsedDiagnostics, Transcript, parse_transcript,
};

// Re-export stats
pub use memlens_stats::{
    CategoryComparison, CategoryDelta, HeapUsage, LeakSummary, LeakSummaryEntry,
    RuntimeMeasurement, compare_categories, format_bytes,
};

// Re-export report types
pub use memlens_report::{
    AnalysisResult, AnalysisSummary, ComparisonResult, LabeledAnalysis, OutputFormat, Report,
};

/// Run the Memlens CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     memlens::run()
/// }
/// ```
pub use memlens_cli::run;
