//! Report Metadata
//!
//! Version, timestamp and tool identity recorded alongside every report.

use super::pipeline::AnalyzerConfig;
use chrono::Utc;
use memlens_diagnostics::Category;
use memlens_report::{ReportMeta, SCHEMA_VERSION};

/// Build report metadata for a run with the given configuration
pub fn build_report_meta(
    config: &AnalyzerConfig,
    requested_categories: Option<Vec<Category>>,
) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        compiler: config.compiler.clone(),
        tool: config.tool.clone(),
        requested_categories,
    }
}
