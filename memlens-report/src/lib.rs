#![warn(missing_docs)]
//! Memlens Report - Result Types and Output
//!
//! Serializable analysis and comparison results plus output format selection:
//! - JSON (machine-readable)
//! - Human (terminal text, rendered by the CLI)

mod json;
mod report;

pub use json::{SCHEMA_VERSION, generate_json_report};
pub use report::{
    AnalysisResult, AnalysisSummary, ComparisonResult, LabeledAnalysis, Report, ReportMeta,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
