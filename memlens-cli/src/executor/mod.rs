//! Analysis Executor
//!
//! Runs the external processes for one request and assembles the results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SourceArtifact (staged into a request workspace)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    build    │  <compiler> -g <source> -o <output>
//! └──────┬──────┘
//!        │ CompiledArtifact
//!        ▼
//! ┌─────────────┐
//! │   timing    │  Run once, RuntimeMeasurement
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ instrument  │  <tool> --leak-check=full <output>, Transcript
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Parse + aggregate into AnalysisResult
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  workspace  │  Drop guard removes artifacts
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`build`] - Compile stage
//! - [`timing`] - Timed execution stage
//! - [`instrument`] - Instrumented run stage
//! - [`workspace`] - Request-scoped artifacts and cleanup
//! - [`pipeline`] - Stage sequencing and request entry points
//! - [`report`] - Result assembly
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - Report metadata

mod build;
mod formatting;
mod instrument;
mod metadata;
mod pipeline;
mod report;
mod timing;
mod workspace;

// Re-export public API
pub use build::BuildStage;
pub use formatting::format_human_output;
pub use instrument::InstrumentedRunStage;
pub use metadata::build_report_meta;
pub use pipeline::{Analyzer, AnalyzerConfig, resolve_categories};
pub use report::{build_analysis, build_comparison};
pub use timing::TimedExecutionStage;
pub use workspace::{CompiledArtifact, Disposition, SourceArtifact, Workspace};
