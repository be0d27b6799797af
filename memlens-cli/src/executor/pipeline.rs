//! Analysis Pipeline
//!
//! Sequences the stages for one source and exposes the three request entry
//! points: basic analysis, custom (category-filtered) analysis and comparison.
//!
//! Each stage short-circuits the request on failure. The [`Workspace`] guard
//! owns every artifact, so cleanup runs on every exit path.

use super::build::BuildStage;
use super::instrument::InstrumentedRunStage;
use super::report::{build_analysis, build_comparison};
use super::timing::TimedExecutionStage;
use super::workspace::{SourceArtifact, Workspace};
use crate::error::AnalysisError;
use crate::runner::ProcessRunner;
use memlens_diagnostics::Category;
use memlens_report::{AnalysisResult, ComparisonResult, LabeledAnalysis};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Resolved settings for the analysis stages
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Compiler program
    pub compiler: String,
    /// Arguments inserted before `-g`
    pub compiler_args: Vec<String>,
    /// Compile timeout
    pub compile_timeout: Duration,
    /// Timed run timeout
    pub execution_timeout: Duration,
    /// Instrumentation tool program
    pub tool: String,
    /// Arguments inserted before `--leak-check=full`
    pub tool_args: Vec<String>,
    /// Instrumented run timeout
    pub instrumentation_timeout: Duration,
    /// Run both sides of a comparison concurrently
    pub parallel_compare: bool,
    /// Parent directory for request workspaces
    pub work_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            compiler_args: Vec::new(),
            compile_timeout: Duration::from_secs(60),
            execution_timeout: Duration::from_secs(30),
            tool: "valgrind".to_string(),
            tool_args: Vec::new(),
            instrumentation_timeout: Duration::from_secs(120),
            parallel_compare: true,
            work_dir: None,
        }
    }
}

/// Runs Build → TimedExecution → InstrumentedRun → Parse → Aggregate
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer with resolved settings
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Settings this analyzer runs with
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn build_stage(&self) -> BuildStage {
        BuildStage {
            compiler: self.config.compiler.clone(),
            extra_args: self.config.compiler_args.clone(),
            runner: ProcessRunner::new(self.config.compile_timeout),
        }
    }

    fn timed_stage(&self) -> TimedExecutionStage {
        TimedExecutionStage {
            runner: ProcessRunner::new(self.config.execution_timeout),
        }
    }

    fn instrumented_stage(&self) -> InstrumentedRunStage {
        InstrumentedRunStage {
            tool: self.config.tool.clone(),
            extra_args: self.config.tool_args.clone(),
            runner: ProcessRunner::new(self.config.instrumentation_timeout),
        }
    }

    /// Run every stage inside an existing workspace
    fn run_pipeline(&self, workspace: &Workspace) -> Result<AnalysisResult, AnalysisError> {
        let artifact = self
            .build_stage()
            .run(workspace.source(), workspace.output_path())?;
        let execution = self.timed_stage().run(&artifact);
        let transcript = self.instrumented_stage().run(&artifact)?;
        let analysis = build_analysis(&transcript, execution);

        info!(
            "{}: {} errors",
            workspace.source().label(),
            analysis.summary.total_errors
        );
        Ok(analysis)
    }

    /// Analyze a source artifact the request already owns.
    ///
    /// A transient source is deleted together with the compiled artifact.
    pub fn analyze_artifact(&self, source: SourceArtifact) -> Result<AnalysisResult, AnalysisError> {
        let workspace = Workspace::create(self.config.work_dir.as_deref(), source)?;
        self.run_pipeline(&workspace)
    }

    /// Full analysis of one source file. The caller's file is copied, never modified or removed.
    pub fn run_basic_analysis(&self, source: &Path) -> Result<AnalysisResult, AnalysisError> {
        let workspace = Workspace::stage(self.config.work_dir.as_deref(), source)?;
        self.run_pipeline(&workspace)
    }

    /// Analysis restricted to the requested categories.
    ///
    /// Unknown category names are ignored. An empty request is rejected.
    pub fn run_custom_analysis<S: AsRef<str>>(
        &self,
        source: &Path,
        requested: &[S],
    ) -> Result<AnalysisResult, AnalysisError> {
        let categories = resolve_categories(requested)?;
        Ok(self.run_basic_analysis(source)?.filtered(&categories))
    }

    /// Analyze two sources and diff them (older → newer)
    pub fn run_comparison(
        &self,
        older: &Path,
        newer: &Path,
    ) -> Result<ComparisonResult, AnalysisError> {
        let labeled = |path: &Path| -> Result<LabeledAnalysis, AnalysisError> {
            Ok(LabeledAnalysis {
                name: SourceArtifact::retained(path).label(),
                analysis: self.run_basic_analysis(path)?,
            })
        };

        let (older, newer) = if self.config.parallel_compare {
            rayon::join(|| labeled(older), || labeled(newer))
        } else {
            (labeled(older), labeled(newer))
        };

        Ok(build_comparison(older?, newer?))
    }
}

/// Parse requested category names, dropping unknown ones
pub fn resolve_categories<S: AsRef<str>>(requested: &[S]) -> Result<Vec<Category>, AnalysisError> {
    if requested.is_empty() {
        return Err(AnalysisError::MalformedRequest(
            "at least one category must be requested".to_string(),
        ));
    }

    let mut categories = Vec::new();
    for name in requested {
        match name.as_ref().parse::<Category>() {
            Ok(category) if !categories.contains(&category) => categories.push(category),
            Ok(_) => {}
            Err(e) => warn!("ignoring requested category: {}", e),
        }
    }
    Ok(categories)
}
