//! Instrumented Run Stage
//!
//! Runs the compiled program under the diagnostic tool:
//! `<tool> [extra_args] --leak-check=full <program>`.
//! The tool's stderr is the transcript; the program's own stdout is ignored.
//! Any exit status is a success, since a transcript full of diagnostics is the
//! expected outcome.

use super::workspace::CompiledArtifact;
use crate::error::AnalysisError;
use crate::runner::ProcessRunner;
use memlens_diagnostics::Transcript;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

/// Diagnostic tool invocation settings
#[derive(Debug, Clone)]
pub struct InstrumentedRunStage {
    /// Instrumentation tool program
    pub tool: String,
    /// Arguments inserted before `--leak-check=full`
    pub extra_args: Vec<String>,
    /// Runner carrying the instrumentation timeout
    pub runner: ProcessRunner,
}

impl InstrumentedRunStage {
    /// Full argument list passed to the tool
    pub fn args(&self, program: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("--leak-check=full".into());
        args.push(program.into());
        args
    }

    /// Run `artifact` under the tool and capture its transcript
    pub fn run(&self, artifact: &CompiledArtifact) -> Result<Transcript, AnalysisError> {
        info!("running {} on {}", self.tool, artifact.path().display());
        let output = self
            .runner
            .run(&self.tool, self.args(artifact.path()))
            .map_err(|e| AnalysisError::from_runner("instrumentation", e))?;

        debug!(
            "{} exited with {:?} after {:.2?}, transcript {} bytes",
            self.tool,
            output.exit,
            output.elapsed,
            output.stderr.len()
        );
        Ok(Transcript::new(output.stderr))
    }
}
