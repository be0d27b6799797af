//! Build Stage
//!
//! Compiles a source artifact with debug symbols:
//! `<compiler> [extra_args] -g <source> -o <output>`.
//! Compiler stdout is discarded; stderr is the only diagnostic a caller gets
//! for bad input, so it is carried verbatim in [`AnalysisError::Compile`].

use super::workspace::{CompiledArtifact, SourceArtifact};
use crate::error::AnalysisError;
use crate::runner::ProcessRunner;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

/// Compiler invocation settings
#[derive(Debug, Clone)]
pub struct BuildStage {
    /// Compiler program
    pub compiler: String,
    /// Arguments inserted before `-g`
    pub extra_args: Vec<String>,
    /// Runner carrying the compile timeout
    pub runner: ProcessRunner,
}

impl BuildStage {
    /// Full argument list passed to the compiler
    pub fn args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("-g".into());
        args.push(source.into());
        args.push("-o".into());
        args.push(output.into());
        args
    }

    /// Compile `source` into `output`
    pub fn run(
        &self,
        source: &SourceArtifact,
        output: &Path,
    ) -> Result<CompiledArtifact, AnalysisError> {
        info!("compiling {}", source.label());
        let result = self
            .runner
            .run(&self.compiler, self.args(source.path(), output))
            .map_err(|e| AnalysisError::from_runner("compile", e))?;

        if !result.success() {
            debug!("compiler exited with {:?}", result.exit);
            return Err(AnalysisError::Compile {
                stderr: result.stderr,
            });
        }
        if !output.exists() {
            return Err(AnalysisError::Compile {
                stderr: format!(
                    "{}{} exited successfully but did not produce {}",
                    result.stderr,
                    self.compiler,
                    output.display()
                ),
            });
        }

        debug!("compiled {} in {:.2?}", output.display(), result.elapsed);
        Ok(CompiledArtifact::new(output.to_path_buf()))
    }
}
