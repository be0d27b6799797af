//! Analysis Errors

use crate::runner::RunnerError;
use std::time::Duration;
use thiserror::Error;

/// Failure of an analysis request
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The compiler exited nonzero; carries its stderr verbatim
    #[error("Compilation failed:\n{stderr}")]
    Compile {
        /// Compiler diagnostics
        stderr: String,
    },

    /// An external process could not be launched
    #[error("Failed to launch {program}: {source}")]
    ToolInvocation {
        /// Program that failed to start
        program: String,
        /// Underlying launch error
        source: std::io::Error,
    },

    /// A stage exceeded its configured limit
    #[error("{stage} stage exceeded its {limit:?} timeout")]
    Timeout {
        /// Stage that was killed (`compile` or `instrumentation`)
        stage: &'static str,
        /// Configured limit
        limit: Duration,
    },

    /// The request-scoped workspace could not be prepared
    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    /// The request was rejected before any work was done
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl AnalysisError {
    /// Map a runner failure inside `stage` onto the analysis taxonomy
    pub(crate) fn from_runner(stage: &'static str, err: RunnerError) -> Self {
        match err {
            RunnerError::Spawn { program, source } => {
                AnalysisError::ToolInvocation { program, source }
            }
            RunnerError::Timeout { limit, .. } => AnalysisError::Timeout { stage, limit },
            RunnerError::Io(e) => AnalysisError::Workspace(e),
        }
    }
}
