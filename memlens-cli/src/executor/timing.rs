//! Timed Execution Stage
//!
//! Runs the compiled program once and records wall-clock time. This stage never
//! fails the analysis: every outcome maps onto a [`RuntimeMeasurement`] state.

use super::workspace::CompiledArtifact;
use crate::runner::{ExitOutcome, ProcessRunner, RunnerError};
use memlens_stats::RuntimeMeasurement;
use std::time::Duration;
use tracing::{info, warn};

/// Timed run of the compiled program
#[derive(Debug, Clone, Copy)]
pub struct TimedExecutionStage {
    /// Runner carrying the execution timeout
    pub runner: ProcessRunner,
}

impl TimedExecutionStage {
    /// Execute `artifact` directly and measure it
    pub fn run(&self, artifact: &CompiledArtifact) -> RuntimeMeasurement {
        let measurement = match self.runner.run(artifact.path(), Vec::<&str>::new()) {
            Ok(output) => {
                let elapsed_ms = millis(output.elapsed);
                match output.exit {
                    ExitOutcome::Exited(exit_code) => RuntimeMeasurement::Completed {
                        elapsed_ms,
                        exit_code,
                    },
                    ExitOutcome::Signaled(signal) => {
                        RuntimeMeasurement::Crashed { elapsed_ms, signal }
                    }
                }
            }
            Err(RunnerError::Timeout { limit, .. }) => RuntimeMeasurement::TimedOut {
                limit_ms: millis(limit),
            },
            Err(e) => {
                warn!("timed run of {} unavailable: {}", artifact.path().display(), e);
                RuntimeMeasurement::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        info!("runtime: {}", measurement);
        measurement
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
