//! Runtime Measurement
//!
//! Outcome of the timed execution stage. "Timing unavailable" and "program
//! crashed" are distinct states.

use crate::format::format_millis;
use serde::{Deserialize, Serialize};

/// Display string for any statistic that could not be obtained
pub const NOT_AVAILABLE: &str = "Not available";

/// Result of running the compiled program once under a timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RuntimeMeasurement {
    /// Program ran to completion with the given exit code
    #[serde(rename_all = "camelCase")]
    Completed {
        /// Wall-clock time in milliseconds
        elapsed_ms: f64,
        /// Exit status of the program
        exit_code: i32,
    },
    /// Program was terminated by a signal
    #[serde(rename_all = "camelCase")]
    Crashed {
        /// Wall-clock time until the signal, in milliseconds
        elapsed_ms: f64,
        /// Terminating signal number
        signal: i32,
    },
    /// Program exceeded the execution timeout and was killed
    #[serde(rename_all = "camelCase")]
    TimedOut {
        /// Configured limit in milliseconds
        limit_ms: f64,
    },
    /// Program could not be launched
    Unavailable {
        /// Launch error text
        reason: String,
    },
}

impl RuntimeMeasurement {
    /// Elapsed wall-clock time, if the program ran to an exit
    pub fn elapsed_ms(&self) -> Option<f64> {
        match self {
            RuntimeMeasurement::Completed { elapsed_ms, .. }
            | RuntimeMeasurement::Crashed { elapsed_ms, .. } => Some(*elapsed_ms),
            RuntimeMeasurement::TimedOut { .. } | RuntimeMeasurement::Unavailable { .. } => None,
        }
    }

    /// `"12.34ms"` or `"Not available"`
    pub fn display(&self) -> String {
        self.elapsed_ms()
            .map(format_millis)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Whether the program was killed by a signal
    pub fn is_crash(&self) -> bool {
        matches!(self, RuntimeMeasurement::Crashed { .. })
    }
}

impl std::fmt::Display for RuntimeMeasurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeMeasurement::Completed {
                elapsed_ms,
                exit_code,
            } => write!(f, "{} (exit code {})", format_millis(*elapsed_ms), exit_code),
            RuntimeMeasurement::Crashed { elapsed_ms, signal } => {
                write!(f, "{} (crashed, signal {})", format_millis(*elapsed_ms), signal)
            }
            RuntimeMeasurement::TimedOut { limit_ms } => {
                write!(f, "{} (timed out after {})", NOT_AVAILABLE, format_millis(*limit_ms))
            }
            RuntimeMeasurement::Unavailable { reason } => write!(f, "{} ({})", NOT_AVAILABLE, reason),
        }
    }
}
