#![warn(missing_docs)]
//! Memlens Diagnostics - Transcript Parsing and Classification
//!
//! Parses the textual report of a memory-checking instrumentation tool into
//! typed records:
//! - Block splitting at pid-prefixed diagnostic and summary-section boundaries
//! - Rule-table classification into four categories (first match wins)
//! - Stack-trace attachment keyed by block index
//!
//! Unknown diagnostic shapes are dropped rather than treated as errors; the
//! tool's output format is an open set.

mod category;
mod parser;
mod rules;
mod transcript;

pub use category::{Category, CategorySet};
pub use parser::{DiagnosticRecord, ParsedDiagnostics, parse_transcript};
pub use rules::{RULES, Rule, classify};
pub use transcript::{
    Block, BlockKind, NO_ERRORS_MARKER, Transcript, frame_location, split_blocks,
    strip_pid_prefix,
};
