#![warn(missing_docs)]
//! Memlens Statistical Engine
//!
//! Aggregates and compares diagnostic analyses:
//! - Per-category counts and totals
//! - Heap usage (`total heap usage` line) with derived unfreed allocations
//! - Per-kind leak summary
//! - Runtime measurement states
//! - Display formatting for byte counts, integers and durations
//! - Older/newer set-membership diff with count deltas

mod comparison;
mod format;
mod heap;
mod leaks;
mod runtime;
mod summary;

pub use comparison::{CategoryComparison, CategoryDelta, compare_categories, percentage_change};
pub use format::{format_bytes, format_count, format_millis};
pub use heap::{HeapUsage, parse_grouped, parse_heap_usage};
pub use leaks::{LeakSummary, LeakSummaryEntry, extract_leak_entry, parse_leak_summary};
pub use runtime::{NOT_AVAILABLE, RuntimeMeasurement};
pub use summary::{AnalysisStatistics, compute_statistics, count_categories};
