//! Heap Usage
//!
//! Extracts the tool's `total heap usage` line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Allocation totals reported for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeapUsage {
    /// Number of allocations
    pub allocations: u64,
    /// Number of frees
    pub frees: u64,
    /// Total bytes allocated over the run
    pub bytes_allocated: u64,
    /// `allocations - frees`; negative when the tool reports inconsistently
    pub unfreed_allocations: i64,
}

impl HeapUsage {
    /// Build from raw counts, deriving the unfreed count
    pub fn new(allocations: u64, frees: u64, bytes_allocated: u64) -> Self {
        Self {
            allocations,
            frees,
            bytes_allocated,
            unfreed_allocations: saturating_difference(allocations, frees),
        }
    }
}

/// `a - b`, pinned to the `i64` range
fn saturating_difference(a: u64, b: u64) -> i64 {
    let difference = i128::from(a) - i128::from(b);
    difference.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn heap_usage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| {
        Regex::new(r"total heap usage: ([\d,]+) allocs, ([\d,]+) frees, ([\d,]+) bytes allocated")
            .unwrap()
    })
}

/// Parse an integer that may carry thousands separators (`1,024`)
pub fn parse_grouped(value: &str) -> Option<u64> {
    value.replace(',', "").parse().ok()
}

/// Find and parse the heap usage line; `None` if absent or unparseable
pub fn parse_heap_usage(transcript: &str) -> Option<HeapUsage> {
    let caps = heap_usage_re().captures(transcript)?;
    Some(HeapUsage::new(
        parse_grouped(&caps[1])?,
        parse_grouped(&caps[2])?,
        parse_grouped(&caps[3])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heap_usage() {
        let usage =
            parse_heap_usage("==1==   total heap usage: 12 allocs, 10 frees, 1,024 bytes allocated")
                .unwrap();
        assert_eq!(usage.allocations, 12);
        assert_eq!(usage.frees, 10);
        assert_eq!(usage.bytes_allocated, 1024);
        assert_eq!(usage.unfreed_allocations, 2);
    }

    #[test]
    fn test_inconsistent_counts_are_not_clamped() {
        let usage = HeapUsage::new(3, 5, 0);
        assert_eq!(usage.unfreed_allocations, -2);
    }

    #[test]
    fn test_counts_beyond_i64_saturate() {
        assert_eq!(HeapUsage::new(u64::MAX, 0, 0).unfreed_allocations, i64::MAX);
        assert_eq!(HeapUsage::new(0, u64::MAX, 0).unfreed_allocations, i64::MIN);
        assert_eq!(
            HeapUsage::new(u64::MAX, u64::MAX - 7, 0).unfreed_allocations,
            7
        );
    }

    #[test]
    fn test_missing_line() {
        assert_eq!(parse_heap_usage("==1== ERROR SUMMARY: 0 errors"), None);
    }

    #[test]
    fn test_large_grouped_values() {
        let usage = parse_heap_usage(
            "total heap usage: 1,234,567 allocs, 1,234,000 frees, 9,876,543,210 bytes allocated",
        )
        .unwrap();
        assert_eq!(usage.allocations, 1_234_567);
        assert_eq!(usage.bytes_allocated, 9_876_543_210);
        assert_eq!(usage.unfreed_allocations, 567);
    }

    #[test]
    fn test_parse_grouped() {
        assert_eq!(parse_grouped("1,048,576"), Some(1_048_576));
        assert_eq!(parse_grouped("0"), Some(0));
        assert_eq!(parse_grouped(""), None);
    }
}
