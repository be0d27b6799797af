//! Diagnostic Parser
//!
//! Turns a transcript into classified records and the category set built from them.
//!
//! ## Pipeline
//!
//! ```text
//! Transcript
//!     │  "ERROR SUMMARY: 0 errors"? ──► empty CategorySet
//!     ▼
//! split_blocks  (diagnostic / section / leading)
//!     │
//!     ▼
//! classify      (rule table, first match wins, sections skipped)
//!     │
//!     ▼
//! DiagnosticRecord { block, category, message, stack_trace }
//! ```
//!
//! Stack traces are attached by block index, so two distinct diagnostics that
//! normalize to the same message each keep their own frames.

use crate::category::{Category, CategorySet};
use crate::rules::classify;
use crate::transcript::{BlockKind, Transcript};
use serde::{Deserialize, Serialize};

/// One classified diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    /// Index of the block this record came from
    pub block: usize,
    /// Classification bucket
    pub category: Category,
    /// Normalized human-readable message
    pub message: String,
    /// `at <location>` frames of the block, trimmed, in order
    pub stack_trace: Vec<String>,
}

impl DiagnosticRecord {
    /// Message followed by its indented stack trace, if any
    pub fn render(&self) -> String {
        if self.stack_trace.is_empty() {
            return self.message.clone();
        }
        let frames: Vec<String> = self
            .stack_trace
            .iter()
            .map(|frame| format!("  {}", frame))
            .collect();
        format!("{}\nStack trace:\n{}", self.message, frames.join("\n"))
    }
}

/// Output of parsing one transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiagnostics {
    /// Messages grouped by category, in transcript order
    pub categories: CategorySet,
    /// Records in transcript order
    pub records: Vec<DiagnosticRecord>,
}

/// Parse a transcript into classified records
pub fn parse_transcript(transcript: &Transcript) -> ParsedDiagnostics {
    let mut categories = CategorySet::new();
    let mut records = Vec::new();

    if transcript.reports_no_errors() {
        return ParsedDiagnostics {
            categories,
            records,
        };
    }

    for block in transcript.blocks() {
        if block.kind == BlockKind::Section || block.is_blank() {
            continue;
        }

        let Some((rule, message)) = classify(&block) else {
            continue;
        };

        let stack_trace = block
            .frames()
            .map(|location| format!("at {}", location))
            .collect();

        categories.push(rule.category, message.clone());
        records.push(DiagnosticRecord {
            block: block.index,
            category: rule.category,
            message,
            stack_trace,
        });
    }

    ParsedDiagnostics {
        categories,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAK_AND_READ: &str = "\
==4242== Memcheck, a memory error detector
==4242== Command: ./leak.out
==4242==
==4242== Invalid read of size 4
==4242==    at 0x109186: main (leak.c:9)
==4242==  Address 0x4a8f068 is 0 bytes after a block of size 40 alloc'd
==4242==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==4242==    by 0x10915E: main (leak.c:5)
==4242==
==4242== HEAP SUMMARY:
==4242==     in use at exit: 40 bytes in 1 blocks
==4242==   total heap usage: 2 allocs, 1 frees, 1,064 bytes allocated
==4242==
==4242== 40 bytes in 1 blocks are definitely lost in loss record 1 of 1
==4242==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==4242==    by 0x10915E: main (leak.c:5)
==4242==
==4242== LEAK SUMMARY:
==4242==    definitely lost: 40 bytes in 1 blocks
==4242==    indirectly lost: 0 bytes in 0 blocks
==4242==      possibly lost: 0 bytes in 0 blocks
==4242==    still reachable: 0 bytes in 0 blocks
==4242==         suppressed: 0 bytes in 0 blocks
==4242==
==4242== ERROR SUMMARY: 2 errors from 2 contexts (suppressed: 0 from 0)
";

    #[test]
    fn test_zero_error_fast_path() {
        let transcript = Transcript::new(
            "==9== Invalid read of size 4\n==9==    at 0x1: main (a.c:1)\n==9== ERROR SUMMARY: 0 errors from 0 contexts",
        );
        let parsed = parse_transcript(&transcript);
        assert_eq!(parsed.categories.total(), 0);
        assert_eq!(parsed.categories.categories().count(), 4);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_leak_and_invalid_read() {
        let parsed = parse_transcript(&Transcript::new(LEAK_AND_READ));

        assert_eq!(parsed.categories.total(), 2);
        assert_eq!(
            parsed.categories.get(Category::InvalidAccess),
            ["Invalid read of size 4 at 0x109186: main (leak.c:9)"]
        );
        assert_eq!(
            parsed.categories.get(Category::MemoryLeaks),
            ["definitely lost: 40 bytes"]
        );
        assert!(parsed.categories.get(Category::UninitializedValues).is_empty());
        assert!(parsed.categories.get(Category::SystemCalls).is_empty());
    }

    #[test]
    fn test_stack_trace_attached() {
        let parsed = parse_transcript(&Transcript::new(LEAK_AND_READ));
        let read = &parsed.records[0];

        assert_eq!(read.category, Category::InvalidAccess);
        assert_eq!(
            read.stack_trace,
            vec![
                "at 0x109186: main (leak.c:9)",
                "at 0x4848899: malloc (vg_replace_malloc.c:381)"
            ]
        );
        assert_eq!(
            read.render(),
            "Invalid read of size 4 at 0x109186: main (leak.c:9)\n\
             Stack trace:\n  at 0x109186: main (leak.c:9)\n  at 0x4848899: malloc (vg_replace_malloc.c:381)"
        );
    }

    #[test]
    fn test_duplicate_messages_keep_their_own_traces() {
        let transcript = Transcript::new(
            "\
==5== 16 bytes in 1 blocks are definitely lost in loss record 1 of 2
==5==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==5==    by 0x109170: make_node (list.c:8)
==5== 16 bytes in 1 blocks are definitely lost in loss record 2 of 2
==5==    at 0x4848899: calloc (vg_replace_malloc.c:1340)
==5==    by 0x1091A0: make_tree (tree.c:14)
",
        );
        let parsed = parse_transcript(&transcript);

        assert_eq!(
            parsed.categories.get(Category::MemoryLeaks),
            ["definitely lost: 16 bytes", "definitely lost: 16 bytes"]
        );
        assert_eq!(parsed.records.len(), 2);
        assert_ne!(parsed.records[0].block, parsed.records[1].block);
        assert_eq!(
            parsed.records[1].stack_trace,
            vec!["at 0x4848899: calloc (vg_replace_malloc.c:1340)"]
        );
    }

    #[test]
    fn test_record_without_frames_renders_message_only() {
        let parsed = parse_transcript(&Transcript::new("definitely lost: 40 bytes in 2 blocks"));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].render(), "definitely lost: 40 bytes");
        assert_eq!(parsed.categories.count(Category::MemoryLeaks), 1);
    }

    #[test]
    fn test_unmatched_blocks_are_dropped() {
        let transcript = Transcript::new(
            "\
==3== Invalid free() / delete / delete[] / realloc()
==3==    at 0x484B27F: free (vg_replace_malloc.c:872)
==3== Conditional jump or move depends on uninitialised value(s)
==3==    at 0x109159: main (cond.c:6)
",
        );
        let parsed = parse_transcript(&transcript);
        assert_eq!(parsed.categories.total(), 0);
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let transcript = Transcript::new(LEAK_AND_READ);
        assert_eq!(parse_transcript(&transcript), parse_transcript(&transcript));
    }

    #[test]
    fn test_empty_transcript() {
        let parsed = parse_transcript(&Transcript::new(""));
        assert_eq!(parsed.categories, CategorySet::new());
    }
}
