//! Diagnostic Transcripts
//!
//! Holds the raw text captured from the instrumentation tool and splits it into
//! diagnostic blocks.
//!
//! ## Block boundaries
//!
//! ```text
//! ==4242== Invalid read of size 4          <- boundary (diagnostic)
//! ==4242==    at 0x109186: main (leak.c:9)
//! ==4242==
//! ==4242== HEAP SUMMARY:                   <- boundary (section, never classified)
//! ==4242==     in use at exit: 40 bytes in 1 blocks
//! ==4242== 40 bytes in 1 blocks are definitely lost in loss record 1 of 1   <- boundary
//! ==4242==    at 0x4848899: malloc (vg_replace_malloc.c:381)
//! ```
//!
//! A boundary line is a pid-prefixed line whose text starts right after the
//! prefix (no indentation). Everything before the first boundary forms one
//! leading block.

use regex::Regex;
use std::sync::OnceLock;

/// Marker the tool prints when a run produced no errors
pub const NO_ERRORS_MARKER: &str = "ERROR SUMMARY: 0 errors";

/// Immutable text captured from one instrumented run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Wrap captured text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Raw transcript text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the tool reported zero errors
    pub fn reports_no_errors(&self) -> bool {
        self.text.contains(NO_ERRORS_MARKER)
    }

    /// Split the transcript into diagnostic blocks
    pub fn blocks(&self) -> Vec<Block<'_>> {
        split_blocks(&self.text)
    }
}

impl From<String> for Transcript {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// What opened a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Text before the first boundary
    Leading,
    /// A diagnostic report (invalid access, uninitialised value, leak, syscall)
    Diagnostic,
    /// A tool summary section (heap, leak or error summary)
    Section,
}

/// A contiguous transcript segment describing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Position of the block in the transcript
    pub index: usize,
    /// What opened the block
    pub kind: BlockKind,
    /// Lines belonging to the block, pid prefix intact
    pub lines: Vec<&'a str>,
}

impl<'a> Block<'a> {
    /// Lines with the `==pid==` prefix removed
    pub fn content(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().map(|line| strip_pid_prefix(line))
    }

    /// Block text with pid prefixes removed, one line per row
    pub fn text(&self) -> String {
        self.content().collect::<Vec<_>>().join("\n")
    }

    /// Whether the block carries only whitespace and empty prefixes
    pub fn is_blank(&self) -> bool {
        self.content().all(|line| line.trim().is_empty())
    }

    /// Locations of every `at <location>` frame, in order
    pub fn frames(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.content().filter_map(frame_location)
    }
}

fn boundary_re() -> &'static Regex {
    static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    BOUNDARY_RE.get_or_init(|| {
        Regex::new(
            r"^==\d+== (?:Invalid |Conditional jump|Uninitialised|Use of uninitialised|Syscall param|definitely lost|indirectly lost|possibly lost|still reachable|[\d,]+ (?:\([\d,]+ direct, [\d,]+ indirect\) )?bytes in [\d,]+ blocks are )",
        )
        .unwrap()
    })
}

fn section_re() -> &'static Regex {
    static SECTION_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    SECTION_RE
        .get_or_init(|| Regex::new(r"^==\d+== (?:HEAP SUMMARY|LEAK SUMMARY|ERROR SUMMARY)").unwrap())
}

fn pid_prefix_re() -> &'static Regex {
    static PID_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    PID_RE.get_or_init(|| Regex::new(r"^==\d+== ?").unwrap())
}

/// Remove a leading `==pid==` marker (and the single space after it)
pub fn strip_pid_prefix(line: &str) -> &str {
    match pid_prefix_re().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Location of a stack frame line (`at 0x1091A6: main (leak.c:9)`), if it is one
pub fn frame_location(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("at ")
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
}

/// Split text into blocks at diagnostic and section boundaries
pub fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks: Vec<Block<'_>> = Vec::new();
    let mut current = Block {
        index: 0,
        kind: BlockKind::Leading,
        lines: Vec::new(),
    };

    for line in text.lines() {
        let kind = if boundary_re().is_match(line) {
            Some(BlockKind::Diagnostic)
        } else if section_re().is_match(line) {
            Some(BlockKind::Section)
        } else {
            None
        };

        if let Some(kind) = kind {
            let next = Block {
                index: current.index + 1,
                kind,
                lines: vec![line],
            };
            let finished = std::mem::replace(&mut current, next);
            if !finished.lines.is_empty() {
                blocks.push(finished);
            }
        } else {
            current.lines.push(line);
        }
    }

    if !current.lines.is_empty() {
        blocks.push(current);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
==4242== Memcheck, a memory error detector
==4242== Command: ./leak.out
==4242==
==4242== Invalid read of size 4
==4242==    at 0x109186: main (leak.c:9)
==4242==  Address 0x4a8f068 is 0 bytes after a block of size 40 alloc'd
==4242==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==4242==
==4242== HEAP SUMMARY:
==4242==     in use at exit: 40 bytes in 1 blocks
==4242== 40 bytes in 1 blocks are definitely lost in loss record 1 of 1
==4242==    at 0x4848899: malloc (vg_replace_malloc.c:381)
==4242==    by 0x10915E: main (leak.c:5)
==4242== LEAK SUMMARY:
==4242==    definitely lost: 40 bytes in 1 blocks
";

    #[test]
    fn test_split_boundaries() {
        let blocks = split_blocks(SAMPLE);
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Leading,
                BlockKind::Diagnostic,
                BlockKind::Section,
                BlockKind::Diagnostic,
                BlockKind::Section,
            ]
        );
        assert_eq!(blocks[1].lines.len(), 5);
        assert!(blocks[1].lines[0].contains("Invalid read of size 4"));
    }

    #[test]
    fn test_indented_summary_lines_do_not_split() {
        let blocks = split_blocks("==1== LEAK SUMMARY:\n==1==    definitely lost: 40 bytes in 1 blocks\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Section);
    }

    #[test]
    fn test_block_indices_follow_transcript_order() {
        let blocks = split_blocks(SAMPLE);
        let indices: Vec<_> = blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_leading_text_without_boundaries() {
        let blocks = split_blocks("definitely lost: 40 bytes in 2 blocks");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Leading);
    }

    #[test]
    fn test_frames() {
        let blocks = split_blocks(SAMPLE);
        let frames: Vec<_> = blocks[1].frames().collect();
        assert_eq!(
            frames,
            vec![
                "0x109186: main (leak.c:9)",
                "0x4848899: malloc (vg_replace_malloc.c:381)"
            ]
        );
    }

    #[test]
    fn test_strip_pid_prefix() {
        assert_eq!(strip_pid_prefix("==12== Invalid read"), "Invalid read");
        assert_eq!(strip_pid_prefix("==12==    at 0x1: f"), "   at 0x1: f");
        assert_eq!(strip_pid_prefix("plain line"), "plain line");
    }

    #[test]
    fn test_frame_location_rejects_non_frames() {
        assert_eq!(frame_location("   by 0x10915E: main (leak.c:5)"), None);
        assert_eq!(frame_location("that was bad"), None);
        assert_eq!(frame_location("  at "), None);
    }

    #[test]
    fn test_no_errors_marker() {
        let transcript = Transcript::new("==1== ERROR SUMMARY: 0 errors from 0 contexts");
        assert!(transcript.reports_no_errors());
        assert!(!Transcript::new("==1== ERROR SUMMARY: 2 errors").reports_no_errors());
    }
}
