//! Leak Summary
//!
//! Extracts the per-kind `"<kind>: X bytes in Y blocks"` lines. Each kind is
//! looked up independently; a missing line leaves that kind absent.

use crate::heap::parse_grouped;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One leak kind as reported by the tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakSummaryEntry {
    /// Byte count as printed, e.g. `"1,024 bytes"`
    pub bytes: String,
    /// Number of blocks
    pub blocks: u64,
}

/// Leak summary for the four leak kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakSummary {
    /// `definitely lost:` line
    pub definitely_lost: Option<LeakSummaryEntry>,
    /// `indirectly lost:` line
    pub indirectly_lost: Option<LeakSummaryEntry>,
    /// `possibly lost:` line
    pub possibly_lost: Option<LeakSummaryEntry>,
    /// `still reachable:` line
    pub still_reachable: Option<LeakSummaryEntry>,
}

impl LeakSummary {
    /// `(label, entry)` pairs in tool order
    pub fn entries(&self) -> [(&'static str, Option<&LeakSummaryEntry>); 4] {
        [
            ("definitely lost", self.definitely_lost.as_ref()),
            ("indirectly lost", self.indirectly_lost.as_ref()),
            ("possibly lost", self.possibly_lost.as_ref()),
            ("still reachable", self.still_reachable.as_ref()),
        ]
    }
}

/// Extract one leak kind (e.g. `"definitely lost"`) from the transcript
pub fn extract_leak_entry(transcript: &str, kind: &str) -> Option<LeakSummaryEntry> {
    let pattern = format!(r"{}: ([\d,]+ bytes) in ([\d,]+) blocks", regex::escape(kind));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(transcript)?;
    Some(LeakSummaryEntry {
        bytes: caps[1].to_string(),
        blocks: parse_grouped(&caps[2])?,
    })
}

/// Extract all four leak kinds
pub fn parse_leak_summary(transcript: &str) -> LeakSummary {
    LeakSummary {
        definitely_lost: extract_leak_entry(transcript, "definitely lost"),
        indirectly_lost: extract_leak_entry(transcript, "indirectly lost"),
        possibly_lost: extract_leak_entry(transcript, "possibly lost"),
        still_reachable: extract_leak_entry(transcript, "still reachable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "\
==4242== LEAK SUMMARY:
==4242==    definitely lost: 40 bytes in 1 blocks
==4242==    indirectly lost: 0 bytes in 0 blocks
==4242==      possibly lost: 2,048 bytes in 1,200 blocks
==4242==         suppressed: 0 bytes in 0 blocks
";

    #[test]
    fn test_parse_leak_summary() {
        let summary = parse_leak_summary(SUMMARY);

        assert_eq!(
            summary.definitely_lost,
            Some(LeakSummaryEntry {
                bytes: "40 bytes".to_string(),
                blocks: 1
            })
        );
        assert_eq!(summary.indirectly_lost.as_ref().map(|e| e.blocks), Some(0));
        assert_eq!(
            summary.possibly_lost,
            Some(LeakSummaryEntry {
                bytes: "2,048 bytes".to_string(),
                blocks: 1200
            })
        );
    }

    #[test]
    fn test_kinds_are_independent() {
        let summary = parse_leak_summary(SUMMARY);
        assert_eq!(summary.still_reachable, None);
        assert!(summary.definitely_lost.is_some());
    }

    #[test]
    fn test_loss_records_are_not_summary_lines() {
        let summary =
            parse_leak_summary("==1== 40 bytes in 1 blocks are definitely lost in loss record 1 of 1");
        assert_eq!(summary, LeakSummary::default());
    }

    #[test]
    fn test_entries_order() {
        let labels: Vec<_> = LeakSummary::default()
            .entries()
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(
            labels,
            vec!["definitely lost", "indirectly lost", "possibly lost", "still reachable"]
        );
    }
}
