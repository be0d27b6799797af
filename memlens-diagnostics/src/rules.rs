//! Classification Rules
//!
//! Ordered rule table mapping diagnostic blocks to categories. Rules are
//! evaluated top to bottom; the first rule whose extractor yields a message
//! wins. A block no rule accepts contributes nothing.

use crate::category::Category;
use crate::transcript::Block;
use regex::Regex;
use std::sync::OnceLock;

/// One entry in the classification table
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short identifier used in logs
    pub name: &'static str,
    /// Category assigned on match
    pub category: Category,
    /// Produces the normalized message, or `None` if the block does not match
    pub extract: fn(&Block<'_>, &str) -> Option<String>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// Classification rules in priority order
pub static RULES: &[Rule] = &[
    Rule {
        name: "memory-leak",
        category: Category::MemoryLeaks,
        extract: extract_leak,
    },
    Rule {
        name: "invalid-access",
        category: Category::InvalidAccess,
        extract: extract_invalid_access,
    },
    Rule {
        name: "uninitialized-value",
        category: Category::UninitializedValues,
        extract: extract_uninitialized,
    },
    Rule {
        name: "system-call",
        category: Category::SystemCalls,
        extract: extract_syscall,
    },
];

/// Apply the rule table to a block, returning the winning rule and its message
pub fn classify(block: &Block<'_>) -> Option<(&'static Rule, String)> {
    let text = block.text();
    RULES
        .iter()
        .find_map(|rule| (rule.extract)(block, &text).map(|message| (rule, message)))
}

fn leak_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| {
        Regex::new(r"(definitely lost|indirectly lost|possibly lost|still reachable): ([\d,]+ bytes)")
            .unwrap()
    })
}

fn loss_record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| {
        Regex::new(
            r"([\d,]+) (?:\([\d,]+ direct, [\d,]+ indirect\) )?bytes in [\d,]+ blocks are (definitely lost|indirectly lost|possibly lost|still reachable)",
        )
        .unwrap()
    })
}

fn invalid_access_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| Regex::new(r"Invalid (read|write) of size (\d+)").unwrap())
}

fn uninitialized_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| Regex::new(r"Use of uninitialised value of size (\d+)").unwrap())
}

fn syscall_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| Regex::new(r"(?i)syscall (?:param )?([a-z_][a-z0-9_]*) ?\(").unwrap())
}

fn read_write_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:read|write)").unwrap())
}

/// `"<kind>: <bytes>"`, from either a summary line or a loss record
fn extract_leak(_block: &Block<'_>, text: &str) -> Option<String> {
    if let Some(caps) = leak_summary_re().captures(text) {
        return Some(format!("{}: {}", &caps[1], &caps[2]));
    }
    loss_record_re()
        .captures(text)
        .map(|caps| format!("{}: {} bytes", &caps[2], &caps[1]))
}

/// `"Invalid <read|write> of size <N> at <location>"`; requires a frame
fn extract_invalid_access(block: &Block<'_>, text: &str) -> Option<String> {
    let caps = invalid_access_re().captures(text)?;
    let location = block.frames().next()?;
    Some(format!(
        "Invalid {} of size {} at {}",
        &caps[1], &caps[2], location
    ))
}

fn extract_uninitialized(_block: &Block<'_>, text: &str) -> Option<String> {
    uninitialized_re()
        .captures(text)
        .map(|caps| format!("Uninitialized value used (size: {} bytes)", &caps[1]))
}

fn extract_syscall(_block: &Block<'_>, text: &str) -> Option<String> {
    if !read_write_re().is_match(text) {
        return None;
    }
    syscall_re()
        .captures(text)
        .map(|caps| format!("System call error in {}", &caps[1]))
}
