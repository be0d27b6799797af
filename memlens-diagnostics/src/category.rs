//! Diagnostic Categories
//!
//! The four classification buckets and the ordered message sets built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification bucket for a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Heap blocks that were never freed
    MemoryLeaks,
    /// Out-of-bounds or otherwise illegal reads and writes
    InvalidAccess,
    /// Values read before being written
    UninitializedValues,
    /// System call parameters pointing at bad memory
    SystemCalls,
}

impl Category {
    /// All categories in their canonical order
    pub const ALL: [Category; 4] = [
        Category::MemoryLeaks,
        Category::InvalidAccess,
        Category::UninitializedValues,
        Category::SystemCalls,
    ];

    /// Wire name used in reports and category requests
    pub fn name(self) -> &'static str {
        match self {
            Category::MemoryLeaks => "memoryLeaks",
            Category::InvalidAccess => "invalidAccess",
            Category::UninitializedValues => "uninitializedValues",
            Category::SystemCalls => "systemCalls",
        }
    }

    /// Human-readable title for terminal output
    pub fn title(self) -> &'static str {
        match self {
            Category::MemoryLeaks => "Memory leaks",
            Category::InvalidAccess => "Invalid access",
            Category::UninitializedValues => "Uninitialized values",
            Category::SystemCalls => "System calls",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Mapping from category to the messages classified into it.
///
/// Messages keep transcript order. A full analysis holds all four categories
/// (possibly empty); a filtered one holds only the requested ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    entries: BTreeMap<Category, Vec<String>>,
}

impl CategorySet {
    /// Empty set with all four categories present
    pub fn new() -> Self {
        Self {
            entries: Category::ALL.into_iter().map(|c| (c, Vec::new())).collect(),
        }
    }

    /// Append a message to a category
    pub fn push(&mut self, category: Category, message: impl Into<String>) {
        self.entries.entry(category).or_default().push(message.into());
    }

    /// Messages for a category; empty if the category is absent
    pub fn get(&self, category: Category) -> &[String] {
        self.entries.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the category is part of this set
    pub fn contains_category(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    /// Number of messages in a category
    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    /// Sum of messages across all categories
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Categories held by this set, in canonical order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.keys().copied()
    }

    /// Iterate `(category, messages)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, m)| (*c, m.as_slice()))
    }

    /// Keep only the given categories
    pub fn retain(&mut self, keep: &[Category]) {
        self.entries.retain(|c, _| keep.contains(c));
    }
}
