//! Core data models for Typist
//!
//! Internal types shared by the store, the correctors and the dictionary writer.
//! None of these cross the FFI boundary.

// ─────────────────────────────────────────────────────────────────────────────
// DICTIONARY ROWS
// ─────────────────────────────────────────────────────────────────────────────

/// One dictionary word as the store keeps it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Display form, with corpus capitalization ("Shawn", "USA", "the")
    pub word: String,
    pub word_lower: String,
    pub word_lower_reversed: String,
    /// Lower = more frequent
    pub frequency_rank: i64,
    /// Hidden words never appear as suggestions but still count as valid words
    pub hidden: bool,
}

impl DictionaryEntry {
    pub fn new(word: impl Into<String>, frequency_rank: i64, hidden: bool) -> Self {
        let word = word.into();
        let word_lower = word.to_lowercase();
        let word_lower_reversed = word_lower.chars().rev().collect();
        Self {
            word,
            word_lower,
            word_lower_reversed,
            frequency_rank,
            hidden,
        }
    }
}

/// A BK-tree node row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BkNode {
    pub node_id: i64,
    pub word: String,
    pub frequency_rank: i64,
    pub hidden: bool,
}

/// A BK-tree edge row: `distance` is the edit distance between parent and child words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BkEdge {
    pub parent_id: i64,
    pub child_id: i64,
    pub distance: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// CORRECTION RESULTS
// ─────────────────────────────────────────────────────────────────────────────

/// A correction candidate produced by either backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub distance: u32,
    pub frequency_rank: i64,
}

impl Candidate {
    /// Ordering key: closer first, then more frequent
    pub fn rank_key(&self) -> (u32, i64) {
        (self.distance, self.frequency_rank)
    }
}
