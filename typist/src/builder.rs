//! Dictionary store writer
//!
//! Turns a frequency-ranked word list into the SQLite store the engine opens
//! read-only: word tables, SymSpell delete index, BK-tree, letter distributions.
//! Used by the `build-dictionary` tool, the benches and every store-backed test.

use crate::database::DatabaseResult;
use crate::distance::unbounded_distance;
use crate::models::{BkEdge, DictionaryEntry};
use crate::symspell::{delete_hash, delete_variants};
use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

/// Delete-variant depth written to the index when none is configured
pub const DEFAULT_MAX_DELETE_DISTANCE: usize = 2;

const SCHEMA: &str = r#"
    CREATE TABLE words (
        word_lower TEXT NOT NULL,
        word_lower_reversed TEXT NOT NULL,
        frequency_rank INTEGER NOT NULL,
        word TEXT NOT NULL,
        hidden INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (word_lower, frequency_rank)
    ) WITHOUT ROWID;

    CREATE TABLE words_by_suffix (
        word_lower_reversed TEXT NOT NULL,
        frequency_rank INTEGER NOT NULL,
        word TEXT NOT NULL,
        word_lower TEXT NOT NULL,
        hidden INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (word_lower_reversed, frequency_rank)
    ) WITHOUT ROWID;

    CREATE TABLE symspell_deletes (
        delete_hash INTEGER NOT NULL,
        word_lower TEXT NOT NULL,
        frequency_rank INTEGER NOT NULL,
        word TEXT NOT NULL,
        PRIMARY KEY (delete_hash, word_lower)
    ) WITHOUT ROWID;

    CREATE TABLE bk_nodes (
        node_id INTEGER PRIMARY KEY,
        word TEXT NOT NULL,
        frequency_rank INTEGER NOT NULL,
        hidden INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE bk_edges (
        parent_id INTEGER NOT NULL,
        distance INTEGER NOT NULL,
        child_id INTEGER NOT NULL,
        PRIMARY KEY (parent_id, distance, child_id)
    ) WITHOUT ROWID;

    CREATE TABLE kv (
        key TEXT NOT NULL PRIMARY KEY,
        value TEXT NOT NULL
    ) WITHOUT ROWID;

    CREATE TABLE bigram_frequencies (
        prefix TEXT NOT NULL PRIMARY KEY,
        distribution TEXT NOT NULL
    ) WITHOUT ROWID;

    CREATE TABLE trigram_frequencies (
        prefix TEXT NOT NULL PRIMARY KEY,
        distribution TEXT NOT NULL
    ) WITHOUT ROWID;
"#;

/// Created after the bulk insert so the inserts don't maintain them row by row
const INDEXES: &str = r#"
    CREATE INDEX idx_symspell_covering ON symspell_deletes (delete_hash, frequency_rank, word);
    CREATE INDEX idx_words_rank ON words (hidden, frequency_rank);
    CREATE INDEX idx_words_reversed ON words (word_lower_reversed);
"#;

/// Row counts of a written store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub words: usize,
    pub hidden: usize,
    pub deletes: usize,
    pub bk_nodes: usize,
    pub bk_edges: usize,
    pub bigram_prefixes: usize,
    pub trigram_prefixes: usize,
}

/// Builds a dictionary store from words given most frequent first.
#[derive(Debug, Clone)]
pub struct DictionaryBuilder {
    entries: Vec<DictionaryEntry>,
    max_delete_distance: usize,
}

impl DictionaryBuilder {
    /// Rank follows input order. Blank lines are skipped; a word repeated in a
    /// different case keeps its first spelling and rank.
    pub fn from_ranked_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() || !seen.insert(word.to_lowercase()) {
                continue;
            }
            let rank = entries.len() as i64 + 1;
            entries.push(DictionaryEntry::new(word, rank, false));
        }
        Self {
            entries,
            max_delete_distance: DEFAULT_MAX_DELETE_DISTANCE,
        }
    }

    /// Mark words (matched case-insensitively) as hidden. Unknown words are ignored.
    pub fn with_hidden<I, S>(mut self, hidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hidden: HashSet<String> = hidden
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        for entry in &mut self.entries {
            if hidden.contains(&entry.word_lower) {
                entry.hidden = true;
            }
        }
        self
    }

    pub fn max_delete_distance(mut self, distance: usize) -> Self {
        self.max_delete_distance = distance;
        self
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Write a fresh store at `path`. Fails if the file already holds these tables.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> DatabaseResult<BuildStats> {
        let start = Instant::now();
        let mut conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=OFF; PRAGMA synchronous=OFF;")?;
        conn.execute_batch(SCHEMA)?;

        let mut stats = BuildStats::default();
        let tx = conn.transaction()?;

        self.write_words(&tx, &mut stats)?;
        self.write_deletes(&tx, &mut stats)?;
        self.write_bk_tree(&tx, &mut stats)?;
        self.write_distributions(&tx, &mut stats)?;

        tx.execute_batch(INDEXES)?;
        tx.commit()?;

        tracing::info!(
            words = stats.words,
            hidden = stats.hidden,
            deletes = stats.deletes,
            bk_edges = stats.bk_edges,
            "dictionary written in {:.1}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(stats)
    }

    fn write_words(&self, conn: &Connection, stats: &mut BuildStats) -> DatabaseResult<()> {
        let mut words = conn.prepare(
            "INSERT INTO words (word_lower, word_lower_reversed, frequency_rank, word, hidden) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut by_suffix = conn.prepare(
            "INSERT INTO words_by_suffix (word_lower_reversed, frequency_rank, word, word_lower, hidden) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        for entry in &self.entries {
            words.execute(params![
                entry.word_lower,
                entry.word_lower_reversed,
                entry.frequency_rank,
                entry.word,
                entry.hidden
            ])?;
            by_suffix.execute(params![
                entry.word_lower_reversed,
                entry.frequency_rank,
                entry.word,
                entry.word_lower,
                entry.hidden
            ])?;
            stats.words += 1;
            if entry.hidden {
                stats.hidden += 1;
            }
        }
        Ok(())
    }

    /// Hidden words are left out: they must never come back as corrections
    fn write_deletes(&self, conn: &Connection, stats: &mut BuildStats) -> DatabaseResult<()> {
        let mut insert = conn.prepare(
            "INSERT OR IGNORE INTO symspell_deletes (delete_hash, word_lower, frequency_rank, word) VALUES (?1, ?2, ?3, ?4)",
        )?;

        for entry in self.entries.iter().filter(|e| !e.hidden) {
            for variant in delete_variants(&entry.word_lower, self.max_delete_distance) {
                stats.deletes += insert.execute(params![
                    delete_hash(&variant),
                    entry.word_lower,
                    entry.frequency_rank,
                    entry.word
                ])?;
            }
        }
        Ok(())
    }

    /// Every word, hidden included, inserted in rank order so frequent words sit near the root
    fn write_bk_tree(&self, conn: &Connection, stats: &mut BuildStats) -> DatabaseResult<()> {
        let mut tree = BkTreeBuilder::default();
        let mut nodes = conn.prepare(
            "INSERT INTO bk_nodes (node_id, word, frequency_rank, hidden) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut edges = conn.prepare(
            "INSERT INTO bk_edges (parent_id, distance, child_id) VALUES (?1, ?2, ?3)",
        )?;

        for entry in &self.entries {
            let Some((node_id, edge)) = tree.insert(&entry.word_lower) else {
                continue;
            };
            nodes.execute(params![node_id, entry.word, entry.frequency_rank, entry.hidden])?;
            stats.bk_nodes += 1;
            if let Some(edge) = edge {
                edges.execute(params![edge.parent_id, edge.distance, edge.child_id])?;
                stats.bk_edges += 1;
            }
        }
        Ok(())
    }

    fn write_distributions(&self, conn: &Connection, stats: &mut BuildStats) -> DatabaseResult<()> {
        let counts = LetterCounts::from_words(self.entries.iter().map(|e| e.word_lower.as_str()));

        let mut kv = conn.prepare("INSERT INTO kv (key, value) VALUES (?1, ?2)")?;
        kv.execute(params!["initial_distribution", to_csv(&counts.initial)])?;
        kv.execute(params!["general_distribution", to_csv(&counts.general)])?;

        let mut bigrams = conn.prepare("INSERT INTO bigram_frequencies (prefix, distribution) VALUES (?1, ?2)")?;
        for (prefix, distribution) in &counts.bigrams {
            bigrams.execute(params![prefix, to_csv(distribution)])?;
            stats.bigram_prefixes += 1;
        }

        let mut trigrams = conn.prepare("INSERT INTO trigram_frequencies (prefix, distribution) VALUES (?1, ?2)")?;
        for (prefix, distribution) in &counts.trigrams {
            trigrams.execute(params![prefix, to_csv(distribution)])?;
            stats.trigram_prefixes += 1;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BK-tree construction
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct BkTreeBuilder {
    /// (word, children keyed by edge distance); node id = index + 1
    nodes: Vec<(String, HashMap<u32, usize>)>,
}

impl BkTreeBuilder {
    /// Returns the new node's id and the edge that attaches it (none for the root).
    /// A word already in the tree is not inserted again.
    fn insert(&mut self, word: &str) -> Option<(i64, Option<BkEdge>)> {
        let new_index = self.nodes.len();
        if self.nodes.is_empty() {
            self.nodes.push((word.to_string(), HashMap::new()));
            return Some((1, None));
        }

        let mut current = 0;
        loop {
            let distance = unbounded_distance(word, &self.nodes[current].0);
            if distance == 0 {
                return None;
            }
            match self.nodes[current].1.get(&distance) {
                Some(&child) => current = child,
                None => {
                    self.nodes[current].1.insert(distance, new_index);
                    self.nodes.push((word.to_string(), HashMap::new()));
                    let edge = BkEdge {
                        parent_id: current as i64 + 1,
                        child_id: new_index as i64 + 1,
                        distance,
                    };
                    return Some((edge.child_id, Some(edge)));
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Letter distributions
// ─────────────────────────────────────────────────────────────────────────────

/// Letter counts over the a–z letters of each word, other characters dropped
struct LetterCounts {
    initial: [u32; 26],
    general: [u32; 26],
    /// Next letter after each single letter
    bigrams: HashMap<String, [u32; 26]>,
    /// Next letter after each letter pair
    trigrams: HashMap<String, [u32; 26]>,
}

impl LetterCounts {
    fn from_words<'a>(words: impl Iterator<Item = &'a str>) -> Self {
        let mut counts = Self {
            initial: [0; 26],
            general: [0; 26],
            bigrams: HashMap::new(),
            trigrams: HashMap::new(),
        };

        for word in words {
            let letters: Vec<u8> = word.bytes().filter(u8::is_ascii_lowercase).collect();
            let Some(&first) = letters.first() else {
                continue;
            };
            counts.initial[letter_index(first)] += 1;

            for (i, &letter) in letters.iter().enumerate() {
                let slot = letter_index(letter);
                counts.general[slot] += 1;
                if i >= 1 {
                    let prefix = (letters[i - 1] as char).to_string();
                    counts.bigrams.entry(prefix).or_insert([0; 26])[slot] += 1;
                }
                if i >= 2 {
                    let prefix: String = letters[i - 2..i].iter().map(|&b| b as char).collect();
                    counts.trigrams.entry(prefix).or_insert([0; 26])[slot] += 1;
                }
            }
        }
        counts
    }
}

fn letter_index(letter: u8) -> usize {
    (letter - b'a') as usize
}

fn to_csv(counts: &[u32; 26]) -> String {
    counts.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",")
}

/// Write `words` (most frequent first) plus `hidden` (ranked after them) to a
/// temp store and open it.
#[cfg(test)]
pub(crate) fn test_store(words: &[&str], hidden: &[&str]) -> (tempfile::TempDir, crate::database::Database) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("dictionary.db");
    DictionaryBuilder::from_ranked_words(words.iter().chain(hidden.iter()))
        .with_hidden(hidden.iter())
        .write(&path)
        .unwrap();
    let db = crate::database::Database::open(&path).unwrap();
    (dir, db)
}
