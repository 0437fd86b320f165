//! Next-letter frequency hints
//!
//! The store carries letter counts for a word's first letter, for letters in
//! general, and for the letter following each one- and two-letter sequence.
//! The keyboard uses them to size touch targets.

use crate::database::{DatabaseResult, DictionaryConnection, NgramTable};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;

const INITIAL_DISTRIBUTION_KEY: &str = "initial_distribution";
const GENERAL_DISTRIBUTION_KEY: &str = "general_distribution";

/// Counts for the letters a–z
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterDistribution([u32; 26]);

impl CharacterDistribution {
    pub fn new(counts: [u32; 26]) -> Self {
        Self(counts)
    }

    /// Parse a comma-separated list of exactly 26 non-negative integers
    pub fn parse(value: &str) -> Option<Self> {
        let mut counts = [0u32; 26];
        let mut fields = value.split(',');
        for slot in counts.iter_mut() {
            *slot = fields.next()?.trim().parse().ok()?;
        }
        if fields.next().is_some() {
            return None;
        }
        Some(Self(counts))
    }

    /// Count for `letter` (either case); `None` outside a–z
    pub fn frequency(&self, letter: char) -> Option<u32> {
        let letter = letter.to_ascii_lowercase();
        letter
            .is_ascii_lowercase()
            .then(|| self.0[(letter as u8 - b'a') as usize])
    }

    /// Share of `a` among `a` and `b`. 0.5 when either is not a letter or both are unseen.
    pub fn frequency_ratio(&self, a: char, b: char) -> f64 {
        let (Some(fa), Some(fb)) = (self.frequency(a), self.frequency(b)) else {
            return 0.5;
        };
        let total = u64::from(fa) + u64::from(fb);
        if total == 0 {
            return 0.5;
        }
        f64::from(fa) / total as f64
    }

    pub fn counts(&self) -> [u32; 26] {
        self.0
    }
}

/// Lazily loaded distributions for one engine.
///
/// Each distribution is read from the store at most once; a lookup that fails
/// is retried next time, a value that fails to parse is remembered as absent.
#[derive(Default)]
pub struct LetterDistributionService {
    initial: OnceLock<Option<CharacterDistribution>>,
    general: OnceLock<Option<CharacterDistribution>>,
    ngrams: RwLock<HashMap<(NgramTable, String), Option<CharacterDistribution>>>,
}

impl LetterDistributionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distribution of the letter likely to follow `prefix`.
    ///
    /// Start of word (empty prefix, or one not ending in a letter) uses the
    /// initial-letter counts. Otherwise the most specific table that has an
    /// entry wins: last two letters, last letter, then letters in general.
    pub fn next_letter_distribution(
        &self,
        conn: &DictionaryConnection,
        prefix: &str,
    ) -> Option<CharacterDistribution> {
        match prefix.chars().last() {
            Some(c) if c.is_alphabetic() => {}
            _ => return self.initial(conn),
        }

        let tail: Vec<char> = prefix
            .chars()
            .rev()
            .take(2)
            .map(|c| c.to_ascii_lowercase())
            .take_while(char::is_ascii_lowercase)
            .collect();

        if tail.len() == 2 {
            let key: String = [tail[1], tail[0]].iter().collect();
            if let Some(d) = self.ngram(conn, NgramTable::Trigram, &key) {
                return Some(d);
            }
        }
        if let Some(&last) = tail.first() {
            if let Some(d) = self.ngram(conn, NgramTable::Bigram, &last.to_string()) {
                return Some(d);
            }
        }
        self.general(conn)
    }

    pub fn initial(&self, conn: &DictionaryConnection) -> Option<CharacterDistribution> {
        Self::load_once(&self.initial, || conn.kv_value(INITIAL_DISTRIBUTION_KEY), INITIAL_DISTRIBUTION_KEY)
    }

    pub fn general(&self, conn: &DictionaryConnection) -> Option<CharacterDistribution> {
        Self::load_once(&self.general, || conn.kv_value(GENERAL_DISTRIBUTION_KEY), GENERAL_DISTRIBUTION_KEY)
    }

    fn ngram(&self, conn: &DictionaryConnection, table: NgramTable, prefix: &str) -> Option<CharacterDistribution> {
        let cache_key = (table, prefix.to_string());
        if let Some(cached) = self.ngrams.read().get(&cache_key) {
            return *cached;
        }

        match conn.ngram_distribution(table, prefix) {
            Ok(value) => {
                let parsed = value.as_deref().and_then(|v| parse_logged(v, prefix));
                self.ngrams.write().insert(cache_key, parsed);
                parsed
            }
            Err(e) => {
                tracing::warn!(prefix, error = %e, "n-gram distribution lookup failed");
                None
            }
        }
    }

    fn load_once(
        cell: &OnceLock<Option<CharacterDistribution>>,
        fetch: impl FnOnce() -> DatabaseResult<Option<String>>,
        key: &str,
    ) -> Option<CharacterDistribution> {
        if let Some(cached) = cell.get() {
            return *cached;
        }
        match fetch() {
            Ok(value) => *cell.get_or_init(|| value.as_deref().and_then(|v| parse_logged(v, key))),
            Err(e) => {
                tracing::warn!(key, error = %e, "distribution lookup failed");
                None
            }
        }
    }
}

fn parse_logged(value: &str, key: &str) -> Option<CharacterDistribution> {
    let parsed = CharacterDistribution::parse(value);
    if parsed.is_none() {
        tracing::warn!(key, "discarding malformed letter distribution");
    }
    parsed
}
