//! Typeahead completions for the word around the cursor.

use crate::database::{DatabaseResult, DictionaryConnection};
use std::sync::OnceLock;

/// Completion lookups over the interactive connection.
///
/// The empty-context result (the most frequent words) is asked for at every
/// word boundary, so it is fetched once per engine and kept.
pub struct CompletionEngine {
    max_results: usize,
    common_words: OnceLock<Vec<String>>,
}

impl CompletionEngine {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            common_words: OnceLock::new(),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Visible words matching the typed `prefix` and `suffix` (both lowercase),
    /// most frequent first.
    pub fn completions(&self, conn: &DictionaryConnection, prefix: &str, suffix: &str) -> Vec<String> {
        let result = match (prefix.is_empty(), suffix.is_empty()) {
            (false, false) => {
                let min_len = prefix.chars().count() + suffix.chars().count();
                conn.words_with_prefix_and_suffix(prefix, &reversed(suffix), min_len, self.max_results)
            }
            (false, true) => conn.words_with_prefix(prefix, self.max_results),
            (true, false) => conn.words_with_suffix(&reversed(suffix), self.max_results),
            (true, true) => self.common_words(conn),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(prefix, suffix, error = %e, "completion lookup failed");
            Vec::new()
        })
    }

    /// The dictionary's spelling of `word` if it is a known word (hidden words included)
    pub fn canonical_form(&self, conn: &DictionaryConnection, word: &str) -> Option<String> {
        conn.canonical_form(&word.to_lowercase()).unwrap_or_else(|e| {
            tracing::warn!(word, error = %e, "canonical form lookup failed");
            None
        })
    }

    fn common_words(&self, conn: &DictionaryConnection) -> DatabaseResult<Vec<String>> {
        if let Some(words) = self.common_words.get() {
            return Ok(words.clone());
        }
        // Only a successful lookup is remembered
        let words = conn.most_frequent_words(self.max_results)?;
        Ok(self.common_words.get_or_init(|| words).clone())
    }
}

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}
