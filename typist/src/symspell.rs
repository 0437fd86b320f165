//! SymSpell typo correction against the precomputed delete-variant index.
//!
//! The store maps the hash of every delete-variant of every visible word to the
//! word. A query generates its own delete-variants one distance level at a time,
//! looks all their hashes up in one batch, and verifies the hits with the real
//! edit distance.

use crate::correction::{absorb_lookup_error, Cancelled, CorrectionResult, TypoCorrector};
use crate::database::DictionaryConnection;
use crate::distance::bounded_distance;
use crate::models::Candidate;
use std::collections::HashSet;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Keeps delete hashes non-negative so they fit SQLite's signed INTEGER
const HASH_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

/// Polynomial hash over Unicode scalar values, kept within 63 bits.
/// Must match what the dictionary writer stores.
pub fn delete_hash(s: &str) -> i64 {
    let mut h: u64 = 0;
    for c in s.chars() {
        h = h.wrapping_mul(31).wrapping_add(u64::from(c)) & HASH_MASK;
    }
    h as i64
}

/// Every string reachable from `word` by deleting up to `max_deletes` characters,
/// including `word` itself. Single-character strings are not deleted further.
///
/// Generated level by level: a variant first seen at `k` deletions is expanded
/// once, at level `k`.
pub fn delete_variants(word: &str, max_deletes: usize) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(word.to_string());

    let mut frontier: Vec<Vec<char>> = vec![word.chars().collect()];
    for _ in 0..max_deletes {
        let mut next = Vec::new();
        for chars in &frontier {
            if chars.len() <= 1 {
                continue;
            }
            for skip in 0..chars.len() {
                let variant: String = chars
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, c)| *c)
                    .collect();
                if seen.insert(variant.clone()) {
                    next.push(variant.chars().collect());
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    seen
}

/// Sorted, deduplicated hashes of every variant within `max_deletes`
fn variant_hashes(word: &str, max_deletes: usize) -> Vec<i64> {
    let mut hashes: Vec<i64> = delete_variants(word, max_deletes)
        .iter()
        .map(|v| delete_hash(v))
        .collect();
    hashes.sort_unstable();
    hashes.dedup();
    hashes
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SymSpellCorrector;

impl SymSpellCorrector {
    pub fn new() -> Self {
        Self
    }

    /// The most frequent word at the smallest distance in `1..=max_distance`.
    ///
    /// Exact matches (distance 0) are the caller's business and never returned.
    pub fn find_best_correction(
        &self,
        conn: &DictionaryConnection,
        word: &str,
        max_distance: u32,
        token: &CancellationToken,
    ) -> CorrectionResult<Option<Candidate>> {
        let start = Instant::now();

        for d in 1..=max_distance {
            if token.is_cancelled() {
                return Err(Cancelled);
            }

            let hashes = variant_hashes(word, d as usize);
            let rows = match conn.symspell_candidates(&hashes) {
                Ok(rows) => rows,
                Err(e) => absorb_lookup_error(e, token, "symspell_candidates")?,
            };

            // Rows arrive most frequent first, so the first exact-distance hit wins
            let hit = rows.into_iter().find(|(candidate, _)| {
                bounded_distance(word, &candidate.to_lowercase(), d) == Some(d)
            });

            if let Some((candidate, frequency_rank)) = hit {
                tracing::debug!(
                    "symspell '{}' -> '{}' at distance {} in {:.3}ms",
                    word,
                    candidate,
                    d,
                    start.elapsed().as_secs_f64() * 1000.0
                );
                return Ok(Some(Candidate {
                    word: candidate,
                    distance: d,
                    frequency_rank,
                }));
            }
        }

        tracing::debug!(
            "symspell '{}' -> no candidate in {:.3}ms",
            word,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(None)
    }
}

impl TypoCorrector for SymSpellCorrector {
    fn candidates(
        &self,
        conn: &DictionaryConnection,
        word: &str,
        max_distance: u32,
        token: &CancellationToken,
    ) -> CorrectionResult<Vec<Candidate>> {
        Ok(self
            .find_best_correction(conn, word, max_distance, token)?
            .into_iter()
            .collect())
    }
}
