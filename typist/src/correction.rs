//! Contract shared by the two typo-correction backends.
//!
//! Both backends run on the background worker's connection and check the same
//! cancellation token. A cancelled search is a distinct outcome from one that
//! completed with zero candidates.

use crate::database::{DatabaseError, DictionaryConnection};
use crate::models::Candidate;
use tokio_util::sync::CancellationToken;

/// The search was aborted before it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

pub type CorrectionResult<T> = Result<T, Cancelled>;

/// A typo-correction backend the background worker can dispatch to.
pub trait TypoCorrector: Send + Sync {
    /// Candidates within `max_distance` of `word` (already lowercased).
    /// `Err(Cancelled)` if `token` fired or the connection was interrupted.
    fn candidates(
        &self,
        conn: &DictionaryConnection,
        word: &str,
        max_distance: u32,
        token: &CancellationToken,
    ) -> CorrectionResult<Vec<Candidate>>;
}

/// Closest candidate, ties broken by frequency rank (lower wins).
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by_key(|c| c.rank_key())
}

/// Map a failed lookup onto the correction outcome.
///
/// An interrupt (or a token that fired meanwhile) is a cancellation; anything
/// else is logged and treated as an empty result for that lookup.
pub(crate) fn absorb_lookup_error<T: Default>(
    error: DatabaseError,
    token: &CancellationToken,
    lookup: &'static str,
) -> CorrectionResult<T> {
    if error.is_interrupted() || token.is_cancelled() {
        return Err(Cancelled);
    }
    tracing::warn!(lookup, error = %error, "dictionary lookup failed; treating as empty");
    Ok(T::default())
}
