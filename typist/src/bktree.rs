//! BK-tree typo correction.
//!
//! Walks the stored tree breadth-first from the root, pruning edges with the
//! triangle inequality: a child reached over an edge of distance `e` from a node
//! at distance `dist` can only be within `max` of the query if
//! `|dist - e| <= max`. Edges are followed through hidden nodes; hidden words are
//! just never reported.

use crate::correction::{absorb_lookup_error, Cancelled, CorrectionResult, TypoCorrector};
use crate::database::DictionaryConnection;
use crate::distance::unbounded_distance;
use crate::models::Candidate;
use std::collections::{HashSet, VecDeque};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub const ROOT_NODE_ID: i64 = 1;

#[derive(Debug, Default, Clone, Copy)]
pub struct BkTreeCorrector;

impl BkTreeCorrector {
    pub fn new() -> Self {
        Self
    }

    /// Every visible word within `max_distance` of `word`, in traversal order.
    pub fn suggest_corrections(
        &self,
        conn: &DictionaryConnection,
        word: &str,
        max_distance: u32,
        token: &CancellationToken,
    ) -> CorrectionResult<Vec<Candidate>> {
        let start = Instant::now();
        let mut candidates = Vec::new();
        let mut visited: HashSet<i64> = HashSet::from([ROOT_NODE_ID]);
        let mut queue: VecDeque<i64> = VecDeque::from([ROOT_NODE_ID]);

        while let Some(node_id) = queue.pop_front() {
            if token.is_cancelled() {
                return Err(Cancelled);
            }

            let node = match conn.bk_node(node_id) {
                Ok(Some(node)) => node,
                Ok(None) => continue,
                Err(e) => {
                    absorb_lookup_error::<()>(e, token, "bk_node")?;
                    continue;
                }
            };

            // Unbounded: a far node near the root can still lead to close descendants
            let dist = unbounded_distance(word, &node.word.to_lowercase());
            if dist <= max_distance && !node.hidden {
                candidates.push(Candidate {
                    word: node.word,
                    distance: dist,
                    frequency_rank: node.frequency_rank,
                });
            }

            let children = match conn.bk_children(
                node_id,
                dist.saturating_sub(max_distance),
                dist.saturating_add(max_distance),
            ) {
                Ok(children) => children,
                Err(e) => absorb_lookup_error(e, token, "bk_children")?,
            };

            for child in children {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        tracing::debug!(
            "bktree '{}' -> {} candidates in {:.3}ms ({} nodes)",
            word,
            candidates.len(),
            start.elapsed().as_secs_f64() * 1000.0,
            visited.len()
        );
        Ok(candidates)
    }
}

impl TypoCorrector for BkTreeCorrector {
    fn candidates(
        &self,
        conn: &DictionaryConnection,
        word: &str,
        max_distance: u32,
        token: &CancellationToken,
    ) -> CorrectionResult<Vec<Candidate>> {
        self.suggest_corrections(conn, word, max_distance, token)
    }
}
