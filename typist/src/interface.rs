//! Typist FFI Interface Definition
//!
//! This file defines the public interface exposed to the keyboard extension via UniFFI.
//! It acts as the source of truth for shared types.

use serde::Deserialize;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// One step the host applies to the text document to accept a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum InputAction {
    Insert { text: String },
    /// Positive = forward, negative = backward (in characters)
    MoveCursor { delta: i32 },
    /// The inserted text ends a word, so a following punctuation key may
    /// want to swallow the trailing space.
    MaybePunctuating { value: bool },
}

/// Which correction backend the background worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum CorrectorKind {
    /// Exact-distance lookup against the precomputed delete-variant index
    SymSpell,
    /// Pruned traversal of the precomputed BK-tree
    #[default]
    BkTree,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A typeahead suggestion: display text plus the edits that produce it
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Suggestion {
    pub text: String,
    pub actions: Vec<InputAction>,
}

/// Result of a context update
#[derive(Debug, Clone, PartialEq, Eq, Default, uniffi::Record)]
pub struct ContextUpdate {
    pub typeahead: Vec<Suggestion>,
    /// Replacement proposed for the word under the cursor, if any
    pub autocorrect: Option<String>,
}

/// Engine tuning. Missing fields in a JSON config fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on typeahead completions per context
    pub max_suggestions: u32,
    /// Largest edit distance a typo correction may span
    pub max_typo_distance: u32,
    pub autocorrect_enabled: bool,
    pub corrector: CorrectorKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 20,
            max_typo_distance: 2,
            autocorrect_enabled: true,
            corrector: CorrectorKind::default(),
        }
    }
}

/// Error type for Typist operations
#[derive(Debug, Error, uniffi::Error)]
pub enum TypistError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Operation cancelled")]
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The primary interface the keyboard extension drives on every text change.
/// This matches the functionality exposed by the `SuggestionEngine` object.
#[uniffi::export(with_foreign)]
pub trait SuggestionEngineApi: Send + Sync {
    /// Record the text around the cursor. Returns fresh typeahead suggestions and,
    /// when one is ready without waiting, an autocorrect candidate.
    fn update_context(
        &self,
        before: Option<String>,
        after: Option<String>,
        selected: Option<String>,
    ) -> ContextUpdate;

    /// Typeahead suggestions for the current context. Memoized until the next update.
    fn get_suggestions(&self) -> Vec<Suggestion>;

    /// Correction for a finished word. May block on the in-flight background search.
    /// `Ok(None)` means no correction, `Err(Cancelled)` means the search was aborted.
    fn correct_typo(&self, word: String) -> Result<Option<String>, TypistError>;

    /// Abort any in-flight background search.
    fn cancel(&self);

    /// Next-letter frequency counts (a–z) for the current context; empty if unavailable.
    fn letter_distribution(&self) -> Vec<u32>;
}

impl From<crate::database::DatabaseError> for TypistError {
    fn from(e: crate::database::DatabaseError) -> Self {
        TypistError::DatabaseError(e.to_string())
    }
}
