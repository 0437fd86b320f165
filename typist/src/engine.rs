//! SuggestionEngine - Main API for the keyboard extension
//!
//! Turns the text around the cursor into typeahead suggestions and autocorrect
//! candidates.
//!
//! Concurrency Model:
//! - The interactive thread owns one store connection and never waits on a search
//!   except in `correct_typo`
//! - Typo correction runs on a dedicated background worker with its own connection
//!   (see `coordinator`), restarted whenever the word being typed changes
//! - Lock order: engine state, then the interactive connection

use crate::bktree::BkTreeCorrector;
use crate::casing::reconcile_capitalization;
use crate::completion::CompletionEngine;
use crate::context::{is_correctable, SearchContext};
use crate::coordinator::{SearchCoordinator, SearchOutcome};
use crate::correction::{best_candidate, TypoCorrector};
use crate::database::{Database, DictionaryConnection};
use crate::frequency::LetterDistributionService;
use crate::interface::{
    ContextUpdate, CorrectorKind, EngineConfig, Suggestion, SuggestionEngineApi, TypistError,
};
use crate::suggestion::make_suggestion;
use crate::symspell::SymSpellCorrector;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Text around the cursor as last reported by the host
#[derive(Default)]
struct EngineState {
    before: Option<String>,
    after: Option<String>,
    selected: Option<String>,
    context: SearchContext,
    /// None until computed for the current context
    suggestions: Option<Vec<Suggestion>>,
}

/// Thread-safe suggestion engine over a read-only dictionary store
#[derive(uniffi::Object)]
pub struct SuggestionEngine {
    config: EngineConfig,
    conn: Mutex<DictionaryConnection>,
    completions: CompletionEngine,
    letters: LetterDistributionService,
    state: Mutex<EngineState>,
    coordinator: SearchCoordinator,
}

// Internal implementation (not exported via FFI)
impl SuggestionEngine {
    fn open(db_path: &str, config: EngineConfig) -> Result<Self, TypistError> {
        let db = Database::open(db_path)?;
        let interactive = db.connection()?;
        let background = db.connection()?;

        let corrector: Arc<dyn TypoCorrector> = match config.corrector {
            CorrectorKind::SymSpell => Arc::new(SymSpellCorrector::new()),
            CorrectorKind::BkTree => Arc::new(BkTreeCorrector::new()),
        };
        let coordinator = SearchCoordinator::start(background, corrector, config.max_typo_distance)?;

        tracing::info!(
            corrector = ?config.corrector,
            max_typo_distance = config.max_typo_distance,
            "suggestion engine ready"
        );

        Ok(Self {
            completions: CompletionEngine::new(config.max_suggestions as usize),
            letters: LetterDistributionService::new(),
            conn: Mutex::new(interactive),
            state: Mutex::new(EngineState::default()),
            coordinator,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Queries issued so far on the interactive connection
    pub fn interactive_query_count(&self) -> u64 {
        self.conn.lock().query_count()
    }

    fn make_suggestions(&self, state: &EngineState, conn: &DictionaryConnection) -> Vec<Suggestion> {
        let ctx = &state.context;
        let start = Instant::now();
        let words = self.completions.completions(
            conn,
            &ctx.prefix.to_lowercase(),
            &ctx.suffix.to_lowercase(),
        );
        tracing::debug!(
            "typeahead '{}|{}' -> {} completions in {:.3}ms",
            ctx.prefix,
            ctx.suffix,
            words.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        words
            .into_iter()
            .map(|word| {
                let display = reconcile_capitalization(&word, &ctx.prefix, &ctx.suffix);
                make_suggestion(display, ctx, state.before.as_deref(), state.after.as_deref())
            })
            .collect()
    }

    /// Autocorrect available right now: a casing fix for a known word, or a
    /// background correction that has already finished. Never waits.
    fn ready_autocorrect(&self, state: &EngineState, conn: &DictionaryConnection) -> Option<String> {
        if state.selected.as_deref().is_some_and(|s| !s.is_empty()) {
            return None;
        }

        let ctx = &state.context;
        let typed = ctx.typed_word();
        if typed.is_empty() {
            return None;
        }

        if let Some(canonical) = self.completions.canonical_form(conn, &typed) {
            let reconciled = reconcile_capitalization(&canonical, &ctx.prefix, &ctx.suffix);
            return (reconciled != typed).then_some(reconciled);
        }

        // The background search corrects the prefix, so it only stands in for a
        // word that ends at the cursor
        if !self.config.autocorrect_enabled || !ctx.suffix.is_empty() || !is_correctable(&ctx.prefix) {
            return None;
        }
        let candidates = self.coordinator.peek(&ctx.search_key())?;
        let best = best_candidate(&candidates)?;
        let reconciled = reconcile_capitalization(&best.word, &ctx.prefix, "");
        (reconciled != typed).then_some(reconciled)
    }
}

// FFI-exported constructors (must be in standalone impl block)
#[uniffi::export]
impl SuggestionEngine {
    /// Open the dictionary store at `db_path` with default settings
    #[uniffi::constructor]
    pub fn new(db_path: String) -> Result<Self, TypistError> {
        Self::open(&db_path, EngineConfig::default())
    }

    #[uniffi::constructor]
    pub fn with_config(db_path: String, config: EngineConfig) -> Result<Self, TypistError> {
        Self::open(&db_path, config)
    }
}

#[uniffi::export]
impl SuggestionEngineApi for SuggestionEngine {
    fn update_context(
        &self,
        before: Option<String>,
        after: Option<String>,
        selected: Option<String>,
    ) -> ContextUpdate {
        let mut state = self.state.lock();
        state.context = SearchContext::extract(before.as_deref(), after.as_deref());
        state.before = before;
        state.after = after;
        state.selected = selected;
        state.suggestions = None;

        if self.config.autocorrect_enabled {
            self.coordinator.request(&state.context.search_key());
        }

        let conn = self.conn.lock();
        let typeahead = self.make_suggestions(&state, &conn);
        let autocorrect = self.ready_autocorrect(&state, &conn);
        state.suggestions = Some(typeahead.clone());

        ContextUpdate { typeahead, autocorrect }
    }

    fn get_suggestions(&self) -> Vec<Suggestion> {
        let mut state = self.state.lock();
        if let Some(cached) = &state.suggestions {
            return cached.clone();
        }
        let suggestions = {
            let conn = self.conn.lock();
            self.make_suggestions(&state, &conn)
        };
        state.suggestions = Some(suggestions.clone());
        suggestions
    }

    fn correct_typo(&self, word: String) -> Result<Option<String>, TypistError> {
        let word = word.trim();
        if !is_correctable(word) {
            return Ok(None);
        }

        let canonical = {
            let conn = self.conn.lock();
            self.completions.canonical_form(&conn, word)
        };
        if let Some(canonical) = canonical {
            let reconciled = reconcile_capitalization(&canonical, word, "");
            return Ok((reconciled != word).then_some(reconciled));
        }

        if !self.config.autocorrect_enabled {
            return Ok(None);
        }

        // No locks held here: the worker may need the coordinator to publish
        match self.coordinator.await_result(&word.to_lowercase()) {
            SearchOutcome::Completed(candidates) => Ok(best_candidate(&candidates)
                .map(|best| reconcile_capitalization(&best.word, word, ""))),
            SearchOutcome::Cancelled => Err(TypistError::Cancelled),
            // Only the word the user is currently typing is searched
            SearchOutcome::NotRequested => Ok(None),
        }
    }

    fn cancel(&self) {
        self.coordinator.cancel();
    }

    fn letter_distribution(&self) -> Vec<u32> {
        let state = self.state.lock();
        let conn = self.conn.lock();
        self.letters
            .next_letter_distribution(&conn, &state.context.prefix)
            .map(|d| d.counts().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DictionaryBuilder;
    use crate::interface::InputAction;
    use tempfile::TempDir;

    const WORDS: &[&str] = &[
        "the", "of", "and", "to", "world", "would", "word", "work", "hello", "help", "Shawn", "USA", "cat",
        "riverside",
    ];

    fn engine_with(config: EngineConfig) -> (TempDir, SuggestionEngine) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dictionary.db");
        DictionaryBuilder::from_ranked_words(WORDS.iter().chain(["damn"].iter()))
            .with_hidden(["damn"])
            .write(&path)
            .unwrap();
        let engine = SuggestionEngine::with_config(path.to_string_lossy().into_owned(), config).unwrap();
        (dir, engine)
    }

    fn engine() -> (TempDir, SuggestionEngine) {
        engine_with(EngineConfig::default())
    }

    fn update(engine: &SuggestionEngine, before: &str, after: &str) -> ContextUpdate {
        engine.update_context(Some(before.to_string()), Some(after.to_string()), None)
    }

    fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.text.as_str()).collect()
    }

    // ── construction ─────────────────────────────────────────────

    #[test]
    fn test_missing_store_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.db").to_string_lossy().into_owned();
        assert!(matches!(SuggestionEngine::new(path), Err(TypistError::DatabaseError(_))));
    }

    // ── typeahead ────────────────────────────────────────────────

    #[test]
    fn test_typeahead_for_prefix() {
        let (_dir, engine) = engine();
        let update = update(&engine, "Hello wor", "");
        assert_eq!(texts(&update.typeahead), vec!["world", "word", "work"]);
        assert_eq!(
            update.typeahead[0].actions,
            vec![
                InputAction::Insert { text: "ld ".into() },
                InputAction::MaybePunctuating { value: true }
            ]
        );
    }

    #[test]
    fn test_typeahead_applies_user_capitalization() {
        let (_dir, engine) = engine();
        let update = update(&engine, "Wor", "");
        assert_eq!(texts(&update.typeahead), vec!["World", "Word", "Work"]);
        let update = self::update(&engine, "SH", "");
        assert_eq!(texts(&update.typeahead), vec!["SHAWN"]);
        let update = self::update(&engine, "sh", "");
        assert_eq!(texts(&update.typeahead), vec!["Shawn"]);
    }

    #[test]
    fn test_typeahead_mid_word() {
        let (_dir, engine) = engine();
        let update = update(&engine, "Hello wo", "ld");
        assert_eq!(texts(&update.typeahead), vec!["world", "would"]);
    }

    #[test]
    fn test_empty_context_offers_common_words() {
        let (_dir, engine) = engine();
        let update = update(&engine, "Hi ", "");
        assert_eq!(&texts(&update.typeahead)[..3], &["the", "of", "and"]);
        assert_eq!(update.autocorrect, None);
    }

    #[test]
    fn test_hidden_words_never_suggested() {
        let (_dir, engine) = engine();
        let update = update(&engine, "dam", "");
        assert!(update.typeahead.is_empty());
    }

    #[test]
    fn test_get_suggestions_is_memoized() {
        let (_dir, engine) = engine();
        let update = update(&engine, "he", "");
        let queries = engine.interactive_query_count();

        let first = engine.get_suggestions();
        let second = engine.get_suggestions();
        assert_eq!(first, update.typeahead);
        assert_eq!(first, second);
        assert_eq!(engine.interactive_query_count(), queries);
    }

    // ── autocorrect ──────────────────────────────────────────────

    #[test]
    fn test_known_word_with_dictionary_casing() {
        let (_dir, engine) = engine();
        assert_eq!(update(&engine, "hi shawn", "").autocorrect.as_deref(), Some("Shawn"));
        assert_eq!(update(&engine, "the usa", "").autocorrect.as_deref(), Some("USA"));
        assert_eq!(update(&engine, "hello", "").autocorrect, None);
    }

    #[test]
    fn test_no_autocorrect_with_selection() {
        let (_dir, engine) = engine();
        let update = engine.update_context(Some("hi shawn".into()), None, Some("shawn".into()));
        assert_eq!(update.autocorrect, None);
    }

    #[test]
    fn test_correct_typo_waits_for_background_search() {
        let (_dir, engine) = engine();
        update(&engine, "I love the wrld", "");
        assert_eq!(engine.correct_typo("wrld".into()).unwrap().as_deref(), Some("world"));
    }

    #[test]
    fn test_correct_typo_keeps_user_capitalization() {
        let (_dir, engine) = engine();
        update(&engine, "Riversde", "");
        assert_eq!(engine.correct_typo("Riversde".into()).unwrap().as_deref(), Some("Riverside"));
    }

    #[test]
    fn test_correct_typo_with_symspell() {
        let (_dir, engine) = engine_with(EngineConfig {
            corrector: CorrectorKind::SymSpell,
            ..EngineConfig::default()
        });
        update(&engine, "helo", "");
        assert_eq!(engine.correct_typo("helo".into()).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_correct_typo_fast_paths() {
        let (_dir, engine) = engine();
        assert_eq!(engine.correct_typo("shawn".into()).unwrap().as_deref(), Some("Shawn"));
        assert_eq!(engine.correct_typo("the".into()).unwrap(), None);
        assert_eq!(engine.correct_typo("damn".into()).unwrap(), None);
        assert_eq!(engine.correct_typo("h3llo".into()).unwrap(), None);
        assert_eq!(engine.correct_typo("   ".into()).unwrap(), None);
    }

    #[test]
    fn test_correct_typo_only_for_current_word() {
        let (_dir, engine) = engine();
        update(&engine, "wrld", "");
        assert_eq!(engine.correct_typo("helo".into()).unwrap(), None);
    }

    #[test]
    fn test_autocorrect_disabled() {
        let (_dir, engine) = engine_with(EngineConfig {
            autocorrect_enabled: false,
            ..EngineConfig::default()
        });
        update(&engine, "wrld", "");
        assert_eq!(engine.correct_typo("wrld".into()).unwrap(), None);
        // Casing fixes are not corrections
        assert_eq!(engine.correct_typo("usa".into()).unwrap().as_deref(), Some("USA"));
    }

    #[test]
    fn test_cancelled_search_is_reported() {
        let (_dir, engine) = engine();
        update(&engine, "wrld", "");
        engine.cancel();
        match engine.correct_typo("wrld".into()) {
            // The search may have finished before the cancel landed
            Ok(result) => assert_eq!(result.as_deref(), Some("world")),
            Err(e) => assert!(matches!(e, TypistError::Cancelled)),
        }
    }

    // ── letter hints ─────────────────────────────────────────────

    #[test]
    fn test_letter_distribution_follows_context() {
        let (_dir, engine) = engine();
        update(&engine, "Hi ", "");
        let initial = engine.letter_distribution();
        assert_eq!(initial.len(), 26);

        update(&engine, "wo", "");
        let after_wo = engine.letter_distribution();
        assert_eq!(after_wo.len(), 26);
        // "world", "would", "word", "work": 'r' follows "wo" three times
        assert_eq!(after_wo[(b'r' - b'a') as usize], 3);
        assert_ne!(initial, after_wo);
    }
}
