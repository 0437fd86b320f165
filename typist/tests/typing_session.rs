//! End-to-end typing sessions against a freshly built dictionary store.
//!
//! Each test drives the engine the way the keyboard does: one `update_context`
//! per keystroke, `get_suggestions` on redraw, `correct_typo` at word end.

use tempfile::TempDir;
use typist::builder::DictionaryBuilder;
use typist::{
    ContextUpdate, CorrectorKind, EngineConfig, InputAction, SuggestionEngine, SuggestionEngineApi, TypistError,
};

const RANKED_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "I", "it", "for", "not", "on", "with", "he", "as",
    "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say", "her", "she", "or", "an", "will",
    "my", "one", "all", "would", "there", "their", "what", "so", "up", "out", "if", "about", "who", "get",
    "which", "go", "me", "when", "make", "can", "like", "time", "no", "just", "him", "know", "take", "people",
    "into", "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now", "look",
    "only", "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day", "most", "us",
    "world", "word", "hello", "help", "don't", "Shawn", "USA", "riverside", "keyboard", "damn",
];

const HIDDEN: &[&str] = &["damn"];

fn open_engine(config: EngineConfig) -> (TempDir, SuggestionEngine) {
    tracing_subscriber::fmt::try_init().ok();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("words.db");
    DictionaryBuilder::from_ranked_words(RANKED_WORDS)
        .with_hidden(HIDDEN)
        .write(&db_path)
        .unwrap();
    let engine = SuggestionEngine::with_config(db_path.to_string_lossy().to_string(), config).unwrap();
    (temp_dir, engine)
}

/// Feed `text` one character at a time, as a user typing at the end of the document
fn type_text(engine: &SuggestionEngine, text: &str) -> ContextUpdate {
    let mut typed = String::new();
    let mut last = ContextUpdate::default();
    for c in text.chars() {
        typed.push(c);
        last = engine.update_context(Some(typed.clone()), Some(String::new()), None);
    }
    last
}

fn texts(update: &ContextUpdate) -> Vec<String> {
    update.typeahead.iter().map(|s| s.text.clone()).collect()
}

// ============================================================
// Typeahead
// ============================================================

#[test]
fn typeahead_narrows_as_the_word_grows() {
    let (_temp, engine) = open_engine(EngineConfig::default());

    let update = type_text(&engine, "Hello w");
    assert!(texts(&update).contains(&"would".to_string()));
    assert!(texts(&update).contains(&"world".to_string()));

    let update = type_text(&engine, "Hello wor");
    assert_eq!(texts(&update), vec!["work", "world", "word"]);
}

#[test]
fn typeahead_respects_max_suggestions() {
    let (_temp, engine) = open_engine(EngineConfig {
        max_suggestions: 3,
        ..EngineConfig::default()
    });
    let update = engine.update_context(Some("Say ".into()), None, None);
    assert_eq!(texts(&update), vec!["the", "be", "to"]);
}

#[test]
fn accepting_a_mid_word_suggestion_moves_past_the_suffix() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    let update = engine.update_context(Some("hello wo".into()), Some("ld".into()), None);

    let world = update.typeahead.iter().find(|s| s.text == "world").unwrap();
    assert_eq!(
        world.actions,
        vec![
            InputAction::Insert { text: "r".into() },
            InputAction::MoveCursor { delta: 2 },
            InputAction::Insert { text: " ".into() },
            InputAction::MaybePunctuating { value: true },
        ]
    );
}

#[test]
fn word_after_punctuation_gets_a_leading_space() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    let update = engine.update_context(Some("Done.".into()), None, None);
    assert_eq!(
        update.typeahead[0].actions,
        vec![
            InputAction::Insert { text: " the ".into() },
            InputAction::MaybePunctuating { value: true },
        ]
    );
}

#[test]
fn repeated_reads_do_not_touch_the_store() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    let update = type_text(&engine, "th");
    let queries = engine.interactive_query_count();

    for _ in 0..5 {
        assert_eq!(engine.get_suggestions(), update.typeahead);
    }
    assert_eq!(engine.interactive_query_count(), queries);
}

// ============================================================
// Autocorrect
// ============================================================

#[test]
fn casing_fix_is_offered_without_waiting() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    let update = type_text(&engine, "met shawn");
    assert_eq!(update.autocorrect.as_deref(), Some("Shawn"));
}

#[test]
fn typo_is_corrected_at_word_end_with_either_backend() {
    for corrector in [CorrectorKind::BkTree, CorrectorKind::SymSpell] {
        let (_temp, engine) = open_engine(EngineConfig {
            corrector,
            ..EngineConfig::default()
        });
        type_text(&engine, "the keybaord");
        assert_eq!(
            engine.correct_typo("keybaord".into()).unwrap().as_deref(),
            Some("keyboard"),
            "{corrector:?}"
        );

        type_text(&engine, " Rivresid");
        assert_eq!(
            engine.correct_typo("Rivresid".into()).unwrap(),
            None,
            "{corrector:?}: three edits is beyond the default bound"
        );
    }
}

#[test]
fn background_result_surfaces_on_a_later_update() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    type_text(&engine, "hello wrld");
    // Blocks until the search for "wrld" finished
    assert_eq!(engine.correct_typo("wrld".into()).unwrap().as_deref(), Some("world"));

    // Same key, so the finished result is reused without a new search
    let update = engine.update_context(Some("hello wrld".into()), Some(String::new()), None);
    assert_eq!(update.autocorrect.as_deref(), Some("world"));
}

#[test]
fn words_with_digits_are_left_alone() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    type_text(&engine, "call r2d2");
    assert_eq!(engine.correct_typo("r2d2".into()).unwrap(), None);
}

#[test]
fn hidden_words_are_valid_but_never_offered() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    let update = type_text(&engine, "dam");
    assert!(!texts(&update).contains(&"damn".to_string()));

    type_text(&engine, "damn");
    assert_eq!(engine.correct_typo("damn".into()).unwrap(), None);
}

#[test]
fn cancel_yields_cancelled_or_a_finished_result() {
    let (_temp, engine) = open_engine(EngineConfig::default());
    type_text(&engine, "keybaord");
    engine.cancel();
    match engine.correct_typo("keybaord".into()) {
        Ok(correction) => assert_eq!(correction.as_deref(), Some("keyboard")),
        Err(e) => assert!(matches!(e, TypistError::Cancelled)),
    }
}

// ============================================================
// Letter hints
// ============================================================

#[test]
fn letter_hints_switch_between_start_and_middle_of_word() {
    let (_temp, engine) = open_engine(EngineConfig::default());

    engine.update_context(Some("Hello ".into()), None, None);
    let start = engine.letter_distribution();
    assert_eq!(start.len(), 26);
    // Many ranked words start with 't'
    assert!(start[(b't' - b'a') as usize] > start[(b'z' - b'a') as usize]);

    engine.update_context(Some("Hello q".into()), None, None);
    assert_eq!(engine.letter_distribution().len(), 26);
}
