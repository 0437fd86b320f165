//! Typist - Rust suggestion engine for the keyboard extension
//!
//! Typeahead completion, exact-match casing fixes and background typo correction
//! (SymSpell or BK-tree) over a precomputed, read-only SQLite dictionary.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub mod bktree;
pub mod builder;
pub mod casing;
pub mod completion;
pub mod context;
pub mod coordinator;
pub mod correction;
pub mod database;
pub mod distance;
mod engine;
pub mod frequency;
pub mod interface;
pub mod models;
pub mod suggestion;
pub mod symspell;

pub use engine::SuggestionEngine;
pub use interface::*;

uniffi::setup_scaffolding!("typist");
