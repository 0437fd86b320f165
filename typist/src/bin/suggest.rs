//! Probe a dictionary store the way the keyboard does.
//!
//! Usage:
//!     cargo run --bin suggest -- --db words.db --before "Hello wor" --after "ld!"
//!     cargo run --bin suggest -- --db words.db --before "I love the wrld" --correct wrld
//!
//! An optional JSON config overrides engine defaults, e.g.
//! `{"corrector": "sym_spell", "max_suggestions": 5}`.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use typist::{EngineConfig, SuggestionEngine, SuggestionEngineApi};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the dictionary store
    #[arg(long)]
    db: String,

    /// JSON file with engine settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text before the cursor
    #[arg(long, default_value = "")]
    before: String,

    /// Text after the cursor
    #[arg(long, default_value = "")]
    after: String,

    /// Selected text
    #[arg(long)]
    selected: Option<String>,

    /// Finished word to run through typo correction
    #[arg(long)]
    correct: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text).context("Invalid engine config")?
        }
        None => EngineConfig::default(),
    };

    let engine = SuggestionEngine::with_config(args.db.clone(), config)?;

    let start = Instant::now();
    let update = engine.update_context(Some(args.before), Some(args.after), args.selected);
    println!(
        "{} suggestions in {:.3}ms",
        update.typeahead.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    for suggestion in &update.typeahead {
        println!("  {:<20} {:?}", suggestion.text, suggestion.actions);
    }
    match &update.autocorrect {
        Some(word) => println!("autocorrect: {}", word),
        None => println!("autocorrect: -"),
    }

    let counts = engine.letter_distribution();
    if !counts.is_empty() {
        let mut letters: Vec<(char, u32)> = ('a'..='z').zip(counts).collect();
        letters.sort_by(|a, b| b.1.cmp(&a.1));
        let top: Vec<String> = letters.iter().take(5).map(|(c, n)| format!("{}={}", c, n)).collect();
        println!("next letters: {}", top.join(" "));
    }

    if let Some(word) = args.correct {
        let start = Instant::now();
        let correction = engine.correct_typo(word.clone())?;
        println!(
            "correct '{}' -> {} in {:.3}ms",
            word,
            correction.as_deref().unwrap_or("-"),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
