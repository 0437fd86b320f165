//! Build a dictionary store from a frequency-ranked word list.
//!
//! Usage:
//!     cargo run --release --bin build-dictionary -- words.txt --hidden hidden_words.txt -o words.db
//!
//! The word list has one word per line, most frequent first, spelled the way it
//! should be suggested ("Shawn", "USA", "the"). Hidden words must also appear in
//! the word list; they stay valid for exact-match lookups but are never suggested.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use typist::builder::{DictionaryBuilder, DEFAULT_MAX_DELETE_DISTANCE};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ranked word list, one word per line
    words: PathBuf,

    /// Words that are valid but never suggested, one per line
    #[arg(long)]
    hidden: Option<PathBuf>,

    /// Path to write the SQLite store to
    #[arg(short, long, default_value = "words.db")]
    output: PathBuf,

    /// Deletion depth of the SymSpell index
    #[arg(long, default_value_t = DEFAULT_MAX_DELETE_DISTANCE)]
    max_deletes: usize,

    /// Replace an existing store at the output path
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let words = fs::read_to_string(&args.words)
        .with_context(|| format!("Failed to read word list {}", args.words.display()))?;
    let hidden = match &args.hidden {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read hidden words {}", path.display()))?,
        None => String::new(),
    };

    if args.output.exists() {
        if !args.force {
            bail!("{} already exists (pass --force to replace it)", args.output.display());
        }
        fs::remove_file(&args.output)
            .with_context(|| format!("Failed to remove {}", args.output.display()))?;
    }

    let stats = DictionaryBuilder::from_ranked_words(words.lines())
        .with_hidden(hidden.lines())
        .max_delete_distance(args.max_deletes)
        .write(&args.output)
        .context("Failed to write dictionary store")?;

    println!("Wrote {}", args.output.display());
    println!("  words:            {} ({} hidden)", stats.words, stats.hidden);
    println!("  symspell deletes: {}", stats.deletes);
    println!("  bk-tree:          {} nodes, {} edges", stats.bk_nodes, stats.bk_edges);
    println!(
        "  n-gram prefixes:  {} bigram, {} trigram",
        stats.bigram_prefixes, stats.trigram_prefixes
    );
    Ok(())
}
