use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use typist::bktree::BkTreeCorrector;
use typist::builder::DictionaryBuilder;
use typist::completion::CompletionEngine;
use typist::database::Database;
use typist::distance::distance;
use typist::symspell::SymSpellCorrector;

const SYLLABLES: &[&str] = &[
    "ka", "lo", "mi", "ne", "ru", "sa", "te", "vo", "wi", "ye", "bar", "den", "fol", "gin", "hum", "jas", "per",
    "quo", "ris", "tor",
];

/// Deterministic pseudo-words, three syllables each
fn synthetic_words(count: usize) -> Vec<String> {
    let n = SYLLABLES.len();
    (0..count)
        .map(|i| {
            let a = SYLLABLES[i % n];
            let b = SYLLABLES[(i / n) % n];
            let c = SYLLABLES[(i / (n * n)) % n];
            format!("{}{}{}", a, b, c)
        })
        .collect()
}

fn setup_store() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.db");
    DictionaryBuilder::from_ranked_words(synthetic_words(8_000))
        .write(&path)
        .expect("Failed to build benchmark dictionary");
    let db = Database::open(&path).expect("Failed to open benchmark dictionary");
    (dir, db)
}

fn bench_distance(c: &mut Criterion) {
    let pairs = [
        ("exact", "riverside", "riverside"),
        ("one_edit", "riversde", "riverside"),
        ("transposed", "keybaord", "keyboard"),
        ("far_apart", "hello", "sunday"),
    ];

    let mut group = c.benchmark_group("distance");
    for (name, a, b) in pairs {
        group.bench_function(name, |bench| bench.iter(|| distance(black_box(a), black_box(b), 2)));
    }
    group.finish();
}

fn bench_correction(c: &mut Criterion) {
    let (_dir, db) = setup_store();
    let conn = db.connection().unwrap();
    let token = CancellationToken::new();

    let queries = [
        ("one_edit", "kalomx"),
        ("two_edits", "kxlomix"),
        ("no_match", "zzzzzzzz"),
    ];

    let mut group = c.benchmark_group("correction");
    group.sample_size(20);

    let symspell = SymSpellCorrector::new();
    let bktree = BkTreeCorrector::new();
    for (name, query) in queries {
        group.bench_function(format!("symspell_{}", name), |b| {
            b.iter(|| symspell.find_best_correction(&conn, black_box(query), 2, &token).unwrap())
        });
        group.bench_function(format!("bktree_{}", name), |b| {
            b.iter(|| bktree.suggest_corrections(&conn, black_box(query), 2, &token).unwrap())
        });
    }
    group.finish();
}

fn bench_completion(c: &mut Criterion) {
    let (_dir, db) = setup_store();
    let conn = db.connection().unwrap();
    let engine = CompletionEngine::new(20);

    let contexts = [
        ("empty", "", ""),
        ("short_prefix", "k", ""),
        ("long_prefix", "kalo", ""),
        ("suffix_only", "", "tor"),
        ("mid_word", "ka", "tor"),
    ];

    let mut group = c.benchmark_group("completion");
    for (name, prefix, suffix) in contexts {
        group.bench_function(name, |b| {
            b.iter(|| engine.completions(&conn, black_box(prefix), black_box(suffix)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_distance, bench_correction, bench_completion);
criterion_main!(benches);
