//! SQLite dictionary store
//!
//! Read-only. The store is produced offline (see `builder`) and opened once per engine.
//! Uses an r2d2 pool only to hand out dedicated connections: the interactive thread
//! and the background worker each own one, so interrupting the worker's connection
//! can never abort an interactive query.

use crate::models::BkNode;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, ErrorCode, InterruptHandle, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Dictionary store not found at {0}")]
    MissingStore(PathBuf),
    #[error("Dictionary store is missing table `{0}`")]
    InvalidSchema(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl DatabaseError {
    /// True when a statement was aborted through the connection's interrupt handle
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::OperationInterrupted
        )
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Interactive + background
const CONNECTIONS_PER_ENGINE: u32 = 2;

/// Room for the per-hash-count SymSpell statements plus the fixed queries
const STATEMENT_CACHE_CAPACITY: usize = 128;

/// Tables every store must carry, probed on open
const REQUIRED_TABLES: &[&str] = &[
    "words",
    "words_by_suffix",
    "symspell_deletes",
    "bk_nodes",
    "bk_edges",
    "kv",
    "bigram_frequencies",
    "trigram_frequencies",
];

/// N-gram distribution tables, keyed by a one- or two-letter prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NgramTable {
    Bigram,
    Trigram,
}

impl NgramTable {
    fn table_name(self) -> &'static str {
        match self {
            NgramTable::Bigram => "bigram_frequencies",
            NgramTable::Trigram => "trigram_frequencies",
        }
    }
}

/// Escape LIKE wildcards so user text only ever matches literally
fn like_prefix_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 1);
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Read-only handle on a dictionary store
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open an existing store. Fails if the file is missing, unreadable, or lacks a table.
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DatabaseError::MissingStore(path.to_path_buf()));
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .with_init(|conn| {
                conn.execute_batch("PRAGMA query_only=ON;")?;
                conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
                Ok(())
            });

        // No eager connections: a corrupt file must fail fast in validate_schema,
        // not spin inside the pool's retry loop.
        let pool = Pool::builder()
            .max_size(CONNECTIONS_PER_ENGINE)
            .min_idle(Some(0))
            .connection_timeout(Duration::from_secs(2))
            .build_unchecked(manager);

        let db = Self { pool };
        db.validate_schema()?;
        tracing::info!(path = %path.display(), "dictionary store opened");
        Ok(db)
    }

    /// Check out a connection for exclusive use by one thread.
    pub fn connection(&self) -> DatabaseResult<DictionaryConnection> {
        Ok(DictionaryConnection {
            conn: self.pool.get()?,
            queries: AtomicU64::new(0),
        })
    }

    fn validate_schema(&self) -> DatabaseResult<()> {
        let conn = self.pool.get()?;
        for table in REQUIRED_TABLES {
            let probe = format!("SELECT * FROM {} LIMIT 0", table);
            if let Err(e) = conn.prepare(&probe) {
                return match e {
                    rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::NotADatabase => {
                        Err(e.into())
                    }
                    _ => Err(DatabaseError::InvalidSchema(table)),
                };
            }
        }
        Ok(())
    }
}

/// A store connection owned by exactly one thread.
///
/// Every lookup goes through a cached prepared statement. The issued-query
/// counter is diagnostic only.
pub struct DictionaryConnection {
    conn: PooledConnection<SqliteConnectionManager>,
    queries: AtomicU64,
}

impl DictionaryConnection {
    /// Handle that aborts whatever statement this connection is running, from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Number of queries issued on this connection so far
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    fn count_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Words
    // ─────────────────────────────────────────────────────────────────────────

    /// Case-insensitive exact lookup. Hidden words count: they are valid, just never suggested.
    pub fn canonical_form(&self, word_lower: &str) -> DatabaseResult<Option<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            "SELECT word FROM words WHERE word_lower = ?1 ORDER BY frequency_rank LIMIT 1",
        )?;
        Ok(stmt.query_row(params![word_lower], |row| row.get(0)).optional()?)
    }

    /// Visible words starting with `prefix` and ending with `suffix`, at least `min_len` chars long
    pub fn words_with_prefix_and_suffix(
        &self,
        prefix_lower: &str,
        suffix_lower_reversed: &str,
        min_len: usize,
        limit: usize,
    ) -> DatabaseResult<Vec<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            r#"SELECT word FROM words
               WHERE word_lower LIKE ?1 ESCAPE '\' AND word_lower_reversed LIKE ?2 ESCAPE '\'
                 AND length(word_lower) >= ?3 AND hidden = 0
               ORDER BY frequency_rank LIMIT ?4"#,
        )?;
        let rows = stmt.query_map(
            params![
                like_prefix_pattern(prefix_lower),
                like_prefix_pattern(suffix_lower_reversed),
                min_len as i64,
                limit as i64,
            ],
            |row| row.get(0),
        )?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Visible words starting with `prefix`
    pub fn words_with_prefix(&self, prefix_lower: &str, limit: usize) -> DatabaseResult<Vec<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            r#"SELECT word FROM words
               WHERE word_lower LIKE ?1 ESCAPE '\' AND hidden = 0
               ORDER BY frequency_rank LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(
            params![like_prefix_pattern(prefix_lower), limit as i64],
            |row| row.get(0),
        )?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Visible words ending with the suffix whose reversal is given
    pub fn words_with_suffix(&self, suffix_lower_reversed: &str, limit: usize) -> DatabaseResult<Vec<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            r#"SELECT word FROM words_by_suffix
               WHERE word_lower_reversed LIKE ?1 ESCAPE '\' AND hidden = 0
               ORDER BY frequency_rank LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(
            params![like_prefix_pattern(suffix_lower_reversed), limit as i64],
            |row| row.get(0),
        )?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// The `limit` most frequent visible words
    pub fn most_frequent_words(&self, limit: usize) -> DatabaseResult<Vec<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            "SELECT word FROM words WHERE hidden = 0 ORDER BY frequency_rank LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Correction indexes
    // ─────────────────────────────────────────────────────────────────────────

    /// All (word, frequency_rank) rows whose delete hash is in `hashes`, most frequent first.
    /// One statement per distinct hash count, reused through the statement cache.
    pub fn symspell_candidates(&self, hashes: &[i64]) -> DatabaseResult<Vec<(String, i64)>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        self.count_query();

        let placeholders = hashes.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT word, frequency_rank FROM symspell_deletes WHERE delete_hash IN ({}) ORDER BY frequency_rank ASC",
            placeholders
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(hashes.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn bk_node(&self, node_id: i64) -> DatabaseResult<Option<BkNode>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            "SELECT word, frequency_rank, hidden FROM bk_nodes WHERE node_id = ?1",
        )?;
        let node = stmt
            .query_row(params![node_id], |row| {
                Ok(BkNode {
                    node_id,
                    word: row.get(0)?,
                    frequency_rank: row.get(1)?,
                    hidden: row.get::<_, i64>(2)? != 0,
                })
            })
            .optional()?;
        Ok(node)
    }

    /// Children of `parent_id` whose edge distance lies in `[min_distance, max_distance]`
    pub fn bk_children(&self, parent_id: i64, min_distance: u32, max_distance: u32) -> DatabaseResult<Vec<i64>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached(
            "SELECT child_id FROM bk_edges WHERE parent_id = ?1 AND distance >= ?2 AND distance <= ?3",
        )?;
        let rows = stmt.query_map(
            params![parent_id, i64::from(min_distance), i64::from(max_distance)],
            |row| row.get(0),
        )?;
        Ok(rows.collect::<Result<Vec<i64>, _>>()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Letter distributions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn kv_value(&self, key: &str) -> DatabaseResult<Option<String>> {
        self.count_query();
        let mut stmt = self.conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        Ok(stmt.query_row(params![key], |row| row.get(0)).optional()?)
    }

    pub fn ngram_distribution(&self, table: NgramTable, prefix: &str) -> DatabaseResult<Option<String>> {
        self.count_query();
        let sql = format!("SELECT distribution FROM {} WHERE prefix = ?1", table.table_name());
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.query_row(params![prefix], |row| row.get(0)).optional()?)
    }
}
