//! SQLite sink
//!
//! Appends one `posts` row per result. Rows from earlier runs are kept.

use crate::model::ResultBatch;
use crate::output::traits::{ResultSink, SinkResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQL schema for the results table
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT,
    content TEXT
);
"#;

/// Relational sink backed by a SQLite database file
///
/// The database is opened when a batch is written, so a missing or locked
/// file only fails this sink.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> SinkResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }
}

impl ResultSink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write(&mut self, batch: &ResultBatch) -> SinkResult<()> {
        let mut conn = self.open()?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO posts (url, content) VALUES (?1, ?2)")?;
            for result in batch {
                stmt.execute(params![result.target.address().as_str(), result.content])?;
            }
        }
        tx.commit()?;

        tracing::info!("Stored {} rows in {}", batch.len(), self.path.display());
        Ok(())
    }
}

/// Counts the rows stored in the database at `path`
pub fn count_rows(path: &Path) -> SinkResult<u64> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA_SQL)?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Loads every stored `(url, content)` row in insertion order
pub fn load_rows(path: &Path) -> SinkResult<Vec<(String, String)>> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA_SQL)?;

    let mut stmt = conn.prepare("SELECT url, content FROM posts ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
