//! Persistent storage for sessions and query records
//!
//! An embedded SQLite file holds two append-only tables: sessions and the
//! query/response records grouped under them. Connections are opened per
//! operation; SQLite serializes writers itself, so no cross-row locking is
//! needed. The only coordinated operation is [`ResearchStore::reset`],
//! which destroys and recreates the storage file: it takes the write side
//! of a gate every other operation holds for reading, so in-flight
//! operations drain before the file is swapped and late arrivals block
//! briefly instead of touching a half-recreated schema.

pub mod error;
pub mod types;

pub use error::{Result, StoreError};
pub use types::{QueryRecord, SearchHit, SessionSummary, StoreStats};

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Storage backend for research sessions and queries
pub struct ResearchStore {
    db_path: PathBuf,
    gate: RwLock<()>,
}

impl ResearchStore {
    /// Open (or create) the store at the given path
    ///
    /// Initializes the schema if the file is new.
    pub fn new<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure the parent directory exists so opening the DB file succeeds
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            db_path,
            gate: RwLock::new(()),
        };
        init_schema(&store.open()?)?;

        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session id
    ///
    /// Idempotent: creating an already-existing session is a no-op, so
    /// concurrent first-writes for the same caller-supplied id never race
    /// into a duplicate-key failure.
    pub fn create_session(&self, session_id: &str) -> Result<()> {
        let _guard = self.read_gate();
        let conn = self.open()?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR IGNORE INTO research_sessions (session_id, created_at, updated_at)
             VALUES (?1, ?2, ?2)",
            params![session_id, now],
        )?;

        Ok(())
    }

    /// Append a query/response record and bump the session timestamp
    ///
    /// The session row is re-ensured first, so a record can never reference
    /// a missing session.
    pub fn save_query(
        &self,
        session_id: &str,
        query: &str,
        response: &str,
        model: &str,
        tokens_used: i64,
        response_time: f64,
    ) -> Result<()> {
        let _guard = self.read_gate();
        let mut conn = self.open()?;

        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO research_sessions (session_id, created_at, updated_at)
             VALUES (?1, ?2, ?2)",
            params![session_id, now],
        )?;

        tx.execute(
            "INSERT INTO research_queries
             (session_id, query, response, model, tokens_used, response_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![session_id, query, response, model, tokens_used, response_time, now],
        )?;

        tx.execute(
            "UPDATE research_sessions SET updated_at = ?1 WHERE session_id = ?2",
            params![now, session_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// All records for one session, oldest first
    pub fn get_session_history(&self, session_id: &str) -> Result<Vec<QueryRecord>> {
        let _guard = self.read_gate();
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT id, query, response, model, tokens_used, response_time, created_at
             FROM research_queries
             WHERE session_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            Ok(QueryRecord {
                id: row.get(0)?,
                query: row.get(1)?,
                response: row.get(2)?,
                model: row.get(3)?,
                tokens_used: row.get(4)?,
                response_time: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// All sessions with query counts and last-query summaries, most
    /// recently updated first
    pub fn get_all_sessions(&self) -> Result<Vec<SessionSummary>> {
        let _guard = self.read_gate();
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT
                 s.session_id,
                 s.created_at,
                 s.updated_at,
                 COUNT(q.id) AS query_count,
                 (SELECT query FROM research_queries
                  WHERE session_id = s.session_id
                  ORDER BY created_at DESC, id DESC
                  LIMIT 1) AS last_query
             FROM research_sessions s
             LEFT JOIN research_queries q ON s.session_id = q.session_id
             GROUP BY s.session_id
             ORDER BY s.updated_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SessionSummary {
                session_id: row.get(0)?,
                created_at: row.get(1)?,
                updated_at: row.get(2)?,
                query_count: row.get(3)?,
                last_query: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Keyword search over stored queries and responses, newest first
    pub fn search(&self, term: &str, limit: i64) -> Result<Vec<SearchHit>> {
        let _guard = self.read_gate();
        let conn = self.open()?;

        let pattern = format!("%{}%", term);
        let mut stmt = conn.prepare(
            "SELECT id, session_id, query, response, created_at
             FROM research_queries
             WHERE query LIKE ?1 OR response LIKE ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![pattern, limit], |row| {
            Ok(SearchHit {
                id: row.get(0)?,
                session_id: row.get(1)?,
                query: row.get(2)?,
                response: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Aggregate statistics over the whole store
    pub fn get_stats(&self) -> Result<StoreStats> {
        let _guard = self.read_gate();
        let conn = self.open()?;

        let total_queries: i64 =
            conn.query_row("SELECT COUNT(*) FROM research_queries", [], |row| row.get(0))?;
        let total_sessions: i64 =
            conn.query_row("SELECT COUNT(*) FROM research_sessions", [], |row| row.get(0))?;
        let total_tokens: i64 = conn.query_row(
            "SELECT COALESCE(SUM(tokens_used), 0) FROM research_queries",
            [],
            |row| row.get(0),
        )?;
        // Unmeasured latencies (0.0) would drag the mean down, so they are excluded
        let avg_response_time: f64 = conn.query_row(
            "SELECT COALESCE(AVG(response_time), 0.0)
             FROM research_queries WHERE response_time > 0",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            total_queries,
            total_sessions,
            total_tokens,
            avg_response_time: (avg_response_time * 100.0).round() / 100.0,
        })
    }

    /// Delete every row, keeping the schema
    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.read_gate();
        let mut conn = self.open()?;

        let tx = conn.transaction()?;
        // Queries first, they reference sessions
        tx.execute("DELETE FROM research_queries", [])?;
        tx.execute("DELETE FROM research_sessions", [])?;
        tx.commit()?;

        Ok(())
    }

    /// Destroy the storage file and recreate an empty schema
    pub fn reset(&self) -> Result<()> {
        let _guard = self.write_gate();

        match std::fs::remove_file(&self.db_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        init_schema(&self.open()?)?;
        Ok(())
    }
}

/// Create tables and indexes if they do not exist
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS research_sessions (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             session_id TEXT UNIQUE NOT NULL,
             created_at TEXT NOT NULL,
             updated_at TEXT NOT NULL
         )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS research_queries (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             session_id TEXT NOT NULL,
             query TEXT NOT NULL,
             response TEXT NOT NULL,
             model TEXT DEFAULT 'reka-flash-research',
             tokens_used INTEGER DEFAULT 0,
             response_time REAL DEFAULT 0.0,
             created_at TEXT NOT NULL,
             FOREIGN KEY (session_id) REFERENCES research_sessions (session_id)
         )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_id ON research_queries(session_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_created_at ON research_queries(created_at)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_query_text ON research_queries(query)",
        [],
    )?;

    Ok(())
}
