//! SQLite row store
//!
//! Manages the `~/.grove/grove.db` database. Keyed rows and appended rows
//! live in separate tables so upserts never touch the append-only log.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tracing::debug;

use super::{row_key, Row, RowStore, StoreError};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Database wrapper shared between clones
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        debug!("Opened progress store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Progress DB lock poisoned")
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let conn = self.conn();
        let version = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )?;
        Ok(version)
    }
}

impl RowStore for SqliteStore {
    fn read(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let conn = self.conn();

        let mut stmt =
            conn.prepare("SELECT data FROM keyed_rows WHERE table_name = ?1 ORDER BY rowid")?;
        let mut raw: Vec<String> = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut stmt =
            conn.prepare("SELECT data FROM appended_rows WHERE table_name = ?1 ORDER BY seq")?;
        let appended: Vec<String> = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        raw.extend(appended);

        raw.iter()
            .map(|data| serde_json::from_str::<Row>(data).map_err(StoreError::from))
            .collect()
    }

    fn write(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        let key = row_key(table, row)?;
        let data = serde_json::to_string(row)?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO keyed_rows (table_name, row_key, data, updated_at)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(table_name, row_key) DO UPDATE SET
                   data = ?3, updated_at = ?4"#,
            rusqlite::params![table, key, data, now],
        )?;
        Ok(())
    }

    fn append(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        let data = serde_json::to_string(row)?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn();
        conn.execute(
            "INSERT INTO appended_rows (table_name, data, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![table, data, now],
        )?;
        Ok(())
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- Rows replaced in place (one per key per table)
CREATE TABLE IF NOT EXISTS keyed_rows (
    table_name TEXT NOT NULL,
    row_key TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (table_name, row_key)
);

-- Append-only rows (XP log)
CREATE TABLE IF NOT EXISTS appended_rows (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    table_name TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_appended_table ON appended_rows(table_name, seq);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
"#;
