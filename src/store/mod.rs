//! Row storage backends for engine state
//!
//! The engine persists through a small row-store contract: read a whole
//! table, upsert a row keyed by its `id` column, or append a row. Rows are
//! flat JSON objects, one per record.
//!
//! ```text
//! ┌─────────────────┐
//! │     Engine      │
//! └────────┬────────┘
//!          │ RowStore
//!    ┌─────┴──────┐
//!    ▼            ▼
//! SqliteStore  MemoryStore
//! ```

mod db;
mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;

/// A flat record as stored in one table row
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Table holding one state row per user
pub const STATE_TABLE: &str = "player_state";

/// Append-only table of XP awards
pub const XP_LOG_TABLE: &str = "xp_log";

/// Column used as the upsert key by [`RowStore::write`]
pub const KEY_COLUMN: &str = "id";

/// Error type for row storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Row has no 'id' column for table {0}")]
    MissingKey(String),

    #[error("Failed to prepare store: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value row store the engine persists through
pub trait RowStore: Send {
    /// All rows of a table; keyed rows first, then appended rows in order
    fn read(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    /// Insert or replace the row with the same `id`
    fn write(&self, table: &str, row: &Row) -> Result<(), StoreError>;

    /// Append a row without any key check
    fn append(&self, table: &str, row: &Row) -> Result<(), StoreError>;
}

/// Extract the string key of a row
pub(crate) fn row_key(table: &str, row: &Row) -> Result<String, StoreError> {
    row.get(KEY_COLUMN)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| StoreError::MissingKey(table.to_string()))
}
