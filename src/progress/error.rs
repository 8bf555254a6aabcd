use crate::store::StoreError;

/// Errors returned by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A caller passed arguments the engine cannot record
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A persisted record exists but cannot be decoded
    #[error("Corrupt {table} record: {reason}")]
    CorruptRecord { table: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
