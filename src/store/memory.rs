//! In-memory row store
//!
//! Clones share the same rows, so a test can keep a handle while the engine
//! owns another. The availability switch simulates an unreachable backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{row_key, Row, RowStore, StoreError};

#[derive(Default)]
struct Tables {
    keyed: HashMap<String, Vec<(String, Row)>>,
    appended: HashMap<String, Vec<Row>>,
}

#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Make every operation fail (or succeed again)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of appended rows in a table
    pub fn appended_len(&self, table: &str) -> usize {
        self.lock().appended.get(table).map(Vec::len).unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("Memory store lock poisoned")
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        }
    }
}

impl RowStore for MemoryStore {
    fn read(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        self.check_available()?;
        let tables = self.lock();
        let keyed = tables
            .keyed
            .get(table)
            .into_iter()
            .flatten()
            .map(|(_, row)| row.clone());
        let appended = tables.appended.get(table).into_iter().flatten().cloned();
        Ok(keyed.chain(appended).collect())
    }

    fn write(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        self.check_available()?;
        let key = row_key(table, row)?;
        let mut tables = self.lock();
        let rows = tables.keyed.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = row.clone(),
            None => rows.push((key, row.clone())),
        }
        Ok(())
    }

    fn append(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        self.check_available()?;
        self.lock()
            .appended
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(())
    }
}
