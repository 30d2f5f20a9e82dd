//! TargetStore — redb-backed persistence for registered targets.
//!
//! All records are JSON-serialized into a single `&str` → `&[u8]` table
//! keyed by the record's composite identity, so "at most one record per
//! identity" holds structurally: upsert is one keyed insert inside one
//! committed write transaction, never a delete followed by an insert. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use promgrid_core::{TargetIdentity, TargetRecord};

use crate::error::{StateError, StateResult};
use crate::tables::TARGETS;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe target store backed by redb.
#[derive(Clone)]
pub struct TargetStore {
    db: Arc<Database>,
}

impl TargetStore {
    /// Open (or create) a persistent target store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "target store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory target store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory target store opened");
        Ok(store)
    }

    /// Create the targets table if it doesn't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(TARGETS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or replace the record stored under its identity key.
    ///
    /// The caller must pass a record whose identity labels are present;
    /// returns a write error naming the record otherwise.
    pub fn upsert(&self, record: &TargetRecord) -> StateResult<()> {
        let key = record
            .identity()
            .ok_or_else(|| {
                StateError::Write(format!(
                    "record {}/{} has no identity labels",
                    record.exporter, record.target
                ))
            })?
            .table_key();
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(TARGETS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, "target stored");
        Ok(())
    }

    /// Get the record stored under an identity, if any.
    pub fn get(&self, identity: &TargetIdentity) -> StateResult<Option<TargetRecord>> {
        let key = identity.table_key();
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TARGETS).map_err(map_err!(Table))?;
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: TargetRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List every stored record.
    pub fn list_all(&self) -> StateResult<Vec<TargetRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TARGETS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: TargetRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }

    /// List all records for one `(exporter, zone)` pair (by key prefix scan).
    pub fn find(&self, exporter: &str, zone: &str) -> StateResult<Vec<TargetRecord>> {
        let prefix = TargetIdentity::zone_prefix(exporter, zone);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TARGETS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                let record: TargetRecord =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                results.push(record);
            }
        }
        Ok(results)
    }

    /// Delete the record stored under an identity. Returns true if it existed.
    ///
    /// Deleting an identity with no stored record is not an error.
    pub fn delete(&self, identity: &TargetIdentity) -> StateResult<bool> {
        let key = identity.table_key();
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(TARGETS).map_err(map_err!(Table))?;
            existed = table.remove(key.as_str()).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "target deleted");
        Ok(existed)
    }
}
