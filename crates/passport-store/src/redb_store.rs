use std::sync::Arc;

use redb::{Database, ReadableTable};

use passport_core::{CollectorDocument, CollectorStore, StorageError, Username};

use crate::tables::COLLECTORS_TABLE;

fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// redb implementation of CollectorStore.
pub struct RedbCollectorStore {
    db: Arc<Database>,
}

impl RedbCollectorStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Initialize the database tables.
    pub fn init_tables(db: &Database) -> Result<(), StorageError> {
        let write_txn = db.begin_write().map_err(db_err)?;
        {
            let _ = write_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;
        Ok(())
    }
}

impl CollectorStore for RedbCollectorStore {
    fn load(&self, user: &Username) -> Result<Option<CollectorDocument>, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;

        match table.get(user.as_str()).map_err(db_err)? {
            Some(value) => {
                let doc: CollectorDocument = serde_json::from_slice(value.value())?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    fn save(&self, user: &Username, doc: &CollectorDocument) -> Result<(), StorageError> {
        let value = serde_json::to_vec(doc)?;

        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;
            table
                .insert(user.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;

        Ok(())
    }

    fn delete(&self, user: &Username) -> Result<bool, StorageError> {
        let write_txn = self.db.begin_write().map_err(db_err)?;

        let removed;
        {
            let mut table = write_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;
            removed = table.remove(user.as_str()).map_err(db_err)?.is_some();
        }

        write_txn.commit().map_err(db_err)?;
        Ok(removed)
    }

    fn rename(&self, from: &Username, to: &Username) -> Result<(), StorageError> {
        // Dropping the transaction on an early return aborts it.
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;

            if table.get(to.as_str()).map_err(db_err)?.is_some() {
                return Err(StorageError::NameTaken(to.to_string()));
            }

            let value = table
                .remove(from.as_str())
                .map_err(db_err)?
                .map(|guard| guard.value().to_vec())
                .ok_or_else(|| StorageError::NotFound(from.to_string()))?;

            table
                .insert(to.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;

        Ok(())
    }

    fn exists(&self, user: &Username) -> Result<bool, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(COLLECTORS_TABLE).map_err(db_err)?;
        let found = table.get(user.as_str()).map_err(db_err)?.is_some();
        Ok(found)
    }
}
