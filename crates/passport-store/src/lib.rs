//! Passport Store - file and redb implementations of `CollectorStore`.

pub mod file_store;
pub mod redb_store;
pub mod tables;

pub use file_store::FileCollectorStore;
pub use redb_store::RedbCollectorStore;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

use passport_core::StorageError;

/// Initialize a database with all required tables.
pub fn init_database(path: impl AsRef<Path>) -> Result<Arc<Database>, StorageError> {
    let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

    RedbCollectorStore::init_tables(&db)?;

    Ok(Arc::new(db))
}
