use crate::codec::CollectorDocument;
use crate::error::StorageError;
use crate::validation::Username;

/// Trait for storing collector documents by username.
pub trait CollectorStore: Send + Sync {
    /// Get the stored document, or `None` if the user has none.
    fn load(&self, user: &Username) -> Result<Option<CollectorDocument>, StorageError>;

    /// Create or replace the user's document.
    fn save(&self, user: &Username, doc: &CollectorDocument) -> Result<(), StorageError>;

    /// Delete the user's document. Returns false if there was none.
    fn delete(&self, user: &Username) -> Result<bool, StorageError>;

    /// Move a document to a new username.
    /// Fails with `NameTaken` if `to` exists and `NotFound` if `from` doesn't.
    fn rename(&self, from: &Username, to: &Username) -> Result<(), StorageError>;

    fn exists(&self, user: &Username) -> Result<bool, StorageError>;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryCollectorStore {
        docs: RwLock<HashMap<Username, CollectorDocument>>,
    }

    impl InMemoryCollectorStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl CollectorStore for InMemoryCollectorStore {
        fn load(&self, user: &Username) -> Result<Option<CollectorDocument>, StorageError> {
            Ok(self.docs.read().unwrap().get(user).cloned())
        }

        fn save(&self, user: &Username, doc: &CollectorDocument) -> Result<(), StorageError> {
            self.docs.write().unwrap().insert(user.clone(), doc.clone());
            Ok(())
        }

        fn delete(&self, user: &Username) -> Result<bool, StorageError> {
            Ok(self.docs.write().unwrap().remove(user).is_some())
        }

        fn rename(&self, from: &Username, to: &Username) -> Result<(), StorageError> {
            let mut docs = self.docs.write().unwrap();
            if docs.contains_key(to) {
                return Err(StorageError::NameTaken(to.to_string()));
            }
            let doc = docs
                .remove(from)
                .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
            docs.insert(to.clone(), doc);
            Ok(())
        }

        fn exists(&self, user: &Username) -> Result<bool, StorageError> {
            Ok(self.docs.read().unwrap().contains_key(user))
        }
    }

}
