use std::sync::Arc;

use crate::catalog::WorldCatalog;
use crate::codec::{decode_collector, encode_collector, CollectorDocument, WorldResolver};
use crate::collector::CountryCollector;
use crate::error::{CodecError, CoreError, StorageError};
use crate::storage::CollectorStore;
use crate::validation::Username;

/// Maps usernames to collectors on top of a [`CollectorStore`].
///
/// Stored documents embed their world. On load the world is looked up by
/// name in the catalog so collectors on the same bundled world share one
/// `Arc<World>`; unknown names fall back to the embedded copy.
///
/// Storage and decoding failures are logged and reported as "absent" or
/// `false`; they never surface as collector invariant violations.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn CollectorStore>,
    catalog: Arc<WorldCatalog>,
    resolver: Arc<WorldResolver>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn CollectorStore>, catalog: Arc<WorldCatalog>) -> Self {
        let resolver = Arc::new(catalog.resolver());
        Self {
            store,
            catalog,
            resolver,
        }
    }

    pub fn catalog(&self) -> &Arc<WorldCatalog> {
        &self.catalog
    }

    /// Decode a document with the catalog resolver.
    pub fn decode(&self, doc: CollectorDocument) -> Result<CountryCollector, CodecError> {
        decode_collector(doc, &self.resolver)
    }

    /// Like [`Self::load`] but reports why nothing was loaded.
    pub fn try_load(&self, user: &Username) -> Result<Option<CountryCollector>, CoreError> {
        let Some(doc) = self.store.load(user)? else {
            return Ok(None);
        };
        Ok(Some(self.decode(doc)?))
    }

    pub fn load(&self, user: &Username) -> Option<CountryCollector> {
        match self.try_load(user) {
            Ok(collector) => collector,
            Err(e) => {
                tracing::warn!(%user, "Failed to load collector: {}", e);
                None
            }
        }
    }

    /// The stored collector, or an empty one on the catalog's default world
    /// when nothing is stored. A stored document that can't be read or
    /// decoded is an error, so callers never overwrite it with a fresh
    /// collector.
    pub fn load_or_default(&self, user: &Username) -> Result<CountryCollector, CoreError> {
        Ok(self
            .try_load(user)?
            .unwrap_or_else(|| CountryCollector::new(self.catalog.default_world())))
    }

    pub fn save(&self, user: &Username, collector: &CountryCollector) -> bool {
        let doc = encode_collector(collector, true);
        match self.store.save(user, &doc) {
            Ok(()) => {
                tracing::debug!(%user, visits = doc.visits.len(), "Saved collector");
                true
            }
            Err(e) => {
                tracing::warn!(%user, "Failed to save collector: {}", e);
                false
            }
        }
    }

    /// True once no collector is stored for `user`, including when there
    /// never was one.
    pub fn delete(&self, user: &Username) -> bool {
        match self.store.delete(user) {
            Ok(existed) => {
                tracing::debug!(%user, existed, "Deleted collector");
                true
            }
            Err(e) => {
                tracing::warn!(%user, "Failed to delete collector: {}", e);
                false
            }
        }
    }

    pub fn rename(&self, from: &Username, to: &Username) -> Result<(), StorageError> {
        self.store.rename(from, to)?;
        tracing::info!(%from, %to, "Renamed collector");
        Ok(())
    }

    pub fn exists(&self, user: &Username) -> bool {
        self.store.exists(user).unwrap_or_else(|e| {
            tracing::warn!(%user, "Failed to check collector: {}", e);
            false
        })
    }
}
