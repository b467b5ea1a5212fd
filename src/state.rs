use std::sync::Arc;

use passport_core::{CollectorStore, PersistenceGateway, WorldCatalog};

use crate::middleware::RateLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: PersistenceGateway,
    pub catalog: Arc<WorldCatalog>,
    pub write_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CollectorStore>,
        catalog: Arc<WorldCatalog>,
        write_limit: u32,
    ) -> Self {
        Self {
            gateway: PersistenceGateway::new(store, catalog.clone()),
            catalog,
            write_limiter: Arc::new(RateLimiter::per_second(write_limit)),
        }
    }
}
