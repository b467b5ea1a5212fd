use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passport::{create_router, AppState, Config, StorageBackend};
use passport_core::{CollectorStore, WorldCatalog};
use passport_store::{init_database, FileCollectorStore, RedbCollectorStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: PASSPORT_LISTEN_ADDR, PASSPORT_STORAGE=file|redb");
            eprintln!("          PASSPORT_DATA_DIR, PASSPORT_DB_PATH, PASSPORT_WRITE_LIMIT");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Passport server");
    tracing::info!("Listen address: {}", config.listen_addr);

    let store: Arc<dyn CollectorStore> = match &config.storage {
        StorageBackend::File { data_dir } => {
            tracing::info!("File storage: {}", data_dir.display());
            match FileCollectorStore::open(data_dir) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    eprintln!("Storage error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        StorageBackend::Redb { db_path } => {
            tracing::info!("Database path: {}", db_path.display());
            match init_database(db_path) {
                Ok(db) => Arc::new(RedbCollectorStore::new(db)),
                Err(e) => {
                    eprintln!("Database error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let catalog = match WorldCatalog::bundled() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!("Failed to load bundled worlds: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Worlds: {}", catalog.names().join(", "));

    let state = AppState::new(store, catalog, config.write_limit);

    let limiter = state.write_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.cleanup();
            tracing::debug!(clients = limiter.tracked_clients(), "Pruned write limiter");
        }
    });

    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server running at http://{}", config.listen_addr);

    axum::serve(listener, app).await.expect("Server error");
}
