//! Passport Core - Countries, worlds, visits and the collector that ties
//! them together.
//!
//! This crate contains the domain model, its JSON documents, the bundled
//! world catalog and the storage traits. It has no dependencies on other
//! Passport crates.

pub mod catalog;
pub mod codec;
pub mod collector;
pub mod country;
pub mod error;
pub mod event;
pub mod gateway;
pub mod stats;
pub mod storage;
pub mod validation;
pub mod visit;
pub mod world;

// Re-exports for convenience
pub use catalog::{WorldCatalog, DEFAULT_WORLD, EUROPE_WORLD};
pub use codec::{
    decode_collector, decode_visit, encode_collector, encode_visit, from_json, to_json,
    CollectorDocument, VisitDocument, WorldDocument, WorldResolver,
};
pub use collector::CountryCollector;
pub use country::Country;
pub use error::{CodecError, CollectorError, CoreError, StorageError, ValidationError, WorldError};
pub use event::{ChangeEvent, Listener, ListenerId, Listeners};
pub use gateway::PersistenceGateway;
pub use stats::{Badge, RegionProgress, Statistics};
pub use storage::CollectorStore;
pub use validation::Username;
pub use visit::Visit;
pub use world::World;

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::InMemoryCollectorStore;
