use std::collections::BTreeMap;
use std::sync::Arc;

use crate::codec::{WorldDocument, WorldResolver};
use crate::error::{CodecError, WorldError};
use crate::world::World;

/// Reference dataset compiled into the binary.
const BUNDLED_WORLD: &str = include_str!("../data/world.json");

pub const DEFAULT_WORLD: &str = "world";
pub const EUROPE_WORLD: &str = "europe";

/// Named worlds available to every user, keyed by lower-case name.
#[derive(Debug, Clone)]
pub struct WorldCatalog {
    worlds: BTreeMap<String, Arc<World>>,
    default_name: String,
}

impl WorldCatalog {
    /// Build a catalog whose default world is `default`. The default world
    /// must be named.
    pub fn new(default: World) -> Self {
        let default_name = default.name().unwrap_or(DEFAULT_WORLD).to_lowercase();
        let mut worlds = BTreeMap::new();
        worlds.insert(default_name.clone(), Arc::new(default));
        Self {
            worlds,
            default_name,
        }
    }

    /// Add another named world. Unnamed worlds can't be looked up and are
    /// ignored.
    pub fn with_world(mut self, world: World) -> Self {
        if let Some(name) = world.name() {
            self.worlds.insert(name.to_lowercase(), Arc::new(world));
        }
        self
    }

    /// The bundled catalog: `world` with every country and `europe` with
    /// the `EU` region.
    pub fn bundled() -> Result<Self, CodecError> {
        let doc: WorldDocument = serde_json::from_str(BUNDLED_WORLD)?;
        let world = World::try_from(doc)?;
        let europe = Self::region_subset(&world, EUROPE_WORLD, "EU")?;

        tracing::debug!(
            countries = world.len(),
            europe = europe.len(),
            "Loaded bundled worlds"
        );
        Ok(Self::new(world).with_world(europe))
    }

    fn region_subset(world: &World, name: &str, region: &str) -> Result<World, WorldError> {
        World::new(
            Some(name.to_string()),
            world.countries_in_region(region).cloned().collect(),
        )
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<World>> {
        self.worlds.get(&name.trim().to_lowercase()).cloned()
    }

    pub fn default_world(&self) -> Arc<World> {
        // The default entry is inserted in `new` and never removed.
        self.worlds[&self.default_name].clone()
    }

    /// Sorted world names.
    pub fn names(&self) -> Vec<&str> {
        self.worlds.keys().map(String::as_str).collect()
    }

    /// A resolver that looks embedded world names up in this catalog.
    pub fn resolver(self: &Arc<Self>) -> WorldResolver {
        let catalog = Arc::clone(self);
        WorldResolver::named(move |name| catalog.get(name))
    }
}
