//! JSON documents for worlds, visits and collectors.
//!
//! A visit document only carries a country code, so turning a
//! [`CollectorDocument`] back into a [`CountryCollector`] needs a world to
//! resolve codes against. That world is chosen by an explicit
//! [`WorldResolver`] passed to [`decode_collector`]; every visit is resolved
//! against the same `Arc<World>` the collector ends up bound to.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::collector::CountryCollector;
use crate::country::Country;
use crate::error::{CodecError, WorldError};
use crate::visit::Visit;
use crate::world::World;

/// `{ "worldName": string|null, "Countries": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    #[serde(rename = "worldName", default)]
    pub world_name: Option<String>,
    #[serde(rename = "Countries", default)]
    pub countries: Vec<Country>,
}

impl From<&World> for WorldDocument {
    fn from(world: &World) -> Self {
        Self {
            world_name: world.name().map(str::to_string),
            countries: world.countries().to_vec(),
        }
    }
}

impl TryFrom<WorldDocument> for World {
    type Error = WorldError;

    fn try_from(doc: WorldDocument) -> Result<Self, Self::Error> {
        World::new(doc.world_name, doc.countries)
    }
}

/// `{ "countryCode": string, "arrival": ISO-8601|null, "departure": ISO-8601|null }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDocument {
    pub country_code: String,
    #[serde(default, with = "iso_timestamp")]
    pub arrival: Option<NaiveDateTime>,
    #[serde(default, with = "iso_timestamp")]
    pub departure: Option<NaiveDateTime>,
}

impl From<&Visit> for VisitDocument {
    fn from(visit: &Visit) -> Self {
        Self {
            country_code: visit.country.country_code.clone(),
            arrival: visit.arrival,
            departure: visit.departure,
        }
    }
}

/// `{ "World"?: WorldDocument, "Visits": [...] }`
///
/// `World` is absent when the world is supplied out of band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectorDocument {
    #[serde(rename = "World", default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldDocument>,
    #[serde(rename = "Visits", default)]
    pub visits: Vec<VisitDocument>,
}

type NamedWorldLookup = dyn Fn(&str) -> Option<Arc<World>> + Send + Sync;

/// How [`decode_collector`] picks the world a collector is bound to.
pub enum WorldResolver {
    /// Always use this world; any embedded world is ignored.
    Fixed(Arc<World>),
    /// Build the world embedded in the document.
    Embedded,
    /// Look the embedded `worldName` up; fall back to building the embedded
    /// world when the lookup misses.
    Named(Box<NamedWorldLookup>),
}

impl WorldResolver {
    pub fn named(lookup: impl Fn(&str) -> Option<Arc<World>> + Send + Sync + 'static) -> Self {
        WorldResolver::Named(Box::new(lookup))
    }

    pub fn resolve(&self, embedded: Option<WorldDocument>) -> Result<Arc<World>, CodecError> {
        match self {
            WorldResolver::Fixed(world) => Ok(world.clone()),
            WorldResolver::Embedded => {
                let doc = embedded.ok_or(CodecError::MissingWorld)?;
                Ok(Arc::new(World::try_from(doc)?))
            }
            WorldResolver::Named(lookup) => {
                let doc = embedded.ok_or(CodecError::MissingWorld)?;
                if let Some(world) = doc.world_name.as_deref().and_then(|name| lookup(name)) {
                    return Ok(world);
                }
                tracing::debug!(
                    world = ?doc.world_name,
                    "World not known by name, building from document"
                );
                Ok(Arc::new(World::try_from(doc)?))
            }
        }
    }
}

impl std::fmt::Debug for WorldResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldResolver::Fixed(world) => f.debug_tuple("Fixed").field(&world.name()).finish(),
            WorldResolver::Embedded => f.write_str("Embedded"),
            WorldResolver::Named(_) => f.write_str("Named(..)"),
        }
    }
}

pub fn encode_visit(visit: &Visit) -> VisitDocument {
    VisitDocument::from(visit)
}

/// Resolve a visit document's country code against `world`.
pub fn decode_visit(doc: &VisitDocument, world: &World) -> Result<Visit, CodecError> {
    let country = world
        .country_by_code(&doc.country_code)
        .ok_or_else(|| CodecError::UnknownCountryCode(doc.country_code.clone()))?;
    Ok(Visit::new(country.clone(), doc.arrival, doc.departure))
}

pub fn encode_collector(collector: &CountryCollector, embed_world: bool) -> CollectorDocument {
    CollectorDocument {
        world: embed_world.then(|| WorldDocument::from(collector.world().as_ref())),
        visits: collector.visits().iter().map(VisitDocument::from).collect(),
    }
}

/// Rebuild a collector. Either every visit resolves or nothing is returned.
pub fn decode_collector(
    doc: CollectorDocument,
    resolver: &WorldResolver,
) -> Result<CountryCollector, CodecError> {
    let world = resolver.resolve(doc.world)?;
    let visits = doc
        .visits
        .iter()
        .map(|v| decode_visit(v, &world))
        .collect::<Result<Vec<_>, _>>()?;

    let mut collector = CountryCollector::new(world);
    collector.restore(visits);
    Ok(collector)
}

pub fn to_json(collector: &CountryCollector, embed_world: bool) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&encode_collector(collector, embed_world))?)
}

pub fn from_json(json: &str, resolver: &WorldResolver) -> Result<CountryCollector, CodecError> {
    let doc: CollectorDocument = serde_json::from_str(json)?;
    decode_collector(doc, resolver)
}

/// ISO-8601 timestamps. Written as `YYYY-MM-DDTHH:MM:SS`; a bare date is
/// accepted on input and means midnight.
mod iso_timestamp {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}
