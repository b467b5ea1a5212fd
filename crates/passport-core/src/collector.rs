use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::country::Country;
use crate::error::CollectorError;
use crate::event::{ChangeEvent, Listener, ListenerId, Listeners};
use crate::visit::Visit;
use crate::world::World;

/// A user's record of visits, bound to one world.
///
/// Every visit references a country that is a member of [`Self::world`].
/// All mutation goes through this type; each successful mutation notifies
/// registered listeners before the call returns.
#[derive(Debug)]
pub struct CountryCollector {
    world: Arc<World>,
    visits: Vec<Visit>,
    listeners: Listeners<Visit>,
}

impl CountryCollector {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            visits: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    fn ensure_member(&self, country: &Country) -> Result<(), CollectorError> {
        if self.world.contains(country) {
            Ok(())
        } else {
            Err(CollectorError::UnknownCountry(country.country_code.clone()))
        }
    }

    /// Register a visit with unknown dates.
    pub fn register_country(&mut self, country: &Country) -> Result<bool, CollectorError> {
        self.register_visit(Visit::undated(country.clone()))
    }

    pub fn register_visit_between(
        &mut self,
        country: &Country,
        arrival: Option<NaiveDateTime>,
        departure: Option<NaiveDateTime>,
    ) -> Result<bool, CollectorError> {
        self.register_visit(Visit::new(country.clone(), arrival, departure))
    }

    /// Add a visit. Identical visits are kept as separate entries, so this
    /// returns true whenever the country is a member of the world.
    pub fn register_visit(&mut self, visit: Visit) -> Result<bool, CollectorError> {
        self.ensure_member(&visit.country)?;

        tracing::debug!(visit = %visit, "Registering visit");
        self.visits.push(visit.clone());
        self.listeners.notify(&ChangeEvent::Added(visit));
        Ok(true)
    }

    /// Remove one entry equal to `visit`, if present.
    pub fn remove_visit(&mut self, visit: &Visit) -> Result<bool, CollectorError> {
        self.ensure_member(&visit.country)?;

        let Some(index) = self.visits.iter().position(|v| v == visit) else {
            return Ok(false);
        };

        let removed = self.visits.remove(index);
        tracing::debug!(visit = %removed, "Removed visit");
        self.listeners.notify(&ChangeEvent::Removed(removed));
        Ok(true)
    }

    /// Remove every visit to `country`. Returns how many were removed; one
    /// `Removed` event is emitted per entry.
    pub fn remove_all_visits_to_country(
        &mut self,
        country: &Country,
    ) -> Result<usize, CollectorError> {
        self.ensure_member(country)?;

        let (removed, kept): (Vec<Visit>, Vec<Visit>) = std::mem::take(&mut self.visits)
            .into_iter()
            .partition(|v| &v.country == country);
        self.visits = kept;

        for visit in &removed {
            self.listeners.notify(&ChangeEvent::Removed(visit.clone()));
        }
        Ok(removed.len())
    }

    pub fn is_visited(&self, country: &Country) -> Result<bool, CollectorError> {
        self.ensure_member(country)?;
        Ok(self.visits.iter().any(|v| &v.country == country))
    }

    /// Number of distinct countries visited, not the number of visits.
    pub fn number_of_countries_visited(&self) -> usize {
        self.visits
            .iter()
            .map(|v| v.country.country_code.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Distinct visited countries, in order of first visit.
    ///
    /// The countries are borrowed from the collector and can't be changed
    /// through the returned list:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use passport_core::{Country, CountryCollector, World};
    ///
    /// let world = World::new(None, vec![Country::named("NO", "Norway")]).unwrap();
    /// let mut collector = CountryCollector::new(Arc::new(world));
    /// let norway = collector.world().country_by_code("NO").unwrap().clone();
    /// collector.register_country(&norway).unwrap();
    ///
    /// collector.visited_countries()[0].short_name = "Noreg".to_string();
    /// ```
    pub fn visited_countries(&self) -> Vec<&Country> {
        let mut seen = HashSet::new();
        self.visits
            .iter()
            .map(|v| &v.country)
            .filter(|&c| seen.insert(c.country_code.as_str()))
            .collect()
    }

    /// Every visit in registration order, as a read-only view:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use passport_core::{Country, CountryCollector, Visit, World};
    ///
    /// let world = World::new(None, vec![Country::named("NO", "Norway")]).unwrap();
    /// let collector = CountryCollector::new(Arc::new(world));
    ///
    /// collector.visits().push(Visit::undated(Country::named("NO", "Norway")));
    /// ```
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// All visits to `country`. Unknown countries yield an empty list rather
    /// than an error.
    pub fn visits_to_country(&self, country: &Country) -> Vec<&Visit> {
        self.visits
            .iter()
            .filter(|v| &v.country == country)
            .collect()
    }

    pub fn add_listener(&mut self, listener: impl Listener<Visit> + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Append visits without notifying listeners. Used when rebuilding a
    /// collector from a document; every visit has already been resolved
    /// against `self.world`.
    pub(crate) fn restore(&mut self, visits: Vec<Visit>) {
        debug_assert!(visits.iter().all(|v| self.world.contains(&v.country)));
        self.visits.extend(visits);
    }
}
