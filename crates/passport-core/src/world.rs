use std::collections::{BTreeSet, HashMap};

use crate::country::{fold_name, normalize_code, Country};
use crate::error::WorldError;

/// An immutable, validated catalog of countries.
///
/// No two countries in a world share a country code or a (case-folded)
/// short name. This is checked once in [`World::new`]; afterwards the world
/// is read-only and is shared between collectors through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    name: Option<String>,
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl World {
    /// Country codes are normalised to upper case on the way in, so codes
    /// that differ only in case count as duplicates.
    pub fn new(name: Option<String>, mut countries: Vec<Country>) -> Result<Self, WorldError> {
        let mut by_code = HashMap::with_capacity(countries.len());
        let mut by_name = HashMap::with_capacity(countries.len());

        for (index, country) in countries.iter_mut().enumerate() {
            country.country_code = normalize_code(&country.country_code);
            if by_code.insert(country.country_code.clone(), index).is_some() {
                return Err(WorldError::DuplicateCode(country.country_code.clone()));
            }
            if by_name.insert(country.name_key(), index).is_some() {
                return Err(WorldError::DuplicateName(country.short_name.clone()));
            }
        }

        Ok(Self {
            name,
            countries,
            by_code,
            by_name,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Look up a country by its code. Case-insensitive.
    pub fn country_by_code(&self, code: &str) -> Option<&Country> {
        self.by_code
            .get(&normalize_code(code))
            .map(|&i| &self.countries[i])
    }

    /// Look up a country by its short name. Case-insensitive.
    pub fn country_by_name(&self, name: &str) -> Option<&Country> {
        self.by_name
            .get(&fold_name(name))
            .map(|&i| &self.countries[i])
    }

    /// All countries, in the order the world was built from.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// True if this world has a member with the same code that is equal to
    /// `country` in every field.
    pub fn contains(&self, country: &Country) -> bool {
        self.country_by_code(&country.country_code)
            .is_some_and(|member| member == country)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn total_population(&self) -> u64 {
        self.countries.iter().map(|c| c.population).sum()
    }

    /// Distinct region codes, sorted.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.countries.iter().map(|c| c.region.as_str()).collect()
    }

    pub fn countries_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a Country> {
        self.countries.iter().filter(move |c| c.region == region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nordics() -> Vec<Country> {
        vec![
            Country::new("NO", "Norway", "Kingdom of Norway", "Norway", "EU", 5_400_000),
            Country::new("SE", "Sweden", "Kingdom of Sweden", "Sweden", "EU", 10_500_000),
            Country::new("GL", "Greenland", "Greenland", "Denmark", "NA", 56_000),
        ]
    }

    #[test]
    fn test_new_world_keeps_all_countries() {
        let world = World::new(Some("nordics".to_string()), nordics()).unwrap();

        assert_eq!(world.len(), 3);
        assert_eq!(world.countries().len(), 3);
        assert_eq!(world.name(), Some("nordics"));
    }

    #[test]
    fn test_duplicate_code_differing_in_case() {
        let lower = Country {
            country_code: "no".to_string(),
            ..Country::named("NO", "Norway")
        };
        let err = World::new(None, vec![lower, Country::named("NO", "Noreg")]).unwrap_err();
        assert_eq!(err, WorldError::DuplicateCode("NO".to_string()));
    }

    #[test]
    fn test_unnormalised_code_is_reachable() {
        let lower = Country {
            country_code: " se".to_string(),
            ..Country::named("SE", "Sweden")
        };
        let world = World::new(None, vec![lower]).unwrap();

        let member = &world.countries()[0];
        assert_eq!(member.country_code, "SE");
        assert!(world.contains(member));
        assert_eq!(world.country_by_code("se"), Some(member));
    }

    #[test]
    fn test_empty_world() {
        let world = World::new(None, Vec::new()).unwrap();
        assert!(world.is_empty());
        assert_eq!(world.name(), None);
        assert_eq!(world.total_population(), 0);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut countries = nordics();
        countries.push(Country::named("no", "Noreg"));

        let err = World::new(None, countries).unwrap_err();
        assert_eq!(err, WorldError::DuplicateCode("NO".to_string()));
        assert!(err.is_duplicate_identifier());
    }

    #[test]
    fn test_duplicate_name_rejected_case_folded() {
        let mut countries = nordics();
        countries.push(Country::named("XS", "SWEDEN"));

        let err = World::new(None, countries).unwrap_err();
        assert_eq!(err, WorldError::DuplicateName("SWEDEN".to_string()));
        assert!(err.is_duplicate_identifier());
    }

    #[test]
    fn test_lookup_by_code_and_name() {
        let world = World::new(None, nordics()).unwrap();

        assert_eq!(world.country_by_code("se").unwrap().short_name, "Sweden");
        assert_eq!(world.country_by_name("norway").unwrap().country_code, "NO");
        assert!(world.country_by_code("DK").is_none());
        assert!(world.country_by_name("Denmark").is_none());
    }

    #[test]
    fn test_contains_compares_by_value() {
        let world = World::new(None, nordics()).unwrap();

        let norway = world.country_by_code("NO").unwrap().clone();
        assert!(world.contains(&norway));

        // Same code, different metadata: not a member.
        assert!(!world.contains(&Country::named("NO", "Norway")));
        assert!(!world.contains(&Country::named("DK", "Denmark")));
    }

    #[test]
    fn test_regions_and_population() {
        let world = World::new(None, nordics()).unwrap();

        let regions: Vec<&str> = world.regions().into_iter().collect();
        assert_eq!(regions, vec!["EU", "NA"]);
        assert_eq!(world.countries_in_region("EU").count(), 2);
        assert_eq!(world.total_population(), 15_956_000);
    }
}
