use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::collector::CountryCollector;

/// Progress within one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionProgress {
    pub region: String,
    pub visited: usize,
    pub total: usize,
    pub percent: f64,
}

/// Derived counts and percentages for a collector against its world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub countries_visited: usize,
    pub countries_total: usize,
    pub percent_visited: f64,
    pub population_visited: u64,
    pub percent_population: f64,
    pub regions: Vec<RegionProgress>,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

impl Statistics {
    pub fn of(collector: &CountryCollector) -> Self {
        let world = collector.world();
        let visited = collector.visited_countries();
        let visited_codes: HashSet<&str> =
            visited.iter().map(|c| c.country_code.as_str()).collect();

        let population_visited: u64 = visited.iter().map(|c| c.population).sum();

        let mut per_region: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for country in world.countries() {
            let entry = per_region.entry(country.region.as_str()).or_default();
            entry.1 += 1;
            if visited_codes.contains(country.country_code.as_str()) {
                entry.0 += 1;
            }
        }

        let regions = per_region
            .into_iter()
            .map(|(region, (visited, total))| RegionProgress {
                region: region.to_string(),
                visited,
                total,
                percent: percent(visited as f64, total as f64),
            })
            .collect();

        Self {
            countries_visited: visited.len(),
            countries_total: world.len(),
            percent_visited: percent(visited.len() as f64, world.len() as f64),
            population_visited,
            percent_population: percent(
                population_visited as f64,
                world.total_population() as f64,
            ),
            regions,
        }
    }

    pub fn region(&self, region: &str) -> Option<&RegionProgress> {
        self.regions.iter().find(|r| r.region == region)
    }
}

/// Milestones earned from [`Statistics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "badge", content = "region")]
pub enum Badge {
    /// At least one country visited.
    FirstSteps,
    /// At least ten countries.
    Explorer,
    /// A quarter of the world's countries.
    Globetrotter,
    /// Every country of a region.
    ContinentComplete(String),
    /// Countries holding half the world's population.
    HalfTheWorldsPeople,
}

const EXPLORER_COUNT: usize = 10;
const GLOBETROTTER_PERCENT: f64 = 25.0;
const HALF_POPULATION_PERCENT: f64 = 50.0;

impl Badge {
    pub fn earned(stats: &Statistics) -> Vec<Badge> {
        let mut badges = Vec::new();

        if stats.countries_visited >= 1 {
            badges.push(Badge::FirstSteps);
        }
        if stats.countries_visited >= EXPLORER_COUNT {
            badges.push(Badge::Explorer);
        }
        if stats.countries_total > 0 && stats.percent_visited >= GLOBETROTTER_PERCENT {
            badges.push(Badge::Globetrotter);
        }
        for region in &stats.regions {
            if region.total > 0 && region.visited == region.total {
                badges.push(Badge::ContinentComplete(region.region.clone()));
            }
        }
        if stats.percent_population >= HALF_POPULATION_PERCENT {
            badges.push(Badge::HalfTheWorldsPeople);
        }

        badges
    }
}
