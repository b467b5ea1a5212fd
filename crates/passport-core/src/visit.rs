use chrono::NaiveDateTime;

use crate::country::Country;

/// One stay in a country.
///
/// Both timestamps are optional; a visit with neither means "been there,
/// dates unknown". Arrival is not required to precede departure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Visit {
    pub country: Country,
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
}

impl Visit {
    pub fn new(
        country: Country,
        arrival: Option<NaiveDateTime>,
        departure: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            country,
            arrival,
            departure,
        }
    }

    /// A visit without dates.
    pub fn undated(country: Country) -> Self {
        Self::new(country, None, None)
    }

    pub fn is_dated(&self) -> bool {
        self.arrival.is_some() || self.departure.is_some()
    }
}

impl std::fmt::Display for Visit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.country.country_code)?;
        if !self.is_dated() {
            return Ok(());
        }
        write!(
            f,
            " [{} .. {}]",
            self.arrival.map(|t| t.to_string()).unwrap_or_default(),
            self.departure.map(|t| t.to_string()).unwrap_or_default()
        )
    }
}
