use serde::{Deserialize, Deserializer, Serialize};

/// A single country and its reference metadata.
///
/// Countries are plain values: two `Country` instances are equal when every
/// field matches. The code is normalised to upper case so that `"no"` and
/// `"NO"` name the same country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(deserialize_with = "upper_case_code")]
    pub country_code: String,
    #[serde(alias = "name")]
    pub short_name: String,
    #[serde(alias = "longname")]
    pub long_name: String,
    pub sovereignty: String,
    pub region: String,
    pub population: u64,
}

impl Country {
    pub fn new(
        country_code: impl AsRef<str>,
        short_name: impl Into<String>,
        long_name: impl Into<String>,
        sovereignty: impl Into<String>,
        region: impl Into<String>,
        population: u64,
    ) -> Self {
        Self {
            country_code: normalize_code(country_code.as_ref()),
            short_name: short_name.into(),
            long_name: long_name.into(),
            sovereignty: sovereignty.into(),
            region: region.into(),
            population,
        }
    }

    /// Shorthand for tests and ad-hoc lookups: long name and sovereignty
    /// default to the short name, region and population are left empty.
    pub fn named(country_code: impl AsRef<str>, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self::new(
            country_code,
            short_name.clone(),
            short_name.clone(),
            short_name,
            "",
            0,
        )
    }

    /// Case-folded short name, used as the name index key in a world.
    pub(crate) fn name_key(&self) -> String {
        fold_name(&self.short_name)
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.short_name, self.country_code)
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub(crate) fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn upper_case_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?;
    Ok(normalize_code(&code))
}
