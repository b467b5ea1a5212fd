use serde::Serialize;

use crate::error::ValidationError;

pub const MAX_USERNAME_LEN: usize = 64;

/// A validated, lower-cased username. Safe to use as a file name or key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Trim, lower-case, then require 1..=64 ASCII alphanumeric characters.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim().to_lowercase();

        if name.is_empty() {
            return Err(ValidationError::InvalidUsername(
                "username cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_USERNAME_LEN {
            return Err(ValidationError::InvalidUsername(format!(
                "username too long: {} chars (max {})",
                name.len(),
                MAX_USERNAME_LEN
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidUsername(format!(
                "username contains invalid characters: {}",
                raw
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
