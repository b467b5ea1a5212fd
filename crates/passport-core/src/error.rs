use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Raised while building a [`crate::World`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("Duplicate country code: {0}")]
    DuplicateCode(String),

    #[error("Duplicate country name: {0}")]
    DuplicateName(String),
}

impl WorldError {
    /// Both variants are duplicate-identifier failures; kept as a single check
    /// for callers that don't care which field collided.
    pub fn is_duplicate_identifier(&self) -> bool {
        matches!(
            self,
            WorldError::DuplicateCode(_) | WorldError::DuplicateName(_)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    #[error("Unknown country: {0} is not part of this world")]
    UnknownCountry(String),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document has no embedded world and none was supplied")]
    MissingWorld,

    #[error("Invalid embedded world: {0}")]
    World(#[from] WorldError),

    #[error("Unknown country code in visit: {0}")]
    UnknownCountryCode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Collector not found: {0}")]
    NotFound(String),

    #[error("Name already taken: {0}")]
    NameTaken(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}
