use std::net::SocketAddr;
use std::path::PathBuf;

/// Which `CollectorStore` backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file per user under `data_dir`.
    File { data_dir: PathBuf },
    /// A single redb database at `db_path`.
    Redb { db_path: PathBuf },
}

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub storage: StorageBackend,
    /// Write requests allowed per second per client IP.
    pub write_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    /// PASSPORT_STORAGE defaults to "file", storing under "./data/collectors".
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = std::env::var("PASSPORT_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PASSPORT_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let storage = match std::env::var("PASSPORT_STORAGE")
            .unwrap_or_else(|_| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StorageBackend::File {
                data_dir: std::env::var("PASSPORT_DATA_DIR")
                    .unwrap_or_else(|_| "./data/collectors".to_string())
                    .into(),
            },
            "redb" => StorageBackend::Redb {
                db_path: std::env::var("PASSPORT_DB_PATH")
                    .unwrap_or_else(|_| "./passport.redb".to_string())
                    .into(),
            },
            _ => {
                return Err(ConfigError::Invalid(
                    "PASSPORT_STORAGE",
                    "must be either 'file' or 'redb'",
                ))
            }
        };

        let write_limit = match std::env::var("PASSPORT_WRITE_LIMIT") {
            Ok(s) => s.parse::<u32>().ok().filter(|&n| n > 0).ok_or(
                ConfigError::Invalid("PASSPORT_WRITE_LIMIT", "must be a positive integer"),
            )?,
            Err(_) => 5,
        };

        Ok(Config {
            listen_addr,
            storage,
            write_limit,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
