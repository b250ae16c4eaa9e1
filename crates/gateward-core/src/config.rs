//! Configuration for the cache and storage backends.
//!
//! All types deserialize with serde and fill missing fields from defaults,
//! so a partial TOML/JSON section is enough.
//!
//! # Example (TOML)
//!
//! ```toml
//! [cache]
//! ttl_floor = "5m"
//! ttl_ceiling = "10m"
//!
//! [database]
//! url = "postgres://localhost/gateward"
//! max_connections = 16
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cache behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable/disable entity caching entirely.
    pub enabled: bool,

    /// Lower bound of the randomized TTL window.
    #[serde(with = "humantime_serde")]
    pub ttl_floor: Duration,

    /// Upper bound of the randomized TTL window.
    #[serde(with = "humantime_serde")]
    pub ttl_ceiling: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_floor: Duration::from_secs(300),
            ttl_ceiling: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    /// Validate window bounds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the floor is zero or exceeds the ceiling.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_floor.is_zero() {
            return Err(Error::invalid_input("cache ttl_floor must be positive"));
        }
        if self.ttl_floor > self.ttl_ceiling {
            return Err(Error::invalid_input(format!(
                "cache ttl_floor ({:?}) exceeds ttl_ceiling ({:?})",
                self.ttl_floor, self.ttl_ceiling
            )));
        }
        Ok(())
    }
}

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,

    /// Maximum pool size.
    pub max_connections: u32,

    /// How long to wait for a connection before failing.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/gateward".to_string(),
            max_connections: 16,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL.
    pub url: String,

    /// Key prefix for namespacing when the instance is shared.
    ///
    /// Each entity kind gets its own namespace, e.g. `"gateward:scope:"`.
    pub key_prefix: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: None,
        }
    }
}
