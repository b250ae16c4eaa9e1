//! Error taxonomy for the data access layer.
//!
//! Callers receive exactly one of three outcomes from any repository
//! operation: the value, a `NotFound`, or a dependency failure. A cache miss
//! is never surfaced here; the cache crate keeps its own error type and the
//! repositories translate misses into store fallbacks.

/// Errors that can occur during data access operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store query matched zero rows.
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up.
        message: String,
    },

    /// A record with the same key already exists.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting write.
        message: String,
    },

    /// The relational store returned an error other than "no rows".
    #[error("Database error: {message}")]
    Database {
        /// Backend error description.
        message: String,
    },

    /// The cache adapter failed with something other than a miss.
    ///
    /// The cache is a performance optimization, but a broken optimization
    /// layer is still a dependency failure and callers must be told.
    #[error("Cache backend error: {message}")]
    CacheBackend {
        /// Backend error description.
        message: String,
    },

    /// Encoding or decoding a cached snapshot failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller passed something the layer cannot work with.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input.
        message: String,
    },
}

impl Error {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a `Database` error.
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create a `CacheBackend` error.
    #[must_use]
    pub fn cache_backend(message: impl Into<String>) -> Self {
        Self::CacheBackend {
            message: message.into(),
        }
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if a backing service failed (store, cache, or codec).
    #[must_use]
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::Database { .. } | Self::CacheBackend { .. } | Self::Serialization(_)
        )
    }
}

/// Result type for data access operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicates() {
        let err = Error::not_found("Resource 42");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(!err.is_dependency_failure());
        assert_eq!(err.to_string(), "Not found: Resource 42");
    }

    #[test]
    fn test_conflict_predicates() {
        let err = Error::conflict("scope 'read' already exists");
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert!(!err.is_dependency_failure());
    }

    #[test]
    fn test_dependency_failures() {
        assert!(Error::database("connection reset").is_dependency_failure());
        assert!(Error::cache_backend("timeout").is_dependency_failure());

        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(Error::from(json_err).is_dependency_failure());
    }
}
