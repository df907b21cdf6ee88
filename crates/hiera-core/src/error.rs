//! Resolver error types

use thiserror::Error;

use crate::backend::BackendError;
use crate::schema::SchemaError;

/// Broad classification of every [`HieraError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Registration conflicts and references to unknown keys, schemas or backends
    Configuration,
    /// A level template needs a fact the caller did not supply
    FactExpansion,
    /// Data does not conform to the key's schema
    Validation,
    /// A merge contributor is not a keyed structure
    MergeType,
    /// The key is known but no backend holds data for it
    NotFound,
    /// Failure reported by a backend, including cancellation
    Backend,
}

/// Errors that can occur while registering, writing or resolving keys
#[derive(Error, Debug)]
pub enum HieraError {
    #[error("Backend with identifier '{0}' already exists")]
    BackendExists(String),

    #[error("Backend '{identifier}' cannot use priority {priority} (already used by '{existing}')")]
    PriorityConflict {
        identifier: String,
        priority: i64,
        existing: String,
    },

    #[error("Backend with identifier {0} not found")]
    BackendNotFound(String),

    #[error("Invalid key model {0}")]
    SchemaNotFound(String),

    #[error("Key {0} not found")]
    KeyNotFound(String),

    #[error("Level {level} not found in hierarchy of backend '{backend}'")]
    UnknownLevel { backend: String, level: String },

    #[error("Malformed level template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("missing fact '{fact}' to expand level {template}")]
    MissingFact { template: String, fact: String },

    #[error("Invalid data for key {key}: {source}")]
    Validation {
        key: String,
        #[source]
        source: SchemaError,
    },

    #[error("Invalid data for key {key} at level {level} of backend '{backend}', expected map, got {found}")]
    MergeType {
        key: String,
        backend: String,
        level: String,
        found: &'static str,
    },

    #[error("No data found for key {0}")]
    NoData(String),

    #[error("Backend '{backend}' failed for key {key}: {source}")]
    Backend {
        backend: String,
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Lookup cancelled")]
    Cancelled,
}

impl HieraError {
    /// Wrap a schema failure for a key
    pub fn validation(key: impl Into<String>, source: SchemaError) -> Self {
        Self::Validation {
            key: key.into(),
            source,
        }
    }

    /// Wrap a backend failure with the backend's identifier and the key
    pub fn backend(
        backend: impl Into<String>,
        key: impl Into<String>,
        source: BackendError,
    ) -> Self {
        Self::Backend {
            backend: backend.into(),
            key: key.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BackendExists(_)
            | Self::PriorityConflict { .. }
            | Self::BackendNotFound(_)
            | Self::SchemaNotFound(_)
            | Self::KeyNotFound(_)
            | Self::UnknownLevel { .. }
            | Self::InvalidTemplate { .. } => ErrorKind::Configuration,
            Self::MissingFact { .. } => ErrorKind::FactExpansion,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::MergeType { .. } => ErrorKind::MergeType,
            Self::NoData(_) => ErrorKind::NotFound,
            Self::Backend { .. } | Self::Cancelled => ErrorKind::Backend,
        }
    }
}

pub type HieraResult<T> = Result<T, HieraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            HieraError::KeyNotFound("db".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(HieraError::NoData("db".into()).kind(), ErrorKind::NotFound);
        assert_eq!(HieraError::Cancelled.kind(), ErrorKind::Backend);
        assert_eq!(
            HieraError::MissingFact {
                template: "env/{environment}.yaml".into(),
                fact: "environment".into(),
            }
            .kind(),
            ErrorKind::FactExpansion
        );
    }

    #[test]
    fn test_messages_name_the_key() {
        let err = HieraError::validation("int_key", SchemaError::type_mismatch("int", "string"));
        assert!(err.to_string().contains("Invalid data for key int_key"));

        let err = HieraError::PriorityConflict {
            identifier: "b".into(),
            priority: 1,
            existing: "a".into(),
        };
        assert!(err.to_string().contains("cannot use priority 1"));

        let err = HieraError::backend("yaml", "db_host", BackendError::ReadOnly);
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("'yaml'"));
        assert!(err.to_string().contains("db_host"));
    }
}
