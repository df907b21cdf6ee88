//! Schema contract used to validate and normalize key data

use thiserror::Error;

use crate::value::Value;

/// Errors produced when raw data does not fit a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot interpret {value:?} as {expected}")]
    Unparsable {
        expected: &'static str,
        value: String,
    },

    #[error("{0}")]
    Invalid(String),
}

impl SchemaError {
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Validation contract bound to a key
///
/// `validate` either rejects the raw value or returns the normalized,
/// schema-conformant form of it. Normalized data is plain [`Value`] data, so
/// it can be merged and persisted without knowing the schema's Rust type.
///
/// Implementations are stateless and may be shared between keys.
pub trait Schema: Send + Sync {
    /// Human-readable description of the accepted shape
    fn description(&self) -> &str;

    /// Check `raw` and return its normalized form
    fn validate(&self, raw: &Value) -> SchemaResult<Value>;
}
