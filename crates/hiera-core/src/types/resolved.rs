//! Lookup results and their provenance

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaError;
use crate::value::Value;

/// One match reported by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Backend that produced the match
    pub identifier: String,
    /// Priority of that backend
    pub priority: i64,
    /// Expanded level the data was found at
    pub level: String,
    /// Key the data belongs to
    pub key: String,
    /// Raw data as stored, or its normalized form once validated
    pub data: Value,
}

impl LevelData {
    pub fn new(
        identifier: impl Into<String>,
        priority: i64,
        level: impl Into<String>,
        key: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            priority,
            level: level.into(),
            key: key.into(),
            data,
        }
    }
}

/// Validated value for a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// Normalized data
    pub data: Value,
    /// Contributing matches, most specific first (when requested)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<LevelData>>,
}

impl ResolvedValue {
    pub fn new(data: Value, sources: Option<Vec<LevelData>>) -> Self {
        Self { data, sources }
    }

    pub fn sources(&self) -> &[LevelData] {
        self.sources.as_deref().unwrap_or(&[])
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Convert the data into a typed value
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, SchemaError> {
        serde_json::from_value(serde_json::Value::from(self.data.clone()))
            .map_err(|e| SchemaError::Invalid(e.to_string()))
    }
}
