//! Key registry
//!
//! Binds key names to schemas. The schema is looked up by name when the key
//! is added; later changes to the schema table do not rebind existing keys.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{HieraError, HieraResult};
use crate::schema::{Schema, SchemaRegistry};
use crate::types::{LevelData, ResolvedValue};
use crate::value::Value;

/// Registry of keys and their schemas
#[derive(Default)]
pub struct KeyRegistry {
    keys: RwLock<HashMap<String, Arc<dyn Schema>>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to the schema registered as `schema_name`, replacing any
    /// previous binding
    pub fn add(&self, key: &str, schema_name: &str, schemas: &SchemaRegistry) -> HieraResult<()> {
        let schema = schemas.get(schema_name)?;
        self.keys.write().insert(key.to_string(), schema);
        Ok(())
    }

    pub fn delete(&self, key: &str) -> HieraResult<()> {
        self.keys
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| HieraError::KeyNotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.read().contains_key(key)
    }

    /// Registered key names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Validate raw data against the key's schema
    ///
    /// Unknown keys fail with [`HieraError::KeyNotFound`]; schema failures are
    /// wrapped in [`HieraError::Validation`] naming the key.
    pub fn validate(
        &self,
        key: &str,
        raw: &Value,
        sources: Option<Vec<LevelData>>,
    ) -> HieraResult<ResolvedValue> {
        let schema = self.schema(key)?;
        let data = schema
            .validate(raw)
            .map_err(|e| HieraError::validation(key, e))?;
        Ok(ResolvedValue::new(data, sources))
    }

    fn schema(&self, key: &str) -> HieraResult<Arc<dyn Schema>> {
        self.keys
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| HieraError::KeyNotFound(key.to_string()))
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("keys", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::StringSchema;

    #[test]
    fn test_add_and_validate() {
        let schemas = SchemaRegistry::with_builtins();
        let keys = KeyRegistry::new();
        keys.add("int_key", "SimpleInt", &schemas).unwrap();

        let resolved = keys.validate("int_key", &Value::from("7"), None).unwrap();
        assert_eq!(resolved.data, Value::Int(7));
        assert!(resolved.sources.is_none());

        let err = keys
            .validate("int_key", &Value::from("not_an_int"), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Invalid data for key int_key"));
    }

    #[test]
    fn test_unknown_schema() {
        let keys = KeyRegistry::new();
        let err = keys
            .add("test", "NonExistentModel", &SchemaRegistry::with_builtins())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid key model NonExistentModel"));
        assert!(!keys.contains("test"));
    }

    #[test]
    fn test_unknown_key_is_distinct_from_validation() {
        let keys = KeyRegistry::new();
        let err = keys
            .validate("nonexistent_key", &Value::Int(1), None)
            .unwrap_err();
        assert!(matches!(err, HieraError::KeyNotFound(_)));
        assert!(err.to_string().contains("Key nonexistent_key not found"));
    }

    #[test]
    fn test_readd_overwrites_binding() {
        let schemas = SchemaRegistry::with_builtins();
        let keys = KeyRegistry::new();
        keys.add("k", "SimpleInt", &schemas).unwrap();
        keys.add("k", "SimpleString", &schemas).unwrap();

        assert!(keys.validate("k", &Value::from("text"), None).is_ok());
        assert!(keys.validate("k", &Value::Int(1), None).is_err());
    }

    #[test]
    fn test_binding_survives_schema_unregister() {
        let schemas = SchemaRegistry::new();
        schemas.register("Text", Arc::new(StringSchema));
        let keys = KeyRegistry::new();
        keys.add("k", "Text", &schemas).unwrap();

        schemas.unregister("Text").unwrap();
        assert!(keys.validate("k", &Value::from("still bound"), None).is_ok());
    }

    #[test]
    fn test_delete() {
        let keys = KeyRegistry::new();
        keys.add("k", "SimpleString", &SchemaRegistry::with_builtins())
            .unwrap();
        keys.delete("k").unwrap();
        assert!(keys.names().is_empty());
        assert!(matches!(keys.delete("k"), Err(HieraError::KeyNotFound(_))));
    }
}
