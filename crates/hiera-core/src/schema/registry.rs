//! Named schema table
//!
//! Each [`Hiera`](crate::Hiera) is handed its own registry; nothing is kept
//! in module-level state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::builtin::{AnySchema, BoolSchema, DictSchema, FloatSchema, IntSchema, StringSchema};
use super::traits::Schema;
use crate::error::{HieraError, HieraResult};

/// Registry mapping schema names to schema instances
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hiera_core::schema::{SchemaRegistry, DictSchema};
///
/// let registry = SchemaRegistry::with_builtins();
/// registry.register("Settings", Arc::new(DictSchema));
/// assert!(registry.get("SimpleString").is_ok());
/// assert!(registry.get("Settings").is_ok());
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<dyn Schema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in schemas:
    /// `SimpleString`, `SimpleInt`, `SimpleFloat`, `SimpleBool`, `Dict`, `Any`
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("SimpleString", Arc::new(StringSchema));
        registry.register("SimpleInt", Arc::new(IntSchema));
        registry.register("SimpleFloat", Arc::new(FloatSchema));
        registry.register("SimpleBool", Arc::new(BoolSchema));
        registry.register("Dict", Arc::new(DictSchema));
        registry.register("Any", Arc::new(AnySchema));
        registry
    }

    /// Register a schema, replacing any schema of the same name
    pub fn register(&self, name: impl Into<String>, schema: Arc<dyn Schema>) {
        self.schemas.write().insert(name.into(), schema);
    }

    /// Remove a schema
    ///
    /// Keys already bound to it keep their binding.
    pub fn unregister(&self, name: &str) -> HieraResult<()> {
        self.schemas
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| HieraError::SchemaNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> HieraResult<Arc<dyn Schema>> {
        self.schemas
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HieraError::SchemaNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Registered schema names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Value;

    #[test]
    fn test_builtins_registered() {
        let registry = SchemaRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["Any", "Dict", "SimpleBool", "SimpleFloat", "SimpleInt", "SimpleString"]
        );
        assert!(SchemaRegistry::new().names().is_empty());
    }

    #[test]
    fn test_register_overwrites() {
        let registry = SchemaRegistry::with_builtins();
        registry.register("SimpleInt", Arc::new(StringSchema));
        let schema = registry.get("SimpleInt").unwrap();
        assert!(schema.validate(&Value::from("text")).is_ok());
    }

    #[test]
    fn test_unregister() {
        let registry = SchemaRegistry::with_builtins();
        registry.unregister("Dict").unwrap();
        assert!(!registry.contains("Dict"));

        let err = registry.unregister("Dict").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("Dict"));
    }

    #[test]
    fn test_get_unknown() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.get("NonExistentModel"),
            Err(HieraError::SchemaNotFound(_))
        ));
    }
}
