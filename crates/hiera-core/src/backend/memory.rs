//! In-memory backend

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{Backend, BackendError, BackendResult};
use crate::types::LevelData;
use crate::value::{Map, Value};

/// In-memory backend for testing and ephemeral use
///
/// Data is kept per concrete level and lost when the backend is dropped.
///
/// # Example
///
/// ```
/// use hiera_core::backend::MemoryBackend;
/// use hiera_core::Value;
///
/// let backend = MemoryBackend::new("memory", 1, ["env/{environment}", "common"]);
/// backend.insert("common", "db_host", Value::from("db.internal"));
/// assert_eq!(backend.get("common", "db_host"), Some(Value::from("db.internal")));
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    identifier: String,
    priority: i64,
    hierarchy: Vec<String>,
    read_only: bool,
    levels: RwLock<HashMap<String, Map>>,
}

impl MemoryBackend {
    pub fn new<I, S>(identifier: impl Into<String>, priority: i64, hierarchy: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            priority,
            hierarchy: hierarchy.into_iter().map(Into::into).collect(),
            read_only: false,
            levels: RwLock::new(HashMap::new()),
        }
    }

    /// Reject writes through the [`Backend`] interface
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Store a value directly, bypassing validation (useful for seeding)
    pub fn insert(&self, level: impl Into<String>, key: impl Into<String>, value: Value) {
        self.levels
            .write()
            .entry(level.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Get a stored value
    pub fn get(&self, level: &str, key: &str) -> Option<Value> {
        self.levels
            .read()
            .get(level)
            .and_then(|data| data.get(key))
            .cloned()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn hierarchy(&self) -> &[String] {
        &self.hierarchy
    }

    async fn read(&self, key: &str, levels: &[String]) -> BackendResult<Vec<LevelData>> {
        let stored = self.levels.read();
        Ok(levels
            .iter()
            .filter_map(|level| {
                let data = stored.get(level)?.get(key)?;
                Some(LevelData::new(
                    &self.identifier,
                    self.priority,
                    level,
                    key,
                    data.clone(),
                ))
            })
            .collect())
    }

    async fn write(&self, key: &str, value: &Value, level: &str) -> BackendResult<()> {
        if self.read_only {
            return Err(BackendError::ReadOnly);
        }
        self.insert(level, key, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_read_follows_level_order() {
        let backend = MemoryBackend::new("mem", 1, ["env/{e}", "common"]);
        backend.insert("common", "timeout", Value::Int(30));
        backend.insert("env/prod", "timeout", Value::Int(60));

        let found = backend
            .read("timeout", &levels(&["env/prod", "common"]))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].level, "env/prod");
        assert_eq!(found[0].data, Value::Int(60));
        assert_eq!(found[1].level, "common");
        assert_eq!(found[1].identifier, "mem");
        assert_eq!(found[1].priority, 1);

        let none = backend
            .read("timeout", &levels(&["env/qa"]))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_write_and_read_only() {
        let backend = MemoryBackend::new("mem", 1, ["common"]);
        backend.write("k", &Value::from("v"), "common").await.unwrap();
        assert_eq!(backend.get("common", "k"), Some(Value::from("v")));

        let frozen = MemoryBackend::new("frozen", 2, ["common"]).read_only();
        assert!(matches!(
            frozen.write("k", &Value::from("v"), "common").await,
            Err(BackendError::ReadOnly)
        ));
    }
}
