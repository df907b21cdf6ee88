//! File-based resolver configuration (YAML)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, MemoryBackend, YamlBackend};
use crate::error::{ErrorKind, HieraResult};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::resolver::Hiera;
use crate::schema::SchemaRegistry;
use crate::value::Map;

/// Errors that can occur while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure
///
/// # Example
///
/// ```
/// use hiera_core::config::HieraConfig;
///
/// let config = HieraConfig::from_yaml_str(r#"
/// backends:
///   - identifier: yaml
///     priority: 1
///     hierarchy: ["environment/{environment}.yaml", "common.yaml"]
///     type: yaml
///     path: /etc/hiera/data
/// keys:
///   db_host: SimpleString
/// "#).unwrap();
/// assert_eq!(config.backends.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HieraConfig {
    /// Backends in any order; lookup order follows priority
    #[serde(default)]
    pub backends: Vec<BackendConfig>,

    /// Key name to schema name
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// One configured backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub identifier: String,
    pub priority: i64,
    pub hierarchy: Vec<String>,
    #[serde(flatten)]
    pub kind: BackendKind,
}

/// Backend implementation and its settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendKind {
    /// YAML documents under `path`
    Yaml { path: PathBuf },
    /// In-process data, optionally seeded per level
    Memory {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        data: BTreeMap<String, Map>,
    },
}

impl HieraConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration file
    ///
    /// Relative YAML backend paths are taken relative to the directory
    /// holding the file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;

        if let Some(dir) = path.parent() {
            for backend in &mut config.backends {
                if let BackendKind::Yaml { path } = &mut backend.kind {
                    if path.is_relative() {
                        *path = dir.join(&*path);
                    }
                }
            }
        }
        Ok(config)
    }

    /// User-level config path (~/.config/hiera/hiera.yaml)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        config_dir.join("hiera").join("hiera.yaml")
    }

    /// Load the user-level config, or an empty one when it does not exist
    pub fn load_user() -> ConfigResult<Self> {
        let path = Self::user_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Build a resolver, handing `logger` to the resolver and every backend
    pub fn build(&self, schemas: Arc<SchemaRegistry>, logger: SharedLogger) -> HieraResult<Hiera> {
        let hiera = Hiera::with_schemas(schemas).with_logger(logger.clone());

        for backend in &self.backends {
            let built: Arc<dyn Backend> = match &backend.kind {
                BackendKind::Yaml { path } => Arc::new(
                    YamlBackend::new(
                        backend.identifier.as_str(),
                        backend.priority,
                        backend.hierarchy.iter().cloned(),
                        path.clone(),
                    )
                    .with_logger(logger.clone()),
                ),
                BackendKind::Memory { data } => {
                    let memory = MemoryBackend::new(
                        backend.identifier.as_str(),
                        backend.priority,
                        backend.hierarchy.iter().cloned(),
                    );
                    for (level, entries) in data {
                        for (key, value) in entries {
                            memory.insert(level, key, value.clone());
                        }
                    }
                    Arc::new(memory)
                }
            };
            hiera.add_backend(built)?;
        }

        for (key, schema_name) in &self.keys {
            hiera.add_key(key, schema_name)?;
        }
        Ok(hiera)
    }
}

impl Hiera {
    /// Build a resolver from configuration without logging
    pub fn from_config(config: &HieraConfig, schemas: Arc<SchemaRegistry>) -> HieraResult<Self> {
        config.build(schemas, Arc::new(NoOpLogger))
    }
}
