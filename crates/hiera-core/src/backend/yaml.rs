//! YAML file backend
//!
//! Every concrete level names a YAML document relative to a base directory,
//! e.g. `environment/prod.yaml`. Each document is a mapping from key to data.
//! Files are small and local, so I/O is done inline.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::traits::{Backend, BackendError, BackendResult};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::types::LevelData;
use crate::value::Value;
use crate::{log_debug, log_warn};

/// Backend storing one YAML document per level
///
/// # Example
///
/// ```no_run
/// use hiera_core::backend::YamlBackend;
///
/// let backend = YamlBackend::new(
///     "yaml",
///     1,
///     ["environment/{environment}.yaml", "common.yaml"],
///     "/etc/hiera/data",
/// );
/// ```
pub struct YamlBackend {
    identifier: String,
    priority: i64,
    hierarchy: Vec<String>,
    base_path: PathBuf,
    logger: SharedLogger,
}

impl YamlBackend {
    pub fn new<I, S>(
        identifier: impl Into<String>,
        priority: i64,
        hierarchy: I,
        base_path: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            priority,
            hierarchy: hierarchy.into_iter().map(Into::into).collect(),
            base_path: base_path.into(),
            logger: std::sync::Arc::new(NoOpLogger),
        }
    }

    /// Use a logger for file-level diagnostics
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File backing a concrete level
    pub fn level_path(&self, level: &str) -> PathBuf {
        self.base_path.join(level)
    }

    /// Load a level document; `None` when the file does not exist
    fn load(&self, path: &Path) -> BackendResult<Option<serde_yaml::Value>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_yaml::from_str(&content).map_err(|e| {
            log_warn!(self.logger, "Invalid YAML in {}: {}", path.display(), e);
            BackendError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Some(document))
    }
}

#[async_trait]
impl Backend for YamlBackend {
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
        let mut found = Vec::new();
        for level in levels {
            let path = self.level_path(level);
            let Some(document) = self.load(&path)? else {
                log_debug!(self.logger, "No document at {}", path.display());
                continue;
            };
            // Documents that are not mappings hold no keys
            let serde_yaml::Value::Mapping(mut mapping) = document else {
                continue;
            };
            if let Some(data) = mapping.remove(key) {
                log_debug!(self.logger, "Found key '{}' in {}", key, path.display());
                found.push(LevelData::new(
                    &self.identifier,
                    self.priority,
                    level,
                    key,
                    Value::from(data),
                ));
            }
        }
        Ok(found)
    }

    async fn write(&self, key: &str, value: &Value, level: &str) -> BackendResult<()> {
        let path = self.level_path(level);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut mapping = match self.load(&path)? {
            Some(serde_yaml::Value::Mapping(mapping)) => mapping,
            _ => serde_yaml::Mapping::new(),
        };
        mapping.insert(
            serde_yaml::Value::String(key.to_string()),
            serde_yaml::Value::from(value.clone()),
        );

        let content = serde_yaml::to_string(&serde_yaml::Value::Mapping(mapping)).map_err(|e| {
            BackendError::Other(format!("Failed to serialize YAML: {}", e))
        })?;
        fs::write(&path, content)?;
        log_debug!(self.logger, "Added data for key '{}' to {}", key, path.display());
        Ok(())
    }
}

impl std::fmt::Debug for YamlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlBackend")
            .field("identifier", &self.identifier)
            .field("priority", &self.priority)
            .field("hierarchy", &self.hierarchy)
            .field("base_path", &self.base_path)
            .finish()
    }
}
