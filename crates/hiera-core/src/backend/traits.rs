//! Backend trait

use async_trait::async_trait;
use thiserror::Error;

use crate::types::LevelData;
use crate::value::Value;

/// Hierarchy-aware data source and sink
///
/// A backend owns a fixed, most-specific-first list of level templates. The
/// resolver expands those templates against the caller's facts and asks the
/// backend for matches; the backend only ever sees concrete levels.
///
/// Implementations:
/// - `MemoryBackend`: In-memory, for tests and ephemeral data
/// - `YamlBackend`: One YAML document per level under a base directory
///
/// Backends that do blocking work can implement the async methods without
/// awaiting anything; the resolver drives both kinds the same way.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Unique identifier within a registry
    fn identifier(&self) -> &str;

    /// Lookup precedence; lower numbers are consulted first
    fn priority(&self) -> i64;

    /// Level templates, most specific first
    fn hierarchy(&self) -> &[String];

    /// Return every level in `levels` holding data for `key`, in the order given
    async fn read(&self, key: &str, levels: &[String]) -> BackendResult<Vec<LevelData>>;

    /// Persist `value` for `key` at a concrete level
    async fn write(&self, key: &str, value: &Value, level: &str) -> BackendResult<()>;
}

/// Errors reported by backends
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend is read-only")]
    ReadOnly,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML in {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Backend error: {0}")]
    Other(String),
}

pub type BackendResult<T> = Result<T, BackendError>;
