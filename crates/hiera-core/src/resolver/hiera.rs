//! Hierarchical key resolution across prioritized backends
//!
//! Two lookup strategies are offered:
//! - `resolve`: first match wins. Backends are consulted in ascending
//!   priority order and the first backend reporting any level stops the
//!   search; its most specific level is the answer.
//! - `resolve_merge`: every level of every backend contributes. Contributions
//!   are deep-merged from least to most precedent, so more specific levels and
//!   higher-priority backends win conflicts.
//!
//! Both strategies validate through the key's schema and can attach the
//! contributing levels as provenance.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, Either};

use crate::backend::{Backend, BackendRegistry};
use crate::error::{HieraError, HieraResult};
use crate::keys::KeyRegistry;
use crate::level::{expand_hierarchy, expand_level, Facts};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::merge::deep_merge_all;
use crate::schema::{Schema, SchemaRegistry};
use crate::types::{CancellationToken, LevelData, ResolvedValue};
use crate::value::Value;
use crate::{log_debug, log_info};

/// Resolver owning the key and backend registries
///
/// Registries are internally synchronized, so a `Hiera` can be shared behind
/// an `Arc` and mutated while lookups run; each lookup works on a consistent
/// snapshot of the backend order.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hiera_core::{Hiera, Facts, Value};
/// use hiera_core::backend::MemoryBackend;
///
/// # futures::executor::block_on(async {
/// let hiera = Hiera::new();
/// hiera.add_backend(Arc::new(MemoryBackend::new(
///     "memory",
///     1,
///     ["env/{environment}", "common"],
/// ))).unwrap();
/// hiera.add_key("db_host", "SimpleString").unwrap();
///
/// hiera.write("memory", "db_host", &Value::from("A"), "common", &Facts::new()).await.unwrap();
///
/// let facts = Facts::from([("environment".to_string(), "prod".to_string())]);
/// let resolved = hiera.resolve("db_host", &facts, true).await.unwrap();
/// assert_eq!(resolved.data, Value::from("A"));
/// # });
/// ```
pub struct Hiera {
    schemas: Arc<SchemaRegistry>,
    keys: KeyRegistry,
    backends: BackendRegistry,
    logger: SharedLogger,
}

impl Default for Hiera {
    fn default() -> Self {
        Self::new()
    }
}

impl Hiera {
    /// Create a resolver with its own registry of built-in schemas
    pub fn new() -> Self {
        Self::with_schemas(Arc::new(SchemaRegistry::with_builtins()))
    }

    /// Create a resolver using a caller-owned schema registry
    pub fn with_schemas(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            schemas,
            keys: KeyRegistry::new(),
            backends: BackendRegistry::new(),
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Set the logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    /// Registered key names, sorted
    pub fn keys(&self) -> Vec<String> {
        self.keys.names()
    }

    /// Registered backend identifiers in lookup order
    pub fn backends(&self) -> Vec<String> {
        self.backends.identifiers()
    }

    // ========== Registration ==========

    pub fn register_schema(&self, name: &str, schema: Arc<dyn Schema>) {
        self.schemas.register(name, schema);
        log_info!(self.logger, "Added key model: {}", name);
    }

    pub fn unregister_schema(&self, name: &str) -> HieraResult<()> {
        self.schemas.unregister(name)?;
        log_info!(self.logger, "Deleted key model: {}", name);
        Ok(())
    }

    pub fn add_backend(&self, backend: Arc<dyn Backend>) -> HieraResult<()> {
        let identifier = backend.identifier().to_string();
        let priority = backend.priority();
        self.backends.add(backend)?;
        log_info!(
            self.logger,
            "Added backend: {} (priority={})",
            identifier,
            priority
        );
        Ok(())
    }

    pub fn remove_backend(&self, identifier: &str) -> HieraResult<()> {
        self.backends.remove(identifier)?;
        log_info!(self.logger, "Deleted backend: {}", identifier);
        Ok(())
    }

    pub fn add_key(&self, key: &str, schema_name: &str) -> HieraResult<()> {
        self.keys.add(key, schema_name, &self.schemas)?;
        log_info!(self.logger, "Added key: {} (model: {})", key, schema_name);
        Ok(())
    }

    pub fn remove_key(&self, key: &str) -> HieraResult<()> {
        self.keys.delete(key)?;
        log_info!(self.logger, "Deleted key: {}", key);
        Ok(())
    }

    /// Validate raw data against a key's schema
    pub fn validate(
        &self,
        key: &str,
        raw: &Value,
        sources: Option<Vec<LevelData>>,
    ) -> HieraResult<ResolvedValue> {
        self.keys.validate(key, raw, sources)
    }

    // ========== Data ==========

    /// Store data for a key in one backend
    ///
    /// `level` must be one of the backend's hierarchy templates; it is
    /// expanded with `facts` and the validated, normalized data is written
    /// there.
    pub async fn write(
        &self,
        backend_identifier: &str,
        key: &str,
        raw: &Value,
        level: &str,
        facts: &Facts,
    ) -> HieraResult<()> {
        let validated = self.keys.validate(key, raw, None)?;
        let backend = self.backends.get(backend_identifier)?;
        if !backend.hierarchy().iter().any(|template| template == level) {
            return Err(HieraError::UnknownLevel {
                backend: backend_identifier.to_string(),
                level: level.to_string(),
            });
        }
        let concrete = expand_level(level, facts)?;

        backend
            .write(key, &validated.data, &concrete)
            .await
            .map_err(|e| HieraError::backend(backend_identifier, key, e))?;
        log_debug!(
            self.logger,
            "Wrote key '{}' to backend '{}' at {}",
            key,
            backend_identifier,
            concrete
        );
        Ok(())
    }

    /// First-match lookup
    pub async fn resolve(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
    ) -> HieraResult<ResolvedValue> {
        self.resolve_cancellable(key, facts, include_sources, &CancellationToken::new())
            .await
    }

    /// First-match lookup that stops with [`HieraError::Cancelled`] once
    /// `cancel` fires
    pub async fn resolve_cancellable(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
        cancel: &CancellationToken,
    ) -> HieraResult<ResolvedValue> {
        self.ensure_key(key)?;

        let backends = self.backends.ordered();
        for backend in backends.iter() {
            // Expanded per backend, so a backend never consulted needs no facts
            let levels = expand_hierarchy(backend.hierarchy(), facts)?;
            let found = until_cancelled(cancel, read_backend(backend, key, &levels)).await?;
            // The backend reports levels most specific first
            if let Some(first) = found.into_iter().next() {
                log_debug!(
                    self.logger,
                    "Resolved key '{}' from backend '{}' at {}",
                    key,
                    first.identifier,
                    first.level
                );
                let raw = first.data.clone();
                let sources = include_sources.then(|| vec![first]);
                return self.keys.validate(key, &raw, sources);
            }
        }

        Err(HieraError::NoData(key.to_string()))
    }

    /// Merge-all lookup
    pub async fn resolve_merge(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
    ) -> HieraResult<ResolvedValue> {
        self.resolve_merge_cancellable(key, facts, include_sources, &CancellationToken::new())
            .await
    }

    /// Merge-all lookup that stops with [`HieraError::Cancelled`] once
    /// `cancel` fires
    ///
    /// All backends are read concurrently; nothing is merged until every
    /// read has returned.
    pub async fn resolve_merge_cancellable(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
        cancel: &CancellationToken,
    ) -> HieraResult<ResolvedValue> {
        self.ensure_key(key)?;

        let backends = self.backends.ordered();
        let plan = expand_all(&backends, facts)?;
        let reads = backends
            .iter()
            .zip(&plan)
            .map(|(backend, levels)| read_backend(backend, key, levels));
        let per_backend = until_cancelled(cancel, future::try_join_all(reads)).await?;

        // Discovery order: backend priority, then level specificity
        let mut contributions = Vec::new();
        for point in per_backend.into_iter().flatten() {
            if !point.data.is_map() {
                return Err(merge_type_error(key, &point, point.data.type_name()));
            }
            let normalized = self.keys.validate(key, &point.data, None)?.into_data();
            if !normalized.is_map() {
                return Err(merge_type_error(key, &point, normalized.type_name()));
            }
            contributions.push(LevelData {
                data: normalized,
                ..point
            });
        }

        if contributions.is_empty() {
            return Err(HieraError::NoData(key.to_string()));
        }

        let merged = deep_merge_all(
            contributions
                .iter()
                .rev()
                .filter_map(|point| point.data.as_map()),
        );
        log_debug!(
            self.logger,
            "Merged key '{}' from {} level(s)",
            key,
            contributions.len()
        );

        let sources = include_sources.then_some(contributions);
        self.keys.validate(key, &Value::Map(merged), sources)
    }

    // ========== Blocking wrappers ==========

    /// [`write`](Self::write) for synchronous callers
    pub fn write_blocking(
        &self,
        backend_identifier: &str,
        key: &str,
        raw: &Value,
        level: &str,
        facts: &Facts,
    ) -> HieraResult<()> {
        futures::executor::block_on(self.write(backend_identifier, key, raw, level, facts))
    }

    /// [`resolve`](Self::resolve) for synchronous callers
    pub fn resolve_blocking(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
    ) -> HieraResult<ResolvedValue> {
        futures::executor::block_on(self.resolve(key, facts, include_sources))
    }

    /// [`resolve_merge`](Self::resolve_merge) for synchronous callers
    pub fn resolve_merge_blocking(
        &self,
        key: &str,
        facts: &Facts,
        include_sources: bool,
    ) -> HieraResult<ResolvedValue> {
        futures::executor::block_on(self.resolve_merge(key, facts, include_sources))
    }

    // ========== Internals ==========

    fn ensure_key(&self, key: &str) -> HieraResult<()> {
        if self.keys.contains(key) {
            Ok(())
        } else {
            Err(HieraError::KeyNotFound(key.to_string()))
        }
    }
}

impl std::fmt::Debug for Hiera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hiera")
            .field("schemas", &self.schemas)
            .field("keys", &self.keys)
            .field("backends", &self.backends)
            .finish()
    }
}

/// Concrete levels for every backend; any missing fact fails the merge
fn expand_all(backends: &[Arc<dyn Backend>], facts: &Facts) -> HieraResult<Vec<Vec<String>>> {
    backends
        .iter()
        .map(|backend| expand_hierarchy(backend.hierarchy(), facts))
        .collect()
}

async fn read_backend(
    backend: &Arc<dyn Backend>,
    key: &str,
    levels: &[String],
) -> HieraResult<Vec<LevelData>> {
    backend
        .read(key, levels)
        .await
        .map_err(|e| HieraError::backend(backend.identifier(), key, e))
}

fn merge_type_error(key: &str, point: &LevelData, found: &'static str) -> HieraError {
    HieraError::MergeType {
        key: key.to_string(),
        backend: point.identifier.clone(),
        level: point.level.clone(),
        found,
    }
}

/// Drive `work` to completion unless `cancel` fires first; the work future
/// is dropped on cancellation, abandoning any outstanding backend calls.
async fn until_cancelled<F, T>(cancel: &CancellationToken, work: F) -> HieraResult<T>
where
    F: Future<Output = HieraResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(HieraError::Cancelled);
    }
    let work = std::pin::pin!(work);
    let cancelled = std::pin::pin!(cancel.cancelled());
    match future::select(work, cancelled).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(HieraError::Cancelled),
    }
}
