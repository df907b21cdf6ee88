//! Backend registry with unique identifiers and priorities

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::traits::Backend;
use crate::error::{HieraError, HieraResult};

/// Priority-ordered view handed out to lookups
pub type OrderedBackends = Arc<Vec<Arc<dyn Backend>>>;

#[derive(Default)]
struct BackendTable {
    by_identifier: HashMap<String, Arc<dyn Backend>>,
    ordered: OrderedBackends,
}

impl BackendTable {
    fn rebuild(&mut self) {
        let mut ordered: Vec<Arc<dyn Backend>> = self.by_identifier.values().cloned().collect();
        ordered.sort_by_key(|backend| backend.priority());
        self.ordered = Arc::new(ordered);
    }
}

/// Registry of backends
///
/// Identifiers and priorities are both unique. The priority-ascending order
/// is rebuilt on every mutation and handed out as an immutable snapshot, so
/// a lookup in progress never observes a half-applied change.
#[derive(Default)]
pub struct BackendRegistry {
    table: RwLock<BackendTable>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend
    ///
    /// Fails without changing the registry when the identifier or the
    /// priority is already taken.
    pub fn add(&self, backend: Arc<dyn Backend>) -> HieraResult<()> {
        let mut table = self.table.write();
        let identifier = backend.identifier().to_string();

        if table.by_identifier.contains_key(&identifier) {
            return Err(HieraError::BackendExists(identifier));
        }
        if let Some(existing) = table
            .by_identifier
            .values()
            .find(|b| b.priority() == backend.priority())
        {
            return Err(HieraError::PriorityConflict {
                identifier,
                priority: backend.priority(),
                existing: existing.identifier().to_string(),
            });
        }

        table.by_identifier.insert(identifier, backend);
        table.rebuild();
        Ok(())
    }

    /// Remove a backend, returning it
    pub fn remove(&self, identifier: &str) -> HieraResult<Arc<dyn Backend>> {
        let mut table = self.table.write();
        let backend = table
            .by_identifier
            .remove(identifier)
            .ok_or_else(|| HieraError::BackendNotFound(identifier.to_string()))?;
        table.rebuild();
        Ok(backend)
    }

    pub fn get(&self, identifier: &str) -> HieraResult<Arc<dyn Backend>> {
        self.table
            .read()
            .by_identifier
            .get(identifier)
            .cloned()
            .ok_or_else(|| HieraError::BackendNotFound(identifier.to_string()))
    }

    /// Backends sorted by ascending priority
    pub fn ordered(&self) -> OrderedBackends {
        Arc::clone(&self.table.read().ordered)
    }

    /// Identifiers in priority order
    pub fn identifiers(&self) -> Vec<String> {
        self.ordered()
            .iter()
            .map(|b| b.identifier().to_string())
            .collect()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.identifiers())
            .finish()
    }
}
