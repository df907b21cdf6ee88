//! Hiera Core
//!
//! Hierarchical key lookup across prioritized backends.
//! A key is resolved by expanding each backend's level templates with the
//! caller's facts and consulting the levels from most to least specific,
//! either stopping at the first match or deep-merging every match.
//!
//! ## Resolution
//!
//! ```rust
//! use std::sync::Arc;
//! use hiera_core::{Facts, Hiera, MemoryBackend, Value};
//!
//! let hiera = Hiera::new();
//! let backend = Arc::new(MemoryBackend::new(
//!     "memory",
//!     1,
//!     ["environment/{environment}", "common"],
//! ));
//! backend.insert("common", "db_host", Value::from("A"));
//! backend.insert("environment/prod", "db_host", Value::from("B"));
//! hiera.add_backend(backend).unwrap();
//! hiera.add_key("db_host", "SimpleString").unwrap();
//!
//! let prod = Facts::from([("environment".to_string(), "prod".to_string())]);
//! let qa = Facts::from([("environment".to_string(), "qa".to_string())]);
//! assert_eq!(hiera.resolve_blocking("db_host", &prod, false).unwrap().data, Value::from("B"));
//! assert_eq!(hiera.resolve_blocking("db_host", &qa, false).unwrap().data, Value::from("A"));
//! ```

pub mod value;
pub mod error;
pub mod level;
pub mod merge;
pub mod schema;
pub mod keys;
pub mod backend;
pub mod types;
pub mod logging;
pub mod config;
pub mod resolver;

// Re-export commonly used types
pub use value::{Map, Set, Value};
pub use error::{ErrorKind, HieraError, HieraResult};
pub use level::{expand_hierarchy, expand_level, Facts};
pub use merge::{deep_merge, deep_merge_all};

pub use types::{CancellationToken, LevelData, ResolvedValue};

pub use schema::{Schema, SchemaError, SchemaRegistry, TypedSchema};

pub use backend::{Backend, BackendError, BackendRegistry, MemoryBackend, YamlBackend};

pub use logging::{ConsoleLogger, Logger, NoOpLogger, SharedLogger};

pub use config::{ConfigError, HieraConfig};

pub use resolver::Hiera;
