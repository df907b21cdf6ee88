//! Backend abstractions and implementations
//!
//! - `Backend` trait for plugging in data sources
//! - Built-in implementations: `MemoryBackend`, `YamlBackend`
//! - `BackendRegistry` enforcing unique identifiers and priorities

mod traits;
mod memory;
mod yaml;
mod registry;

pub use traits::{Backend, BackendError, BackendResult};
pub use memory::MemoryBackend;
pub use yaml::YamlBackend;
pub use registry::{BackendRegistry, OrderedBackends};
