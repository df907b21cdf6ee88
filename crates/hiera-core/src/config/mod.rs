//! Resolver configuration
//!
//! A YAML document declaring backends and key bindings, loaded from an
//! explicit path or the user-level location (`~/.config/hiera/hiera.yaml`).

mod file;

pub use file::{BackendConfig, BackendKind, ConfigError, ConfigResult, HieraConfig};
