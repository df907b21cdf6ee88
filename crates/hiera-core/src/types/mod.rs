//! Shared types for lookups
//!
//! This module contains the result types and the cancellation token used
//! across backends and the resolver.

mod resolved;
mod cancellation;

pub use resolved::{LevelData, ResolvedValue};
pub use cancellation::CancellationToken;
