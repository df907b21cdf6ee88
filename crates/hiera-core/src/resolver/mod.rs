//! Key resolution
//!
//! [`Hiera`] ties the schema, key and backend registries together and
//! answers lookups against them.

mod hiera;

pub use hiera::Hiera;
