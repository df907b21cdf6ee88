//! Schema contract and registry
//!
//! - `Schema` trait validating raw values into normalized data
//! - Built-in scalar, map and serde-typed schemas
//! - `SchemaRegistry` for looking schemas up by name

mod traits;
mod builtin;
mod registry;

pub use traits::{Schema, SchemaError, SchemaResult};
pub use builtin::{
    AnySchema, BoolSchema, DictSchema, FloatSchema, IntSchema, StringSchema, TypedSchema,
};
pub use registry::SchemaRegistry;
