//! Built-in schemas
//!
//! Scalars accept the loose spellings commonly found in hand-written YAML
//! (`"42"` for an int, `"yes"` for a bool). Structured keys use [`DictSchema`]
//! or a [`TypedSchema`] over a serde type.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::{Schema, SchemaError, SchemaResult};
use crate::value::Value;

/// Any string value
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSchema;

impl Schema for StringSchema {
    fn description(&self) -> &str {
        "String value"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        match raw {
            Value::String(_) => Ok(raw.clone()),
            other => Err(SchemaError::type_mismatch("string", other.type_name())),
        }
    }
}

/// Integer value; integral floats and numeric strings are accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct IntSchema;

impl Schema for IntSchema {
    fn description(&self) -> &str {
        "Integer value"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        match raw {
            Value::Int(_) => Ok(raw.clone()),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                // i64::MAX rounds up to 2^63 as a float, which is already out of range
                if *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Ok(Value::Int(*f as i64))
                } else {
                    Err(SchemaError::Unparsable {
                        expected: "int",
                        value: f.to_string(),
                    })
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| SchemaError::Unparsable {
                    expected: "int",
                    value: s.clone(),
                }),
            other => Err(SchemaError::type_mismatch("int", other.type_name())),
        }
    }
}

/// Floating-point value; integers widen
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatSchema;

impl Schema for FloatSchema {
    fn description(&self) -> &str {
        "Floating-point value"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        match raw {
            Value::Float(_) => Ok(raw.clone()),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| SchemaError::Unparsable {
                    expected: "float",
                    value: s.clone(),
                }),
            other => Err(SchemaError::type_mismatch("float", other.type_name())),
        }
    }
}

/// Boolean value
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSchema;

impl Schema for BoolSchema {
    fn description(&self) -> &str {
        "Boolean value"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        match raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(SchemaError::Unparsable {
                    expected: "bool",
                    value: s.clone(),
                }),
            },
            other => Err(SchemaError::type_mismatch("bool", other.type_name())),
        }
    }
}

/// Any keyed structure, taken as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct DictSchema;

impl Schema for DictSchema {
    fn description(&self) -> &str {
        "Dynamic keyed structure"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        match raw {
            Value::Map(_) => Ok(raw.clone()),
            other => Err(SchemaError::type_mismatch("map", other.type_name())),
        }
    }
}

/// Accepts every value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySchema;

impl Schema for AnySchema {
    fn description(&self) -> &str {
        "Any value"
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        Ok(raw.clone())
    }
}

/// Schema backed by a serde type
///
/// Raw data is accepted when it deserializes into `T`; the normalized form is
/// `T` serialized back, so defaults and renamed fields are applied. Sets in
/// the raw data stay sets after normalization.
///
/// # Example
///
/// ```
/// use hiera_core::schema::{Schema, TypedSchema};
/// use hiera_core::Value;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Pool {
///     size: u32,
///     #[serde(default)]
///     timeout: u32,
/// }
///
/// let schema = TypedSchema::<Pool>::new("Connection pool");
/// let normalized = schema.validate(&Value::from(serde_json::json!({"size": 4}))).unwrap();
/// assert_eq!(normalized.get("timeout"), Some(&Value::Int(0)));
/// ```
pub struct TypedSchema<T> {
    description: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("description", &self.description)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: Serialize + DeserializeOwned,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn validate(&self, raw: &Value) -> SchemaResult<Value> {
        let typed: T = serde_json::from_value(serde_json::Value::from(raw.clone()))
            .map_err(|e| SchemaError::Invalid(e.to_string()))?;
        let json = serde_json::to_value(&typed).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        let mut normalized = Value::from(json);
        restore_sets(&mut normalized, raw);
        Ok(normalized)
    }
}

/// Sets have no serde data model of their own and come back as lists;
/// turn them back into sets wherever the raw value had one.
fn restore_sets(normalized: &mut Value, raw: &Value) {
    match raw {
        Value::Set(_) => {
            if let Value::List(items) = normalized {
                let items = std::mem::take(items);
                *normalized = Value::Set(items.into_iter().collect());
            }
        }
        Value::Map(original) => {
            if let Value::Map(out) = normalized {
                for (key, value) in out.iter_mut() {
                    if let Some(raw_value) = original.get(key) {
                        restore_sets(value, raw_value);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_string_schema() {
        assert_eq!(StringSchema.validate(&Value::from("x")).unwrap(), Value::from("x"));
        assert!(StringSchema.validate(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_int_schema() {
        assert_eq!(IntSchema.validate(&Value::Int(3)).unwrap(), Value::Int(3));
        assert_eq!(IntSchema.validate(&Value::from("42")).unwrap(), Value::Int(42));
        assert_eq!(IntSchema.validate(&Value::Float(2.0)).unwrap(), Value::Int(2));
        assert!(IntSchema.validate(&Value::from("not_an_int")).is_err());
        assert!(IntSchema.validate(&Value::Float(2.5)).is_err());
    }

    #[test]
    fn test_int_schema_rejects_out_of_range_floats() {
        let err = IntSchema.validate(&Value::Float(1e20)).unwrap_err();
        assert!(matches!(err, SchemaError::Unparsable { expected: "int", .. }));
        assert!(IntSchema.validate(&Value::Float(-1e20)).is_err());
        assert!(IntSchema.validate(&Value::Float(9_223_372_036_854_775_808.0)).is_err());
        assert_eq!(
            IntSchema.validate(&Value::Float(-9_223_372_036_854_775_808.0)).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_float_schema_widens_ints() {
        assert_eq!(FloatSchema.validate(&Value::Int(2)).unwrap(), Value::Float(2.0));
        assert!(FloatSchema.validate(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_bool_schema() {
        assert_eq!(BoolSchema.validate(&Value::from("yes")).unwrap(), Value::Bool(true));
        assert_eq!(BoolSchema.validate(&Value::Int(0)).unwrap(), Value::Bool(false));
        assert!(BoolSchema.validate(&Value::from("maybe")).is_err());
    }

    #[test]
    fn test_dict_schema() {
        assert!(DictSchema.validate(&Value::from(json!({"a": 1}))).is_ok());
        assert_eq!(
            DictSchema.validate(&Value::from("x")).unwrap_err(),
            SchemaError::type_mismatch("map", "string")
        );
    }

    #[derive(Serialize, Deserialize)]
    struct LevelB {
        blarg: Option<String>,
        other: Option<String>,
        blub: Option<HashSet<String>>,
    }

    #[derive(Serialize, Deserialize)]
    struct Complex {
        a: Option<String>,
        b: Option<LevelB>,
    }

    #[test]
    fn test_typed_schema_normalizes_and_keeps_sets() {
        let schema = TypedSchema::<Complex>::new("complex data");

        let mut b = crate::value::Map::new();
        b.insert("blarg".into(), Value::from("x"));
        b.insert("blub".into(), Value::set(["p", "q"]));
        let mut raw = crate::value::Map::new();
        raw.insert("b".into(), Value::Map(b));

        let normalized = schema.validate(&Value::Map(raw)).unwrap();
        assert_eq!(normalized.get("a"), Some(&Value::Null));
        let b = normalized.get("b").unwrap();
        assert_eq!(b.get("blarg"), Some(&Value::from("x")));
        assert_eq!(b.get("other"), Some(&Value::Null));
        assert_eq!(b.get("blub"), Some(&Value::set(["p", "q"])));
    }

    #[test]
    fn test_typed_schema_rejects_bad_shape() {
        let schema = TypedSchema::<Complex>::new("complex data");
        let err = schema
            .validate(&Value::from(json!({"b": {"blarg": 7}})))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }
}
