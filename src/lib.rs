// reshaper library entry point
//
// Finds the part of a nested value that fits a schema and returns it in
// exactly that shape.

pub mod internal;
pub mod reshape;
pub mod schema;
pub mod value;

pub use crate::internal::error::{Error, Result};
pub use crate::reshape::{Hints, ReshapeConfig, Reshaper};
pub use crate::schema::{LeafKind, SchemaNode, SchemaParser};
pub use crate::value::{Map, Value, ValueType};

/// Reshapes `source` into `schema` with the default configuration.
///
/// `hints` accepts a property name, a list of names, key/name pairs, or
/// `Hints::None`.
pub fn reshape(source: &Value, schema: &SchemaNode, hints: impl Into<Hints>) -> Result<Value> {
    Reshaper::new().reshape(source, schema, hints)
}

/// Same as [`reshape`], with source, schema and hints in their JSON encoding.
pub fn reshape_json(
    source: &serde_json::Value,
    schema: &serde_json::Value,
    hints: Option<&serde_json::Value>,
) -> Result<serde_json::Value> {
    let parser = SchemaParser::new();
    let schema = parser.parse_schema(schema)?;
    let hints = match hints {
        Some(json) => parser.parse_hints(json)?,
        None => Hints::None,
    };
    let result = reshape(&Value::from(source), &schema, hints)?;
    Ok(serde_json::Value::from(result))
}
