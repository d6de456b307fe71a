// JSON schema parser for reshaper
//
// This module reads the caller-facing schema encoding (type name strings,
// one-element arrays, objects of sub-schemas) and the hint encoding from
// serde_json values.

use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use crate::internal::error::{Error, Result};
use crate::reshape::hints::Hints;
use crate::schema::types::{LeafKind, SchemaNode};

/// Parser for JSON schema and hint definitions
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Extra type names (alias -> leaf kind)
    type_aliases: HashMap<String, LeafKind>,
}

impl SchemaParser {
    /// Creates a new schema parser
    pub fn new() -> Self {
        Self {
            type_aliases: HashMap::new(),
        }
    }

    /// Adds a type alias, e.g. `"Integer"` for [`LeafKind::Number`]
    pub fn add_type_alias(&mut self, name: &str, kind: LeafKind) {
        self.type_aliases.insert(name.to_string(), kind);
    }

    /// Parses a JSON schema definition into a SchemaNode
    pub fn parse_schema(&self, json: &Value) -> Result<SchemaNode> {
        match json {
            Value::String(type_name) => self.parse_type_name(type_name),
            Value::Array(items) => match items.as_slice() {
                [inner] => Ok(SchemaNode::array(self.parse_schema(inner)?)),
                _ => Err(Error::SchemaError(format!(
                    "Array schema must contain exactly one element, found {}",
                    items.len()
                ))),
            },
            Value::Object(obj) => {
                let mut fields = IndexMap::with_capacity(obj.len());
                for (key, sub) in obj {
                    let node = self.parse_schema(sub).map_err(|err| match err {
                        Error::SchemaError(msg) => {
                            Error::SchemaError(format!("In field '{}': {}", key, msg))
                        }
                        other => other,
                    })?;
                    fields.insert(key.clone(), node);
                }
                Ok(SchemaNode::Object(fields))
            }
            _ => Err(Error::SchemaError(format!(
                "Invalid schema definition: {}, expected a type name, array or object",
                json
            ))),
        }
    }

    /// Parses hints: a property name, an ordered list of names, or an object
    /// mapping output keys to property names. `null` means no hints.
    pub fn parse_hints(&self, json: &Value) -> Result<Hints> {
        match json {
            Value::Null => Ok(Hints::None),
            Value::String(name) => Ok(Hints::Single(name.clone())),
            Value::Array(items) => {
                let names = items
                    .iter()
                    .map(|item| match item {
                        Value::String(name) => Ok(name.clone()),
                        other => Err(Error::SchemaError(format!(
                            "Hint list entries must be strings, found {}",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Hints::Ordered(names))
            }
            Value::Object(obj) => {
                let mut keyed = IndexMap::with_capacity(obj.len());
                for (key, value) in obj {
                    match value {
                        Value::String(name) => {
                            keyed.insert(key.clone(), name.clone());
                        }
                        other => {
                            return Err(Error::SchemaError(format!(
                                "Hint for key '{}' must be a string, found {}",
                                key, other
                            )))
                        }
                    }
                }
                Ok(Hints::Keyed(keyed))
            }
            _ => Err(Error::SchemaError(format!(
                "Invalid hints: {}, expected string, array or object",
                json
            ))),
        }
    }

    fn parse_type_name(&self, type_name: &str) -> Result<SchemaNode> {
        if let Some(kind) = self.type_aliases.get(type_name) {
            return Ok(SchemaNode::Leaf(*kind));
        }
        type_name.parse::<LeafKind>().map(SchemaNode::Leaf)
    }
}

/// Parses a schema from JSON text with the default parser
impl FromStr for SchemaNode {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(text)?;
        SchemaParser::new().parse_schema(&json)
    }
}
