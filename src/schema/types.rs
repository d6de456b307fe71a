// Schema type system for reshaper
//
// A schema describes the shape of the wanted output: primitive leaves named
// by type, arrays that repeat one inner schema and object templates with
// declared keys.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::internal::error::{Error, Result};
use crate::value::{Value, ValueType};

/// Primitive kinds a schema leaf can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// UTF-8 string
    String,
    /// Number (integer or floating point)
    Number,
    /// Boolean
    Boolean,
}

impl LeafKind {
    /// Returns the value type a source value must have to satisfy this leaf
    pub fn value_type(&self) -> ValueType {
        match self {
            LeafKind::String => ValueType::String,
            LeafKind::Number => ValueType::Number,
            LeafKind::Boolean => ValueType::Bool,
        }
    }

    /// Returns true if `value` is a primitive of this kind
    pub fn accepts(&self, value: &Value) -> bool {
        value.value_type() == self.value_type()
    }

    /// The name used for this kind in the schema encoding
    pub fn name(&self) -> &'static str {
        match self {
            LeafKind::String => "String",
            LeafKind::Number => "Number",
            LeafKind::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LeafKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "String" => Ok(LeafKind::String),
            "Number" => Ok(LeafKind::Number),
            "Boolean" => Ok(LeafKind::Boolean),
            _ => Err(Error::SchemaError(format!("Unknown type: {}", name))),
        }
    }
}

/// A node of a schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A primitive of the given kind
    Leaf(LeafKind),
    /// An array whose every element matches the inner schema
    Array(Box<SchemaNode>),
    /// An object with exactly these keys, in declaration order
    Object(IndexMap<String, SchemaNode>),
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::Leaf(LeafKind::String)
    }

    pub fn number() -> Self {
        SchemaNode::Leaf(LeafKind::Number)
    }

    pub fn boolean() -> Self {
        SchemaNode::Leaf(LeafKind::Boolean)
    }

    /// Wraps `inner` in an array template
    pub fn array(inner: SchemaNode) -> Self {
        SchemaNode::Array(Box::new(inner))
    }

    /// Builds an object template, keeping the order of `fields`
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Object(fields.into_iter().map(|(key, node)| (key.into(), node)).collect())
    }

    /// Returns true for leaves
    pub fn is_leaf(&self) -> bool {
        matches!(self, SchemaNode::Leaf(_))
    }

    /// Nesting depth of the schema; a lone leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            SchemaNode::Leaf(_) => 1,
            SchemaNode::Array(inner) => 1 + inner.depth(),
            SchemaNode::Object(fields) => {
                1 + fields.values().map(SchemaNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Compact description used in error messages, e.g. `[{name, age}]`
impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Leaf(kind) => write!(f, "{}", kind),
            SchemaNode::Array(inner) => write!(f, "[{}]", inner),
            SchemaNode::Object(fields) => {
                f.write_str("{")?;
                for (i, key) in fields.keys().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(key)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<LeafKind> for SchemaNode {
    fn from(kind: LeafKind) -> Self {
        SchemaNode::Leaf(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_kind_names() {
        assert_eq!("Number".parse::<LeafKind>().unwrap(), LeafKind::Number);
        assert_eq!(LeafKind::Boolean.to_string(), "Boolean");
        assert!("number".parse::<LeafKind>().is_err());
    }

    #[test]
    fn test_leaf_kind_accepts_only_its_primitive() {
        assert!(LeafKind::String.accepts(&Value::from("a")));
        assert!(!LeafKind::String.accepts(&Value::from(1)));
        assert!(LeafKind::Boolean.accepts(&Value::from(false)));
        assert!(!LeafKind::Number.accepts(&Value::Null));
    }

    #[test]
    fn test_display_and_depth() {
        let schema = SchemaNode::object([
            ("names", SchemaNode::array(SchemaNode::string())),
            (
                "ages",
                SchemaNode::array(SchemaNode::object([("age", SchemaNode::array(SchemaNode::number()))])),
            ),
        ]);
        assert_eq!(schema.to_string(), "{names, ages}");
        assert_eq!(SchemaNode::array(SchemaNode::number()).to_string(), "[Number]");
        assert_eq!(schema.depth(), 5);
        assert!(!schema.is_leaf());
    }
}
