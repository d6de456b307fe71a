// Schema module for reshaper
//
// This module provides the schema tree that describes a wanted output shape
// and the parser for its JSON encoding.

pub use self::types::{LeafKind, SchemaNode};
pub use self::parser::SchemaParser;

pub mod types;
pub mod parser;
