// Value module for reshaper
//
// The tagged tree that sources and results are built from, plus its
// conversions to and from serde_json.

pub use self::types::{Map, Value, ValueType};

pub mod types;
pub mod convert;
