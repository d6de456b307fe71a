// Conversions between Value and serde_json::Value
//
// Sources and results usually travel as JSON. Object key order survives the
// trip in both directions because serde_json is built with `preserve_order`.

use serde_json::Number;

use crate::value::types::Value;

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

/// Integral numbers inside the safe range become JSON integers, other finite
/// numbers become floats and NaN or infinities become `null`.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_order_is_kept() {
        let value = Value::from(json!({"z": 1, "a": 2}));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_numbers_round_trip_as_integers_when_integral() {
        let value = Value::from(json!([23, 1.85, -4]));
        assert_eq!(value, Value::from(vec![23.0, 1.85, -4.0]));
        assert_eq!(serde_json::Value::from(&value), json!([23, 1.85, -4]));
        assert_eq!(serde_json::Value::from(&value).to_string(), "[23,1.85,-4]");
    }

    #[test]
    fn test_non_finite_numbers_become_null() {
        assert_eq!(serde_json::Value::from(Value::Number(f64::NAN)), json!(null));
        assert_eq!(serde_json::Value::from(Value::Number(f64::INFINITY)), json!(null));
    }

    #[test]
    fn test_nested_structure_converts() {
        let json = json!({"name": "Joel", "info": {"tags": ["a", true, null]}});
        let value = Value::from(&json);
        assert_eq!(serde_json::Value::from(value), json);
    }
}
