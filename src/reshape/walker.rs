// Schema walker
//
// Descends the schema and builds the result. Leaves are resolved by the hint
// resolver, object templates field by field, and array templates by trying
// every container reachable from the source, shallowest first, until one can
// be read as an array of the inner schema.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::internal::error::{Error, Result};
use crate::reshape::config::ReshapeConfig;
use crate::reshape::context::SearchContext;
use crate::reshape::hints::{self, HintPool, Hints};
use crate::reshape::search::{self, SourcePath};
use crate::schema::{LeafKind, SchemaNode};
use crate::value::{Map, Value};

/// Reshapes source values into the shape described by a schema
#[derive(Debug, Clone, Default)]
pub struct Reshaper {
    config: ReshapeConfig,
}

impl Reshaper {
    /// Creates a new reshaper with default configuration
    pub fn new() -> Self {
        Self {
            config: ReshapeConfig::default(),
        }
    }

    /// Creates a new reshaper with custom configuration
    pub fn with_config(config: ReshapeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReshapeConfig {
        &self.config
    }

    /// Finds the part of `source` that fits `schema` and returns it in that shape.
    ///
    /// Each call owns its hint pool and used-key set, so a `Reshaper` can be
    /// shared between threads.
    pub fn reshape(
        &self,
        source: &Value,
        schema: &SchemaNode,
        hints: impl Into<Hints>,
    ) -> Result<Value> {
        let mut ctx = SearchContext::new(HintPool::from(hints.into()));
        self.run(source, schema, &mut ctx)
    }

    fn run(&self, source: &Value, schema: &SchemaNode, ctx: &mut SearchContext) -> Result<Value> {
        debug!("reshaping into {} (schema depth {})", schema, schema.depth());
        let result = self.walk(schema, source, &SourcePath::root(), None, "", ctx);
        debug!(
            "reshape finished after {} walk(s), {} source value(s) claimed",
            ctx.walks(),
            ctx.used.len()
        );
        result
    }

    /// `label` is the nearest enclosing object template key; `position` names
    /// the schema node, identically for every element of an enclosing array.
    ///
    /// Label and position follow from the schema node, and the source from
    /// `at`, so a failure is recorded against the position, the path and the
    /// context state and never recomputed.
    fn walk(
        &self,
        schema: &SchemaNode,
        source: &Value,
        at: &SourcePath,
        label: Option<&str>,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Value> {
        let attempt = ctx.attempt(position, at);
        if let Some(err) = ctx.known_failure(&attempt) {
            return Err(err.clone());
        }
        ctx.count_walk();

        let result = match schema {
            SchemaNode::Leaf(kind) => self.walk_leaf(*kind, source, at, label, position, ctx),
            SchemaNode::Array(inner) => self.walk_array(inner, source, at, label, position, ctx),
            SchemaNode::Object(fields) => self.walk_object(fields, source, at, position, ctx),
        };
        if let Err(err) = &result {
            ctx.record_failure(attempt, err.clone());
        }
        result
    }

    fn walk_leaf(
        &self,
        kind: LeafKind,
        source: &Value,
        at: &SourcePath,
        label: Option<&str>,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Value> {
        let (path, value) =
            hints::resolve_leaf(ctx, &self.config, source, at, kind, label, position)
                .ok_or_else(|| Error::MatchNotFound(kind.to_string()))?;

        if self.config.pin_array_keys {
            if let Some(key) = path.last_key() {
                ctx.pin(position, key);
            }
        }
        ctx.used.claim(path);
        Ok(value.clone())
    }

    fn walk_object(
        &self,
        fields: &IndexMap<String, SchemaNode>,
        source: &Value,
        at: &SourcePath,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Value> {
        let mut out = Map::with_capacity(fields.len());
        for (key, sub) in fields {
            let position = format!("{}/{}", position, key);
            let value = self
                .walk_field(key, sub, source, at, &position, ctx)
                .map_err(|err| {
                    debug!("field '{}' unresolved from {}: {}", key, at, err);
                    Error::MatchNotFound(key.clone())
                })?;
            out.insert(key.clone(), value);
        }
        Ok(Value::Object(out))
    }

    /// Composite fields first try a container stored under the field's own
    /// name (or its keyed hint), then the whole source.
    fn walk_field(
        &self,
        key: &str,
        sub: &SchemaNode,
        source: &Value,
        at: &SourcePath,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Value> {
        if !sub.is_leaf() {
            let mut names: Vec<String> = Vec::new();
            if let Some(name) = ctx.hints.keyed(key) {
                names.push(name.to_string());
            }
            if self.config.schema_keys_as_hints && !names.iter().any(|name| name == key) {
                names.push(key.to_string());
            }

            for name in &names {
                let Some((path, child)) = search::find_named_container(source, at, name) else {
                    continue;
                };
                let checkpoint = ctx.checkpoint();
                match self.walk(sub, child, &path, Some(key), position, ctx) {
                    Ok(value) => return Ok(value),
                    Err(err) => {
                        debug!("'{}' does not fit {} at {}: {}", key, sub, path, err);
                        ctx.restore(checkpoint);
                    }
                }
            }
        }
        self.walk(sub, source, at, Some(key), position, ctx)
    }

    fn walk_array(
        &self,
        inner: &SchemaNode,
        source: &Value,
        at: &SourcePath,
        label: Option<&str>,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Value> {
        let position = format!("{}/[]", position);

        for (path, candidate) in search::containers(source, at) {
            let checkpoint = ctx.checkpoint();
            match self.collect_elements(inner, candidate, &path, label, &position, ctx) {
                // An empty array is only a match when the source itself is one.
                Ok(items) if !items.is_empty() || (path == *at && is_empty_array(candidate)) => {
                    trace!("[{}] read from {} with {} element(s)", inner, path, items.len());
                    return Ok(Value::Array(items));
                }
                Ok(_) => ctx.restore(checkpoint),
                Err(err) => {
                    debug!("[{}] cannot be read from {}: {}", inner, path, err);
                    ctx.restore(checkpoint);
                }
            }
        }

        if self.config.single_element_backoff {
            let checkpoint = ctx.checkpoint();
            match self.walk(inner, source, at, label, &position, ctx) {
                Ok(value) => {
                    trace!("[{}] built from a single match at {}", inner, at);
                    return Ok(Value::Array(vec![value]));
                }
                Err(err) => {
                    debug!("single element backoff for [{}] failed at {}: {}", inner, at, err);
                    ctx.restore(checkpoint);
                }
            }
        }

        Err(Error::MatchNotFound(format!("{} for array", inner)))
    }

    /// Reads `candidate` as a sequence of elements for `inner`.
    ///
    /// Arrays contribute every element, except primitives of another kind
    /// when `inner` is a leaf. Objects contribute their own values of the
    /// leaf kind when `inner` is a leaf, otherwise every container value.
    fn collect_elements(
        &self,
        inner: &SchemaNode,
        candidate: &Value,
        path: &SourcePath,
        label: Option<&str>,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Value>> {
        match (candidate, inner) {
            (Value::Array(items), SchemaNode::Leaf(kind)) => {
                let elements = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.is_container() || kind.accepts(item))
                    .map(|(index, item)| (path.index(index), item));
                self.each_element(inner, elements, label, position, ctx)
            }
            (Value::Array(items), _) => {
                let elements = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (path.index(index), item));
                self.each_element(inner, elements, label, position, ctx)
            }
            (Value::Object(map), SchemaNode::Leaf(kind)) => {
                let mut out = Vec::new();
                for (key, value) in map {
                    let child = path.key(key);
                    if kind.accepts(value) && ctx.used.claim(child) {
                        out.push(value.clone());
                    }
                }
                Ok(out)
            }
            (Value::Object(map), _) => {
                let elements = map
                    .iter()
                    .filter(|(_, value)| value.is_container())
                    .map(|(key, value)| (path.key(key), value));
                self.each_element(inner, elements, label, position, ctx)
            }
            _ => Err(Error::MatchNotFound(inner.to_string())),
        }
    }

    /// Matches `inner` against every element. Each element starts from the
    /// same hint pool; hints consumed by any element are gone afterwards.
    fn each_element<'a, I>(
        &self,
        inner: &SchemaNode,
        elements: I,
        label: Option<&str>,
        position: &str,
        ctx: &mut SearchContext,
    ) -> Result<Vec<Value>>
    where
        I: Iterator<Item = (SourcePath, &'a Value)>,
    {
        let entry = ctx.hints.clone();
        let mut consumed: Vec<String> = Vec::new();
        let mut out = Vec::new();

        for (path, element) in elements {
            ctx.hints = entry.clone();
            out.push(self.walk(inner, element, &path, label, position, ctx)?);
            for hint in entry.consumed_since(&ctx.hints) {
                if !consumed.contains(&hint) {
                    consumed.push(hint);
                }
            }
        }

        ctx.hints = entry;
        for hint in &consumed {
            ctx.hints.consume(hint);
        }
        Ok(out)
    }
}

fn is_empty_array(value: &Value) -> bool {
    value.as_array().map_or(false, |items| items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number_list() -> SchemaNode {
        SchemaNode::array(SchemaNode::number())
    }

    #[test]
    fn test_empty_source_array_gives_empty_result() {
        let result = Reshaper::new()
            .reshape(&Value::Array(Vec::new()), &number_list(), Hints::None)
            .unwrap();
        assert_eq!(result, Value::Array(Vec::new()));
    }

    #[test]
    fn test_empty_nested_array_is_not_a_match() {
        let source = Value::from(json!({"a": [], "b": {"c": [4, 5]}}));
        let result = Reshaper::new().reshape(&source, &number_list(), Hints::None).unwrap();
        assert_eq!(result, Value::from(vec![4, 5]));
    }

    #[test]
    fn test_single_element_backoff() {
        let source = Value::from(json!({"name": "Ann", "age": 40}));
        let schema = SchemaNode::array(SchemaNode::object([("name", SchemaNode::string())]));
        let result = Reshaper::new().reshape(&source, &schema, Hints::None).unwrap();
        assert_eq!(result, Value::from(json!([{"name": "Ann"}])));

        let strict = Reshaper::with_config(ReshapeConfig {
            single_element_backoff: false,
            ..ReshapeConfig::default()
        });
        let err = strict.reshape(&Value::from(5), &number_list(), Hints::None).unwrap_err();
        assert_eq!(err, Error::MatchNotFound("Number for array".to_string()));
        assert_eq!(
            Reshaper::new().reshape(&Value::from(5), &number_list(), Hints::None).unwrap(),
            Value::from(vec![5])
        );
    }

    #[test]
    fn test_sibling_leaves_never_share_a_source_key() {
        let source = Value::from(json!({"a": 1}));
        let schema = SchemaNode::object([("x", SchemaNode::number()), ("y", SchemaNode::number())]);
        let err = Reshaper::new().reshape(&source, &schema, Hints::None).unwrap_err();
        assert_eq!(err.to_string(), "Could not find y");
    }

    #[test]
    fn test_sibling_arrays_avoid_used_keys() {
        let source = Value::from(json!([
            {"name": "Joel", "info": {"middleName": "Robert"}},
            {"name": "Jake", "info": {"middleName": "Wild"}}
        ]));
        let schema = SchemaNode::object([
            ("x", SchemaNode::array(SchemaNode::string())),
            ("y", SchemaNode::array(SchemaNode::string())),
        ]);
        let result = Reshaper::new().reshape(&source, &schema, Hints::None).unwrap();
        assert_eq!(
            result,
            Value::from(json!({"x": ["Joel", "Jake"], "y": ["Robert", "Wild"]}))
        );
    }

    #[test]
    fn test_pinning_can_be_disabled() {
        let source = Value::from(json!([{"a": 1, "b": 2}, {"b": 3, "a": 4}]));
        let loose = Reshaper::with_config(ReshapeConfig {
            pin_array_keys: false,
            ..ReshapeConfig::default()
        });
        assert_eq!(
            loose.reshape(&source, &number_list(), Hints::None).unwrap(),
            Value::from(vec![1, 3])
        );
    }

    #[test]
    fn test_schema_keys_as_hints_can_be_disabled() {
        let source = Value::from(json!({"first": "a", "wanted": "b"}));
        let schema = SchemaNode::object([("wanted", SchemaNode::string())]);
        let plain = Reshaper::with_config(ReshapeConfig {
            schema_keys_as_hints: false,
            ..ReshapeConfig::default()
        });
        assert_eq!(
            plain.reshape(&source, &schema, Hints::None).unwrap(),
            Value::from(json!({"wanted": "a"}))
        );
        assert_eq!(
            Reshaper::new().reshape(&source, &schema, Hints::None).unwrap(),
            Value::from(json!({"wanted": "b"}))
        );
    }

    #[test]
    fn test_failed_attempt_does_not_leak_hints() {
        // "bad" consumes the hint on its first element and then fails on the
        // second; without a rollback "good" would fall back to "a".
        let source = Value::from(json!({
            "bad": [{"b": 1}, {"c": "x"}],
            "good": [{"a": 5, "b": 6}]
        }));
        let result = Reshaper::new().reshape(&source, &number_list(), "b").unwrap();
        assert_eq!(result, Value::from(vec![6]));
    }

    #[test]
    fn test_array_of_leaves_skips_primitives_of_other_kinds() {
        let mixed = Value::from(json!([1, "a", 2]));
        assert_eq!(
            Reshaper::new().reshape(&mixed, &number_list(), Hints::None).unwrap(),
            Value::from(vec![1, 2])
        );
        let keyed = Value::from(json!({"a": 1, "b": "a", "c": 2}));
        assert_eq!(
            Reshaper::new().reshape(&keyed, &number_list(), Hints::None).unwrap(),
            Value::from(vec![1, 2])
        );
        // Containers are still searched, so an element without the kind fails
        // the candidate as before.
        let nested = Value::from(json!([{"n": 1}, {"s": "x"}]));
        assert_eq!(
            Reshaper::new().reshape(&nested, &number_list(), Hints::None).unwrap(),
            Value::from(vec![1])
        );
    }

    #[test]
    fn test_array_with_no_value_of_kind_is_not_an_empty_match() {
        let err = Reshaper::new()
            .reshape(&Value::from(json!(["a", "b"])), &number_list(), Hints::None)
            .unwrap_err();
        assert_eq!(err, Error::MatchNotFound("Number for array".to_string()));
    }

    fn wrapped_strings(depth: usize) -> Value {
        let mut source = json!(["s", "t"]);
        for _ in 0..depth {
            source = json!([source, "x"]);
        }
        Value::from(source)
    }

    fn nested_number_lists(depth: usize) -> SchemaNode {
        let mut schema = SchemaNode::number();
        for _ in 0..depth {
            schema = SchemaNode::array(schema);
        }
        schema
    }

    fn count_nodes(value: &Value) -> usize {
        search::BreadthFirst::new(value, &SourcePath::root()).count()
    }

    #[test]
    fn test_failed_walks_are_not_repeated() {
        let source = wrapped_strings(40);
        let nodes = count_nodes(&source);
        for depth in 1..=4 {
            let schema = nested_number_lists(depth);
            let mut ctx = SearchContext::default();
            let err = Reshaper::new().run(&source, &schema, &mut ctx).unwrap_err();
            assert!(err.is_match_not_found());
            // Nothing is ever claimed here, so each schema node walks each
            // source node at most once.
            assert!(
                ctx.walks() <= (depth + 1) * nodes,
                "{} walks for schema depth {} over {} nodes",
                ctx.walks(),
                depth,
                nodes
            );
        }
    }
}
