// Source searcher
//
// Every lookup into the source is a breadth-first walk: the starting node,
// then its children, then grandchildren. Within one depth, nodes come in
// key order of their parents, so the first hit is the shallowest one and
// ties are broken by key order.

use std::collections::VecDeque;
use std::fmt;

use crate::reshape::context::UsedKeys;
use crate::schema::LeafKind;
use crate::value::Value;

/// One step from a container to a child
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Absolute location of a node, measured from the root of the reshape call
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourcePath(Vec<PathSegment>);

impl SourcePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The property name this node sits under, if its last step is a key.
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Breadth-first iterator over a node and all of its descendants
pub struct BreadthFirst<'a> {
    queue: VecDeque<(SourcePath, &'a Value)>,
}

impl<'a> BreadthFirst<'a> {
    pub fn new(root: &'a Value, at: &SourcePath) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back((at.clone(), root));
        Self { queue }
    }
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (SourcePath, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, value) = self.queue.pop_front()?;
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.queue.push_back((path.key(key), child));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.queue.push_back((path.index(index), child));
                }
            }
            _ => {}
        }
        Some((path, value))
    }
}

/// Finds the shallowest unused primitive of `kind` reachable from `root`.
///
/// With `name`, only values stored under a property of that name qualify.
pub fn find_leaf<'a>(
    root: &'a Value,
    at: &SourcePath,
    kind: LeafKind,
    name: Option<&str>,
    used: &UsedKeys,
) -> Option<(SourcePath, &'a Value)> {
    BreadthFirst::new(root, at).find(|(path, value)| {
        kind.accepts(value)
            && name.map_or(true, |name| path.last_key() == Some(name))
            && !used.contains(path)
    })
}

/// Finds the shallowest array or object stored under a property named
/// `name` strictly below `root`.
pub fn find_named_container<'a>(
    root: &'a Value,
    at: &SourcePath,
    name: &str,
) -> Option<(SourcePath, &'a Value)> {
    BreadthFirst::new(root, at)
        .skip(1)
        .find(|(path, value)| value.is_container() && path.last_key() == Some(name))
}

/// Every array and object reachable from `root`, shallowest first.
pub fn containers<'a>(root: &'a Value, at: &SourcePath) -> Vec<(SourcePath, &'a Value)> {
    BreadthFirst::new(root, at)
        .filter(|(_, value)| value.is_container())
        .collect()
}
