// Hint resolver
//
// Hints name the source properties a caller wants when several values of
// the same kind compete for one leaf. Ordered hints are consumed: once a
// hint has bound a leaf position it cannot bind a sibling position.

use indexmap::IndexMap;
use log::trace;

use crate::reshape::config::ReshapeConfig;
use crate::reshape::context::SearchContext;
use crate::reshape::search::{self, SourcePath};
use crate::schema::LeafKind;
use crate::value::Value;

/// Hints as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Hints {
    #[default]
    None,
    /// One property name
    Single(String),
    /// Property names consumed in schema key order
    Ordered(Vec<String>),
    /// Output key -> property name
    Keyed(IndexMap<String, String>),
}

impl From<&str> for Hints {
    fn from(name: &str) -> Self {
        Hints::Single(name.to_string())
    }
}

impl From<String> for Hints {
    fn from(name: String) -> Self {
        Hints::Single(name)
    }
}

impl From<Vec<String>> for Hints {
    fn from(names: Vec<String>) -> Self {
        Hints::Ordered(names)
    }
}

impl From<Vec<&str>> for Hints {
    fn from(names: Vec<&str>) -> Self {
        Hints::Ordered(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Hints {
    fn from(names: [&str; N]) -> Self {
        Hints::Ordered(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Hints {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Hints::Keyed(
            pairs
                .iter()
                .map(|(key, name)| (key.to_string(), name.to_string()))
                .collect(),
        )
    }
}

impl<T: Into<Hints>> From<Option<T>> for Hints {
    fn from(hints: Option<T>) -> Self {
        hints.map_or(Hints::None, Into::into)
    }
}

/// The hints still available during one reshape call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintPool {
    pending: Vec<String>,
    keyed: IndexMap<String, String>,
}

impl From<Hints> for HintPool {
    fn from(hints: Hints) -> Self {
        match hints {
            Hints::None => Self::default(),
            Hints::Single(name) => Self {
                pending: vec![name],
                keyed: IndexMap::new(),
            },
            Hints::Ordered(pending) => Self {
                pending,
                keyed: IndexMap::new(),
            },
            Hints::Keyed(keyed) => Self {
                pending: Vec::new(),
                keyed,
            },
        }
    }
}

impl HintPool {
    /// Unconsumed ordered hints, in order
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// The property name bound to output key `key`, if any
    pub fn keyed(&self, key: &str) -> Option<&str> {
        self.keyed.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.keyed.is_empty()
    }

    /// Removes the first pending occurrence of `hint`.
    pub fn consume(&mut self, hint: &str) -> bool {
        match self.pending.iter().position(|pending| pending == hint) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Hints pending in `self` that `later` no longer holds.
    pub fn consumed_since(&self, later: &HintPool) -> Vec<String> {
        let mut remaining = later.pending.clone();
        let mut consumed = Vec::new();
        for hint in &self.pending {
            match remaining.iter().position(|left| left == hint) {
                Some(index) => {
                    remaining.remove(index);
                }
                None => consumed.push(hint.clone()),
            }
        }
        consumed
    }
}

/// Which rule picked a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Keyed(String),
    Hint(String),
    SchemaKey,
    Pinned(String),
    Shallowest,
}

/// Chooses the source value for a leaf and consumes the hint that chose it.
///
/// Candidates, each searched shallowest first among unused paths:
/// the keyed hint for `label`, the pending hints in order, `label` itself
/// as a property name, the name pinned to `position`, and finally any value
/// of the right kind.
pub fn resolve_leaf<'a>(
    ctx: &mut SearchContext,
    config: &ReshapeConfig,
    source: &'a Value,
    at: &SourcePath,
    kind: LeafKind,
    label: Option<&str>,
    position: &str,
) -> Option<(SourcePath, &'a Value)> {
    let (choice, path, value) = choose(ctx, config, source, at, kind, label, position)?;
    trace!("{} at {} (depth {}) chosen by {:?}", kind, path, path.depth(), choice);
    if let Choice::Hint(hint) = &choice {
        ctx.hints.consume(hint);
    }
    Some((path, value))
}

fn choose<'a>(
    ctx: &SearchContext,
    config: &ReshapeConfig,
    source: &'a Value,
    at: &SourcePath,
    kind: LeafKind,
    label: Option<&str>,
    position: &str,
) -> Option<(Choice, SourcePath, &'a Value)> {
    let named = |name: &str| search::find_leaf(source, at, kind, Some(name), &ctx.used);

    if let Some(name) = label.and_then(|label| ctx.hints.keyed(label)) {
        if let Some((path, value)) = named(name) {
            return Some((Choice::Keyed(name.to_string()), path, value));
        }
    }

    for hint in ctx.hints.pending() {
        if let Some((path, value)) = named(hint.as_str()) {
            return Some((Choice::Hint(hint.clone()), path, value));
        }
    }

    if config.schema_keys_as_hints {
        if let Some((path, value)) = label.and_then(|label| named(label)) {
            return Some((Choice::SchemaKey, path, value));
        }
    }

    if config.pin_array_keys {
        if let Some(pinned) = ctx.pinned(position) {
            if let Some((path, value)) = named(pinned) {
                return Some((Choice::Pinned(pinned.to_string()), path, value));
            }
        }
    }

    search::find_leaf(source, at, kind, None, &ctx.used)
        .map(|(path, value)| (Choice::Shallowest, path, value))
}
