// Search context
//
// The mutable state of one reshape call: the hint pool, the set of source
// paths already bound to a leaf, and the property names pinned to leaf
// positions inside arrays. Every speculative attempt takes a checkpoint and
// restores it on failure.
//
// Failed walks are remembered for the rest of the call. A walk is a pure
// function of its schema position, its source path and the context state,
// so the same attempt from the same state fails the same way.

use std::collections::{HashMap, HashSet};

use crate::internal::error::Error;
use crate::reshape::hints::HintPool;
use crate::reshape::search::SourcePath;

/// Names one state of a set that only changes through `bump` and
/// checkpoint restores. Stamps are never issued twice, so two equal stamps
/// always describe equal contents.
#[derive(Debug, Default, Clone, Copy)]
struct Stamp {
    current: u64,
    issued: u64,
}

impl Stamp {
    fn bump(&mut self) {
        self.issued += 1;
        self.current = self.issued;
    }
}

/// Source paths already claimed by a leaf, with an undo journal
#[derive(Debug, Default)]
pub struct UsedKeys {
    claimed: HashSet<SourcePath>,
    journal: Vec<SourcePath>,
    stamp: Stamp,
}

impl UsedKeys {
    pub fn contains(&self, path: &SourcePath) -> bool {
        self.claimed.contains(path)
    }

    /// Marks `path` as used. Returns false if it was already claimed.
    pub fn claim(&mut self, path: SourcePath) -> bool {
        if !self.claimed.insert(path.clone()) {
            return false;
        }
        self.journal.push(path);
        self.stamp.bump();
        true
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    fn mark(&self) -> (usize, u64) {
        (self.journal.len(), self.stamp.current)
    }

    fn rollback(&mut self, (mark, stamp): (usize, u64)) {
        for path in self.journal.drain(mark..) {
            self.claimed.remove(&path);
        }
        self.stamp.current = stamp;
    }
}

/// Snapshot of a SearchContext
#[derive(Debug)]
pub struct Checkpoint {
    hints: HintPool,
    used: (usize, u64),
    pinned: HashMap<String, String>,
    pinned_stamp: u64,
}

/// One walk of a schema position over a source path, from one context state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attempt {
    position: String,
    path: SourcePath,
    hints: Vec<String>,
    used: u64,
    pinned: u64,
}

/// State threaded through one reshape call
#[derive(Debug, Default)]
pub struct SearchContext {
    pub hints: HintPool,
    pub used: UsedKeys,
    /// Schema position -> property name chosen for it by an earlier element
    pinned: HashMap<String, String>,
    pinned_stamp: Stamp,
    /// Survives restores
    failures: HashMap<Attempt, Error>,
    walks: usize,
}

impl SearchContext {
    pub fn new(hints: HintPool) -> Self {
        Self {
            hints,
            ..Self::default()
        }
    }

    pub fn pinned(&self, position: &str) -> Option<&str> {
        self.pinned.get(position).map(String::as_str)
    }

    /// Pins `key` to `position` unless a key is already pinned there.
    pub fn pin(&mut self, position: &str, key: &str) {
        if !self.pinned.contains_key(position) {
            self.pinned.insert(position.to_string(), key.to_string());
            self.pinned_stamp.bump();
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            hints: self.hints.clone(),
            used: self.used.mark(),
            pinned: self.pinned.clone(),
            pinned_stamp: self.pinned_stamp.current,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.hints = checkpoint.hints;
        self.used.rollback(checkpoint.used);
        self.pinned = checkpoint.pinned;
        self.pinned_stamp.current = checkpoint.pinned_stamp;
    }

    /// Describes walking `position` over `path` from the current state.
    pub fn attempt(&self, position: &str, path: &SourcePath) -> Attempt {
        Attempt {
            position: position.to_string(),
            path: path.clone(),
            hints: self.hints.pending().to_vec(),
            used: self.used.stamp.current,
            pinned: self.pinned_stamp.current,
        }
    }

    /// The error `attempt` ended with the last time it was made, if it failed.
    pub fn known_failure(&self, attempt: &Attempt) -> Option<&Error> {
        self.failures.get(attempt)
    }

    pub fn record_failure(&mut self, attempt: Attempt, err: Error) {
        self.failures.insert(attempt, err);
    }

    /// Counts a walk that was not answered from the failure memo.
    pub fn count_walk(&mut self) {
        self.walks += 1;
    }

    /// Walks made so far, memo hits excluded
    pub fn walks(&self) -> usize {
        self.walks
    }
}
