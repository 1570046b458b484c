//! Reference model of the nesting semantics.
//!
//! The model is a plain stack of maps: level 0 is the committed state and
//! each open transaction is a full copy pushed on top. It has no ids, no
//! lifecycle checks and no propagation machinery, which makes it easy to
//! trust as an oracle for single-chain sessions.

use crate::generators::Op;
use std::collections::BTreeMap;

/// Observable result of applying an [`Op`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation has no result.
    Done,
    /// Result of a get.
    Value(Option<String>),
    /// Result of a delete.
    Deleted(bool),
    /// Result of a count.
    Count(usize),
    /// Commit or rollback without an open transaction.
    NoTransaction,
}

/// A stack-of-maps model of a store with one chain of nested transactions.
#[derive(Debug, Clone)]
pub struct ModelStore {
    levels: Vec<BTreeMap<String, String>>,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self {
            levels: vec![BTreeMap::new()],
        }
    }
}

impl ModelStore {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open transactions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Returns the committed state.
    #[must_use]
    pub fn committed(&self) -> &BTreeMap<String, String> {
        &self.levels[0]
    }

    /// Returns the innermost view.
    #[must_use]
    pub fn current(&self) -> &BTreeMap<String, String> {
        self.levels.last().unwrap_or(&self.levels[0])
    }

    fn top(&mut self) -> &mut BTreeMap<String, String> {
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    /// Applies one operation.
    pub fn apply(&mut self, op: &Op) -> Outcome {
        match op {
            Op::Set { key, value } => {
                self.top().insert(key.clone(), value.clone());
                Outcome::Done
            }
            Op::Get { key } => Outcome::Value(self.current().get(key).cloned()),
            Op::Delete { key } => Outcome::Deleted(self.top().remove(key).is_some()),
            Op::Count { value } => {
                Outcome::Count(self.current().values().filter(|v| *v == value).count())
            }
            Op::Begin => {
                let copy = self.current().clone();
                self.levels.push(copy);
                Outcome::Done
            }
            Op::Commit => {
                if self.depth() == 0 {
                    return Outcome::NoTransaction;
                }
                let finished = self.levels.pop().unwrap_or_default();
                *self.top() = finished;
                Outcome::Done
            }
            Op::Rollback => {
                if self.depth() == 0 {
                    return Outcome::NoTransaction;
                }
                self.levels.pop();
                Outcome::Done
            }
        }
    }
}
