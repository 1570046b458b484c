//! Lockstep harness running the real store next to the reference model.

use crate::generators::Op;
use crate::model::{ModelStore, Outcome};
use nestkv_core::{Config, Store, Transaction, Transactional};

/// Drives a [`Store`] and a [`ModelStore`] with the same operations.
///
/// Every operation is applied to both, and the observable outcomes are
/// asserted equal. [`ModelCheck::verify`] compares the full committed state
/// and the innermost view.
pub struct ModelCheck {
    /// The store under test.
    pub store: Store,
    transactions: Vec<Transaction>,
    model: ModelStore,
    applied: usize,
}

impl Default for ModelCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCheck {
    /// Creates a harness over an empty store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a harness over an empty store with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            store: Store::with_config(config),
            transactions: Vec::new(),
            model: ModelStore::new(),
            applied: 0,
        }
    }

    /// Returns the number of open transactions.
    pub fn depth(&self) -> usize {
        self.transactions.len()
    }

    /// Returns the reference model.
    pub fn model(&self) -> &ModelStore {
        &self.model
    }

    /// Returns the number of operations applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    fn active(&self) -> &dyn Transactional {
        match self.transactions.last() {
            Some(transaction) => transaction,
            None => &self.store,
        }
    }

    fn run(&mut self, op: &Op) -> Outcome {
        match op {
            Op::Set { key, value } => {
                self.active().set(key, value).expect("Failed to set");
                Outcome::Done
            }
            Op::Get { key } => Outcome::Value(self.active().get(key).expect("Failed to get")),
            Op::Delete { key } => {
                Outcome::Deleted(self.active().delete(key).expect("Failed to delete"))
            }
            Op::Count { value } => {
                Outcome::Count(self.active().count(value).expect("Failed to count"))
            }
            Op::Begin => {
                let transaction = self
                    .active()
                    .begin_transaction()
                    .expect("Failed to begin transaction");
                self.transactions.push(transaction);
                Outcome::Done
            }
            Op::Commit => match self.transactions.pop() {
                Some(transaction) => {
                    let result = transaction.commit().expect("Failed to commit");
                    assert_eq!(result.id(), transaction.id());
                    Outcome::Done
                }
                None => Outcome::NoTransaction,
            },
            Op::Rollback => match self.transactions.pop() {
                Some(transaction) => {
                    let result = transaction.rollback().expect("Failed to roll back");
                    assert_eq!(result.id(), transaction.id());
                    Outcome::Done
                }
                None => Outcome::NoTransaction,
            },
        }
    }

    /// Applies an operation to both sides and asserts the outcomes match.
    pub fn apply(&mut self, op: &Op) -> Outcome {
        let actual = self.run(op);
        let expected = self.model.apply(op);
        assert_eq!(
            actual, expected,
            "Outcome mismatch for {:?} at step {}",
            op, self.applied
        );
        self.applied += 1;
        actual
    }

    /// Applies every operation in order.
    pub fn apply_all(&mut self, ops: &[Op]) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Asserts that the committed state and the innermost view match the model.
    pub fn verify(&self) {
        assert_eq!(self.transactions.len(), self.model.depth(), "Depth mismatch");

        let committed: Vec<_> = self
            .model
            .committed()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(self.store.entries(), committed, "Committed state mismatch");

        if let Some(innermost) = self.transactions.last() {
            let view = innermost
                .working_state()
                .expect("Failed to read working state");
            let expected: Vec<_> = self
                .model
                .current()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            assert_eq!(view.sorted_entries(), expected, "Innermost view mismatch");
        }

        for transaction in &self.transactions {
            assert!(transaction.is_active());
        }
        for pair in self.transactions.windows(2) {
            assert!(pair[0].has_open_child());
            assert!(pair[0].id() < pair[1].id());
        }
        if let Some(innermost) = self.transactions.last() {
            assert!(!innermost.has_open_child());
        }
    }

    /// Rolls back every open transaction, innermost first.
    pub fn unwind(&mut self) {
        while let Some(transaction) = self.transactions.pop() {
            let result = transaction.rollback().expect("Failed to roll back");
            assert_eq!(result.id(), transaction.id());
            self.model.apply(&Op::Rollback);
        }
    }
}
