//! Property-based test generators using proptest.
//!
//! Keys and values are drawn from tiny alphabets so that random sequences
//! keep hitting the same keys, overwrite values and delete existing entries.

use proptest::prelude::*;

/// One operation against the innermost scope of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Set a key.
    Set {
        /// Key to write.
        key: String,
        /// Value to store.
        value: String,
    },
    /// Read a key.
    Get {
        /// Key to read.
        key: String,
    },
    /// Delete a key.
    Delete {
        /// Key to remove.
        key: String,
    },
    /// Count keys holding a value.
    Count {
        /// Value to count.
        value: String,
    },
    /// Open a nested transaction.
    Begin,
    /// Commit the innermost transaction.
    Commit,
    /// Roll back the innermost transaction.
    Rollback,
}

impl Op {
    /// Shorthand for [`Op::Set`].
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Strategy for generating keys from a small alphabet.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]").expect("Invalid regex")
}

/// Strategy for generating values from a small alphabet.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-3]").expect("Invalid regex")
}

/// Strategy for generating a single operation.
pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(key, value)| Op::Set { key, value }),
        2 => key_strategy().prop_map(|key| Op::Get { key }),
        2 => key_strategy().prop_map(|key| Op::Delete { key }),
        1 => value_strategy().prop_map(|value| Op::Count { value }),
        2 => Just(Op::Begin),
        1 => Just(Op::Commit),
        1 => Just(Op::Rollback),
    ]
}

/// Strategy for generating data-only operations (no transaction control).
pub fn data_op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key_strategy(), value_strategy()).prop_map(|(key, value)| Op::Set { key, value }),
        2 => key_strategy().prop_map(|key| Op::Delete { key }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn op_sequence_strategy(min_ops: usize, max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), min_ops..max_ops)
}

/// Strategy for generating an initial set of committed entries.
pub fn seed_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..6)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn keys_are_single_letters(key in key_strategy()) {
            prop_assert_eq!(key.len(), 1);
            prop_assert!(('a'..='e').contains(&key.chars().next().unwrap()));
        }

        #[test]
        fn data_ops_never_control_transactions(op in data_op_strategy()) {
            let is_data = matches!(op, Op::Set { .. } | Op::Delete { .. });
            prop_assert!(is_data, "unexpected control op {:?}", op);
        }

        #[test]
        fn sequences_respect_bounds(ops in op_sequence_strategy(3, 10)) {
            prop_assert!(ops.len() >= 3 && ops.len() < 10);
        }
    }
}
