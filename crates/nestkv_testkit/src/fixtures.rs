//! Test fixtures and store helpers.

use nestkv_core::{Config, Store, Transaction, Transactional};

/// Creates a store pre-populated with committed entries.
pub fn seeded_store(entries: &[(&str, &str)]) -> Store {
    seeded_store_with_config(entries, Config::default())
}

/// Creates a store with the given configuration and committed entries.
pub fn seeded_store_with_config(entries: &[(&str, &str)], config: Config) -> Store {
    let store = Store::with_config(config);
    for (key, value) in entries {
        store.set(*key, *value);
    }
    store
}

/// Runs a closure against a fresh empty store.
pub fn with_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let store = Store::new();
    f(&store)
}

/// Opens `depth` transactions, each nested in the previous one.
///
/// The first element is the outermost transaction.
pub fn open_chain(store: &Store, depth: usize) -> Vec<Transaction> {
    let mut chain: Vec<Transaction> = Vec::with_capacity(depth);
    for _ in 0..depth {
        let next = match chain.last() {
            Some(parent) => parent.begin_transaction(),
            None => store.begin_transaction(),
        }
        .expect("Failed to begin transaction");
        chain.push(next);
    }
    chain
}

/// Commits every transaction in the chain, innermost first.
pub fn commit_chain(chain: Vec<Transaction>) {
    for transaction in chain.into_iter().rev() {
        let result = transaction.commit().expect("Failed to commit");
        assert_eq!(result.id(), transaction.id());
    }
}

/// Asserts that a scope reports the given value for `key`.
pub fn assert_value(scope: &dyn Transactional, key: &str, expected: Option<&str>) {
    let actual = scope.get(key).expect("Failed to get");
    assert_eq!(actual.as_deref(), expected, "Value mismatch for key {key:?}");
}
