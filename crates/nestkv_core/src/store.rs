//! The root transactional container.

use crate::config::Config;
use crate::error::CoreResult;
use crate::map::KeyValueMap;
use crate::transaction::{Propagation, Transaction, Transactional};
use parking_lot::Mutex;
use std::sync::Arc;

/// Owns the committed key-value state and opens root-level transactions.
///
/// Direct operations act on the root map immediately. Transactions opened
/// here snapshot the root map and only touch it when they commit.
///
/// # Thread Safety
///
/// Each individual operation is atomic, but the nesting invariants span
/// several calls. A host sharing a store across threads must serialize
/// whole sessions on it.
///
/// # Example
///
/// ```rust
/// use nestkv_core::Store;
///
/// let store = Store::new();
/// store.set("a", "1");
///
/// let txn = store.begin_transaction().unwrap();
/// txn.delete("a").unwrap();
/// assert_eq!(store.get("a").as_deref(), Some("1"));
///
/// txn.commit().unwrap();
/// assert_eq!(store.get("a"), None);
/// ```
#[derive(Debug)]
pub struct Store {
    root: Arc<Mutex<KeyValueMap>>,
    config: Config,
}

impl Store {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            root: Arc::new(Mutex::new(KeyValueMap::with_capacity(
                config.initial_capacity,
            ))),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the committed value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.root.lock().get(key).map(str::to_owned)
    }

    /// Sets `key` to `value` in the root map.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.root.lock().set(key, value);
    }

    /// Removes `key` from the root map. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.root.lock().delete(key)
    }

    /// Counts the keys in the root map mapped to `value`.
    #[must_use]
    pub fn count(&self, value: &str) -> usize {
        self.root.lock().count(value)
    }

    /// Returns the number of committed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.lock().len()
    }

    /// Returns `true` if no keys are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.lock().is_empty()
    }

    /// Returns all committed entries sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.root.lock().sorted_entries()
    }

    /// Opens a root-level transaction over a snapshot of the committed state.
    ///
    /// On commit, keys the transaction deleted are pruned from the root and
    /// every key in its final state is written. On rollback the root is
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DepthExceeded`](crate::CoreError::DepthExceeded)
    /// if the configured maximum depth is zero.
    pub fn begin_transaction(&self) -> CoreResult<Transaction> {
        let snapshot = self.root.lock().clone();
        Transaction::open(
            snapshot.clone(),
            Propagation::Root {
                root: Arc::downgrade(&self.root),
                snapshot,
            },
            1,
            self.config.max_depth,
        )
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Transactional for Store {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(Store::get(self, key))
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        Store::set(self, key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> CoreResult<bool> {
        Ok(Store::delete(self, key))
    }

    fn count(&self, value: &str) -> CoreResult<usize> {
        Ok(Store::count(self, value))
    }

    fn begin_transaction(&self) -> CoreResult<Transaction> {
        Store::begin_transaction(self)
    }
}
