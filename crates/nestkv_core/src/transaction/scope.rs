//! The operation surface shared by the store and transactions.

use super::state::Transaction;
use crate::error::{CoreError, CoreResult};
use crate::types::TransactionResult;

/// Something that holds key-value state and can open transactions over it.
///
/// Implemented by [`Store`](crate::Store) (operations hit the root map) and
/// [`Transaction`] (operations hit its working state). The trait is object
/// safe, so a dispatcher can route commands to `&dyn Transactional` without
/// caring which level is innermost.
pub trait Transactional {
    /// Returns the value of `key`.
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Sets `key` to `value`.
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Removes `key`. Returns whether it was present.
    fn delete(&self, key: &str) -> CoreResult<bool>;

    /// Counts the keys currently mapped to `value`.
    fn count(&self, value: &str) -> CoreResult<usize>;

    /// Opens a transaction over a snapshot of the current state.
    fn begin_transaction(&self) -> CoreResult<Transaction>;

    /// Runs `body` inside a new transaction.
    ///
    /// The block must finalize the transaction it is handed, by commit or
    /// rollback, and return the resulting token. A token belonging to any
    /// other transaction fails with [`CoreError::MismatchedFinalization`];
    /// the unresolved transaction is then rolled back when dropped, as it is
    /// when `body` returns an error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nestkv_core::{Store, Transactional};
    ///
    /// let store = Store::new();
    /// store
    ///     .run_in_transaction(|txn| {
    ///         txn.set("a", "1")?;
    ///         txn.run_in_transaction(|inner| {
    ///             inner.set("b", "2")?;
    ///             inner.commit()
    ///         })?;
    ///         txn.commit()
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(store.get("b").as_deref(), Some("2"));
    /// ```
    fn run_in_transaction<F>(&self, body: F) -> CoreResult<()>
    where
        F: FnOnce(&Transaction) -> CoreResult<TransactionResult>,
        Self: Sized,
    {
        let transaction = self.begin_transaction()?;
        let result = body(&transaction)?;
        if result.id() != transaction.id() {
            return Err(CoreError::mismatched(transaction.id(), result.id()));
        }
        Ok(())
    }
}

impl Transactional for Transaction {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Transaction::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        Transaction::set(self, key, value)
    }

    fn delete(&self, key: &str) -> CoreResult<bool> {
        Transaction::delete(self, key)
    }

    fn count(&self, value: &str) -> CoreResult<usize> {
        Transaction::count(self, value)
    }

    fn begin_transaction(&self) -> CoreResult<Transaction> {
        Transaction::begin_transaction(self)
    }
}
