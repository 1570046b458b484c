//! Transaction state machine.

use super::propagation::Propagation;
use crate::config::ensure_depth;
use crate::error::{CoreError, CoreResult};
use crate::map::KeyValueMap;
use crate::types::{TransactionId, TransactionResult, TransactionState};
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Mutable state of one transaction.
///
/// A child holds a weak link to its parent's frame so that committing the
/// child can hand its final state upward.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Snapshot of the parent plus every set/delete applied since.
    working: KeyValueMap,
    /// Current state.
    state: TransactionState,
    /// The nested transaction that has not been finalized yet, if any.
    open_child: Option<TransactionId>,
    /// Taken exactly once, on commit or rollback.
    propagation: Option<Propagation>,
}

impl Frame {
    fn ensure_open(&self, id: TransactionId) -> CoreResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            state => Err(CoreError::invalid_state(id, state)),
        }
    }

    fn ensure_no_open_child(&self, id: TransactionId) -> CoreResult<()> {
        match self.open_child {
            Some(child) => Err(CoreError::nested_pending(id, child)),
            None => Ok(()),
        }
    }

    /// Takes over the final state of a committed child.
    ///
    /// The child started from a full copy of this frame, so its final state
    /// is this frame's complete post-update view and replaces it verbatim.
    pub(super) fn absorb_child(&mut self, child: TransactionId, state: KeyValueMap) {
        if self.open_child == Some(child) {
            self.working = state;
            self.open_child = None;
        }
    }

    /// Clears the pending-child marker after a rollback.
    pub(super) fn release_child(&mut self, child: TransactionId) {
        if self.open_child == Some(child) {
            self.open_child = None;
        }
    }
}

/// An open unit of work over a snapshot of its parent.
///
/// A transaction sees the state of its parent (the store or an enclosing
/// transaction) as it was when the transaction opened, plus its own writes.
/// Later commits into the parent are invisible to it.
///
/// # Lifecycle
///
/// - Created by [`Store::begin_transaction`](crate::Store::begin_transaction)
///   or [`Transaction::begin_transaction`].
/// - Exactly one of [`commit`](Self::commit) or [`rollback`](Self::rollback)
///   finalizes it; every operation afterwards fails with
///   [`CoreError::InvalidState`].
/// - At most one nested transaction may be outstanding. While it is, this
///   transaction cannot commit, roll back or open another child.
/// - Dropping an open transaction rolls it back.
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
/// let inner = txn.begin_transaction().unwrap();
/// inner.delete("a").unwrap();
/// inner.commit().unwrap();
/// assert_eq!(txn.get("a").unwrap(), None);
///
/// txn.commit().unwrap();
/// assert_eq!(store.get("a"), None);
/// ```
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    depth: usize,
    max_depth: Option<usize>,
    frame: Arc<Mutex<Frame>>,
}

impl Transaction {
    /// Opens a transaction over `working` that propagates through `propagation`.
    pub(crate) fn open(
        working: KeyValueMap,
        propagation: Propagation,
        depth: usize,
        max_depth: Option<usize>,
    ) -> CoreResult<Self> {
        ensure_depth(depth, max_depth)?;
        let id = TransactionId::next();
        debug!(%id, depth, "transaction opened");
        Ok(Self {
            id,
            depth,
            max_depth,
            frame: Arc::new(Mutex::new(Frame {
                working,
                state: TransactionState::Open,
                open_child: None,
                propagation: Some(propagation),
            })),
        })
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the nesting depth; a transaction opened on the store has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.frame.lock().state
    }

    /// Checks if the transaction is still open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == TransactionState::Open
    }

    /// Returns whether a nested transaction is outstanding.
    #[must_use]
    pub fn has_open_child(&self) -> bool {
        self.frame.lock().open_child.is_some()
    }

    /// Returns the value of `key` in this transaction's view.
    pub fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        Ok(frame.working.get(key).map(str::to_owned))
    }

    /// Sets `key` to `value` in this transaction's view.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> CoreResult<()> {
        let mut frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        let key = key.into();
        trace!(id = %self.id, key = %key, "set");
        frame.working.set(key, value);
        Ok(())
    }

    /// Removes `key` from this transaction's view. Returns whether it was present.
    pub fn delete(&self, key: &str) -> CoreResult<bool> {
        let mut frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        trace!(id = %self.id, key, "delete");
        Ok(frame.working.delete(key))
    }

    /// Counts the keys mapped to `value` in this transaction's view.
    pub fn count(&self, value: &str) -> CoreResult<usize> {
        let frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        Ok(frame.working.count(value))
    }

    /// Returns the number of keys in this transaction's view.
    pub fn len(&self) -> CoreResult<usize> {
        let frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        Ok(frame.working.len())
    }

    /// Returns `true` if this transaction's view holds no keys.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a copy of this transaction's current view.
    pub fn working_state(&self) -> CoreResult<KeyValueMap> {
        let frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        Ok(frame.working.clone())
    }

    /// Opens a nested transaction over a snapshot of this one.
    ///
    /// Committing the child replaces this transaction's view with the
    /// child's final view; rolling it back leaves this transaction untouched.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidState`] if this transaction is finalized.
    /// - [`CoreError::NestedTransactionPending`] if a child is already open.
    /// - [`CoreError::DepthExceeded`] if the configured depth would be exceeded.
    pub fn begin_transaction(&self) -> CoreResult<Transaction> {
        let mut frame = self.frame.lock();
        frame.ensure_open(self.id)?;
        frame.ensure_no_open_child(self.id)?;

        let child = Transaction::open(
            frame.working.clone(),
            Propagation::Parent {
                parent: Arc::downgrade(&self.frame),
                parent_id: self.id,
            },
            self.depth + 1,
            self.max_depth,
        )?;
        frame.open_child = Some(child.id);
        Ok(child)
    }

    /// Commits the transaction, handing its view to the parent.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidState`] if already finalized.
    /// - [`CoreError::NestedTransactionPending`] if a child is still open.
    /// - [`CoreError::Detached`] if the parent no longer exists; the
    ///   transaction stays open and can still be rolled back.
    pub fn commit(&self) -> CoreResult<TransactionResult> {
        // Upgrade under the frame lock; the strong handle lives until the
        // state has been handed over.
        let (state, target) = {
            let mut frame = self.frame.lock();
            frame.ensure_open(self.id)?;
            frame.ensure_no_open_child(self.id)?;
            let Some(propagation) = frame.propagation.take() else {
                return Err(CoreError::Detached { id: self.id });
            };
            let target = match propagation.attach() {
                Ok(target) => target,
                Err(propagation) => {
                    frame.propagation = Some(propagation);
                    return Err(CoreError::Detached { id: self.id });
                }
            };
            frame.state = TransactionState::Committed;
            (mem::take(&mut frame.working), target)
        };

        target.on_commit(self.id, state);
        debug!(id = %self.id, depth = self.depth, "transaction committed");
        Ok(TransactionResult::new(self.id))
    }

    /// Rolls the transaction back, discarding its view.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidState`] if already finalized.
    /// - [`CoreError::NestedTransactionPending`] if a child is still open.
    pub fn rollback(&self) -> CoreResult<TransactionResult> {
        let propagation = {
            let mut frame = self.frame.lock();
            frame.ensure_open(self.id)?;
            frame.ensure_no_open_child(self.id)?;
            frame.state = TransactionState::RolledBack;
            frame.working = KeyValueMap::new();
            frame.propagation.take()
        };

        if let Some(propagation) = propagation {
            propagation.on_rollback(self.id);
        }
        debug!(id = %self.id, depth = self.depth, "transaction rolled back");
        Ok(TransactionResult::new(self.id))
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let propagation = {
            let mut frame = self.frame.lock();
            if frame.state != TransactionState::Open {
                return;
            }
            frame.state = TransactionState::RolledBack;
            frame.propagation.take()
        };

        warn!(id = %self.id, depth = self.depth, "open transaction dropped, rolling back");
        if let Some(propagation) = propagation {
            propagation.on_rollback(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    fn store_with(entries: &[(&str, &str)]) -> Store {
        let store = Store::new();
        for (key, value) in entries {
            store.set(*key, *value);
        }
        store
    }

    #[test]
    fn new_transaction_is_open() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        assert!(txn.is_active());
        assert_eq!(txn.state(), TransactionState::Open);
        assert_eq!(txn.depth(), 1);
        assert!(!txn.has_open_child());
    }

    #[test]
    fn reads_see_snapshot_and_own_writes() {
        let store = store_with(&[("a", "1"), ("b", "2")]);
        let txn = store.begin_transaction().unwrap();

        txn.set("a", "11").unwrap();
        assert!(txn.delete("b").unwrap());
        assert!(!txn.delete("missing").unwrap());

        assert_eq!(txn.get("a").unwrap().as_deref(), Some("11"));
        assert_eq!(txn.get("b").unwrap(), None);
        assert_eq!(txn.len().unwrap(), 1);

        // Store untouched until commit.
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn count_tracks_sets_and_deletes() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        txn.set("a", "1").unwrap();
        txn.set("b", "1").unwrap();
        txn.set("c", "2").unwrap();
        assert_eq!(txn.count("1").unwrap(), 2);

        txn.set("b", "2").unwrap();
        assert_eq!(txn.count("1").unwrap(), 1);
        assert_eq!(txn.count("2").unwrap(), 2);

        txn.delete("c").unwrap();
        assert_eq!(txn.count("2").unwrap(), 1);
    }

    #[test]
    fn child_commit_replaces_parent_view() {
        let store = Store::new();
        let parent = store.begin_transaction().unwrap();
        parent.set("a", "1").unwrap();

        let child = parent.begin_transaction().unwrap();
        assert!(parent.has_open_child());
        assert_eq!(child.depth(), 2);
        child.delete("a").unwrap();
        child.set("b", "2").unwrap();
        let _ = child.commit().unwrap();

        assert!(!parent.has_open_child());
        assert_eq!(parent.get("a").unwrap(), None);
        assert_eq!(parent.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn child_rollback_leaves_parent_untouched() {
        let store = Store::new();
        let parent = store.begin_transaction().unwrap();
        parent.set("a", "1").unwrap();

        let child = parent.begin_transaction().unwrap();
        child.set("a", "2").unwrap();
        let _ = child.rollback().unwrap();

        assert!(!parent.has_open_child());
        assert_eq!(parent.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn parent_cannot_finalize_with_open_child() {
        let store = Store::new();
        let parent = store.begin_transaction().unwrap();
        let child = parent.begin_transaction().unwrap();

        let expected = CoreError::nested_pending(parent.id(), child.id());
        assert_eq!(parent.commit().unwrap_err(), expected);
        assert_eq!(parent.rollback().unwrap_err(), expected);
        assert_eq!(parent.begin_transaction().unwrap_err(), expected);
        assert!(parent.is_active());

        let _ = child.commit().unwrap();
        let _ = parent.commit().unwrap();
    }

    #[test]
    fn finalized_transaction_rejects_everything() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        let _ = txn.commit().unwrap();

        assert!(txn.get("a").unwrap_err().is_invalid_state());
        assert!(txn.set("a", "1").unwrap_err().is_invalid_state());
        assert!(txn.delete("a").unwrap_err().is_invalid_state());
        assert!(txn.count("1").unwrap_err().is_invalid_state());
        assert!(txn.len().unwrap_err().is_invalid_state());
        assert!(txn.begin_transaction().unwrap_err().is_invalid_state());
        assert!(txn.commit().unwrap_err().is_invalid_state());
        assert!(txn.rollback().unwrap_err().is_invalid_state());
        assert_eq!(txn.state(), TransactionState::Committed);
    }

    #[test]
    fn rolled_back_transaction_rejects_second_rollback() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        let _ = txn.rollback().unwrap();

        assert_eq!(
            txn.rollback().unwrap_err(),
            CoreError::invalid_state(txn.id(), TransactionState::RolledBack)
        );
        assert!(txn.commit().unwrap_err().is_invalid_state());
    }

    #[test]
    fn result_token_carries_own_id() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        let result = txn.commit().unwrap();
        assert_eq!(result.id(), txn.id());

        let txn = store.begin_transaction().unwrap();
        let result = txn.rollback().unwrap();
        assert_eq!(result.id(), txn.id());
    }

    #[test]
    fn dropping_open_child_releases_parent() {
        let store = Store::new();
        let parent = store.begin_transaction().unwrap();
        {
            let child = parent.begin_transaction().unwrap();
            child.set("a", "1").unwrap();
        }
        assert!(!parent.has_open_child());
        assert_eq!(parent.get("a").unwrap(), None);
        let _ = parent.commit().unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn child_of_dropped_parent_is_detached() {
        let store = Store::new();
        let parent = store.begin_transaction().unwrap();
        let child = parent.begin_transaction().unwrap();
        drop(parent);

        assert_eq!(
            child.commit().unwrap_err(),
            CoreError::Detached { id: child.id() }
        );
        assert!(child.is_active());
        let _ = child.rollback().unwrap();
    }

    #[test]
    fn commit_racing_store_drop_is_all_or_nothing() {
        for _ in 0..64 {
            let store = Store::new();
            let txn = store.begin_transaction().unwrap();
            txn.set("a", "1").unwrap();

            let dropper = std::thread::spawn(move || drop(store));
            let result = txn.commit();
            dropper.join().unwrap();

            match result {
                Ok(token) => {
                    assert_eq!(token.id(), txn.id());
                    assert_eq!(txn.state(), TransactionState::Committed);
                }
                Err(err) => {
                    assert_eq!(err, CoreError::Detached { id: txn.id() });
                    assert!(txn.is_active());
                    let _ = txn.rollback().unwrap();
                }
            }
        }
    }

    #[test]
    fn transaction_outliving_store_is_detached() {
        let store = Store::new();
        let txn = store.begin_transaction().unwrap();
        drop(store);

        assert_eq!(txn.commit().unwrap_err(), CoreError::Detached { id: txn.id() });
        let _ = txn.rollback().unwrap();
    }

    #[test]
    fn working_state_is_a_copy() {
        let store = store_with(&[("a", "1")]);
        let txn = store.begin_transaction().unwrap();
        let mut copy = txn.working_state().unwrap();
        copy.set("a", "2");
        assert_eq!(txn.get("a").unwrap().as_deref(), Some("1"));
    }
}
