//! Error types for nestkv core.

use crate::types::{TransactionId, TransactionState};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in nestkv core operations.
///
/// None of these are recoverable inside the store. They always indicate a
/// protocol violation by the caller and surface immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Operation attempted on a transaction that was already finalized.
    #[error("transaction {id} is no longer open (state: {state})")]
    InvalidState {
        /// The finalized transaction.
        id: TransactionId,
        /// The terminal state it is in.
        state: TransactionState,
    },

    /// Commit, rollback or a second begin attempted while a nested
    /// transaction is still outstanding.
    #[error("transaction {id} has an unfinished inner transaction {child}, finalize it first")]
    NestedTransactionPending {
        /// The transaction the operation was attempted on.
        id: TransactionId,
        /// The outstanding inner transaction.
        child: TransactionId,
    },

    /// A scoped block resolved a different transaction than the one it was given.
    #[error("committing or discarding wrong transaction: expected {expected}, got {actual}")]
    MismatchedFinalization {
        /// The transaction opened for the block.
        expected: TransactionId,
        /// The transaction the returned result belongs to.
        actual: TransactionId,
    },

    /// The parent transaction or store was dropped before this transaction committed.
    #[error("transaction {id} outlived its parent and can only be rolled back")]
    Detached {
        /// The orphaned transaction.
        id: TransactionId,
    },

    /// Opening a transaction would exceed the configured nesting depth.
    #[error("nesting depth {depth} exceeds the configured maximum of {max}")]
    DepthExceeded {
        /// Depth the new transaction would have had.
        depth: usize,
        /// Configured maximum depth.
        max: usize,
    },
}

impl CoreError {
    /// Creates an invalid state error.
    pub fn invalid_state(id: TransactionId, state: TransactionState) -> Self {
        Self::InvalidState { id, state }
    }

    /// Creates a nested transaction pending error.
    pub fn nested_pending(id: TransactionId, child: TransactionId) -> Self {
        Self::NestedTransactionPending { id, child }
    }

    /// Creates a mismatched finalization error.
    pub fn mismatched(expected: TransactionId, actual: TransactionId) -> Self {
        Self::MismatchedFinalization { expected, actual }
    }

    /// Returns `true` for errors raised on an already finalized transaction.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
