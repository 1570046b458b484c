//! Core type definitions for nestkv.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide source of transaction ids.
static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transaction.
///
/// Transaction IDs are monotonically increasing across the whole process,
/// regardless of which store or nesting level opened the transaction, and
/// are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Creates a new transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-wide ID.
    pub(crate) fn next() -> Self {
        Self(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Transaction is open and accepts operations.
    Open,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    RolledBack,
}

impl TransactionState {
    /// Returns `true` once the transaction has been committed or rolled back.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}

/// Token returned by a successful commit or rollback.
///
/// It only carries the id of the finalized transaction and exists so that
/// scoped blocks can prove they resolved the transaction they were handed.
/// Tokens can only be produced by finalizing a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "scoped transaction blocks must return the result of commit or rollback"]
pub struct TransactionResult {
    id: TransactionId,
}

impl TransactionResult {
    pub(crate) const fn new(id: TransactionId) -> Self {
        Self { id }
    }

    /// Returns the id of the finalized transaction.
    #[must_use]
    pub const fn id(self) -> TransactionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_ordering() {
        let t1 = TransactionId::new(1);
        let t2 = TransactionId::new(2);
        assert!(t1 < t2);
    }

    #[test]
    fn allocated_ids_strictly_increase() {
        let first = TransactionId::next();
        let second = TransactionId::next();
        let third = TransactionId::next();
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn transaction_id_display() {
        assert_eq!(format!("{}", TransactionId::new(42)), "txn:42");
    }

    #[test]
    fn terminal_states() {
        assert!(!TransactionState::Open.is_terminal());
        assert!(TransactionState::Committed.is_terminal());
        assert!(TransactionState::RolledBack.is_terminal());
    }

    #[test]
    fn result_carries_id() {
        let result = TransactionResult::new(TransactionId::new(9));
        assert_eq!(result.id(), TransactionId::new(9));
    }
}
