//! Routes commands to the innermost open transaction or the store.

use crate::commands::Command;
use nestkv_core::{CoreResult, Store, Transaction, TransactionId, Transactional};
use tracing::debug;

/// What the interpreter should report after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to print.
    Done,
    /// The value of the requested key.
    Value(String),
    /// The key was absent.
    KeyNotSet,
    /// Result of `COUNT`.
    Count(usize),
    /// `COMMIT` or `ROLLBACK` without an open transaction.
    NoTransaction,
    /// Print the command list.
    Help,
    /// Stop the interpreter.
    Exit,
}

impl Reply {
    /// Text printed for this reply, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Value(value) => Some(value.clone()),
            Self::KeyNotSet => Some("key not set".to_string()),
            Self::Count(count) => Some(count.to_string()),
            Self::NoTransaction => Some("no transaction".to_string()),
            Self::Exit => Some("Exiting...".to_string()),
            Self::Done | Self::Help => None,
        }
    }
}

/// A store plus the stack of transactions opened on it by `BEGIN`.
///
/// The last element of the stack is the innermost open transaction; data
/// commands go there, or to the store when the stack is empty.
#[derive(Debug)]
pub struct Session {
    store: Store,
    transactions: Vec<Transaction>,
}

impl Session {
    /// Creates a session over `store` with no open transactions.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            transactions: Vec::new(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the number of open transactions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.transactions.len()
    }

    fn active(&self) -> &dyn Transactional {
        match self.transactions.last() {
            Some(transaction) => transaction,
            None => &self.store,
        }
    }

    /// Opens a transaction on the innermost scope.
    pub fn begin(&mut self) -> CoreResult<TransactionId> {
        let transaction = self.active().begin_transaction()?;
        let id = transaction.id();
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Commits the innermost transaction. Returns `None` if there is none.
    pub fn commit(&mut self) -> CoreResult<Option<TransactionId>> {
        match self.transactions.pop() {
            Some(transaction) => Ok(Some(transaction.commit()?.id())),
            None => Ok(None),
        }
    }

    /// Rolls back the innermost transaction. Returns `None` if there is none.
    pub fn rollback(&mut self) -> CoreResult<Option<TransactionId>> {
        match self.transactions.pop() {
            Some(transaction) => Ok(Some(transaction.rollback()?.id())),
            None => Ok(None),
        }
    }

    /// Runs one command.
    pub fn execute(&mut self, command: Command) -> CoreResult<Reply> {
        debug!(command = command.kind().name(), depth = self.depth(), "execute");
        let reply = match command {
            Command::Set { key, value } => {
                self.active().set(&key, &value)?;
                Reply::Done
            }
            Command::Get { key } => match self.active().get(&key)? {
                Some(value) => Reply::Value(value),
                None => Reply::KeyNotSet,
            },
            Command::Delete { key } => {
                if self.active().delete(&key)? {
                    Reply::Done
                } else {
                    Reply::KeyNotSet
                }
            }
            Command::Count { value } => Reply::Count(self.active().count(&value)?),
            Command::Begin => {
                self.begin()?;
                Reply::Done
            }
            Command::Commit => match self.commit()? {
                Some(_) => Reply::Done,
                None => Reply::NoTransaction,
            },
            Command::Rollback => match self.rollback()? {
                Some(_) => Reply::Done,
                None => Reply::NoTransaction,
            },
            Command::Help => Reply::Help,
            Command::Exit => Reply::Exit,
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> Reply {
        session.execute(Command::parse(line).unwrap()).unwrap()
    }

    #[test]
    fn data_commands_without_transaction_hit_store() {
        let mut session = Session::new(Store::new());
        assert_eq!(run(&mut session, "SET a 1"), Reply::Done);
        assert_eq!(run(&mut session, "GET a"), Reply::Value("1".into()));
        assert_eq!(run(&mut session, "COUNT 1"), Reply::Count(1));
        assert_eq!(run(&mut session, "DELETE a"), Reply::Done);
        assert_eq!(run(&mut session, "DELETE a"), Reply::KeyNotSet);
        assert_eq!(run(&mut session, "GET a"), Reply::KeyNotSet);
        assert!(session.store().is_empty());
    }

    #[test]
    fn nested_begin_commit_rollback() {
        let mut session = Session::new(Store::new());
        run(&mut session, "SET a 1");
        run(&mut session, "BEGIN");
        run(&mut session, "SET a 2");
        run(&mut session, "BEGIN");
        assert_eq!(session.depth(), 2);
        run(&mut session, "SET a 3");
        assert_eq!(run(&mut session, "GET a"), Reply::Value("3".into()));

        assert_eq!(run(&mut session, "ROLLBACK"), Reply::Done);
        assert_eq!(run(&mut session, "GET a"), Reply::Value("2".into()));
        assert_eq!(session.store().get("a").as_deref(), Some("1"));

        assert_eq!(run(&mut session, "COMMIT"), Reply::Done);
        assert_eq!(session.depth(), 0);
        assert_eq!(session.store().get("a").as_deref(), Some("2"));
    }

    #[test]
    fn finalize_without_transaction() {
        let mut session = Session::new(Store::new());
        assert_eq!(run(&mut session, "COMMIT"), Reply::NoTransaction);
        assert_eq!(run(&mut session, "ROLLBACK"), Reply::NoTransaction);
    }

    #[test]
    fn count_sees_innermost_view() {
        let mut session = Session::new(Store::new());
        run(&mut session, "SET a 1");
        run(&mut session, "BEGIN");
        run(&mut session, "SET b 1");
        run(&mut session, "BEGIN");
        run(&mut session, "DELETE a");
        assert_eq!(run(&mut session, "COUNT 1"), Reply::Count(1));
        run(&mut session, "ROLLBACK");
        assert_eq!(run(&mut session, "COUNT 1"), Reply::Count(2));
    }

    #[test]
    fn begin_reports_depth_limit() {
        let store = Store::with_config(nestkv_core::Config::new().max_depth(Some(1)));
        let mut session = Session::new(store);
        session.begin().unwrap();
        assert!(matches!(
            session.begin(),
            Err(nestkv_core::CoreError::DepthExceeded { depth: 2, max: 1 })
        ));
        assert_eq!(session.depth(), 1);
    }

    #[test]
    fn replies_render_like_the_interpreter() {
        assert_eq!(Reply::KeyNotSet.message().as_deref(), Some("key not set"));
        assert_eq!(Reply::Count(3).message().as_deref(), Some("3"));
        assert_eq!(
            Reply::NoTransaction.message().as_deref(),
            Some("no transaction")
        );
        assert_eq!(Reply::Done.message(), None);
        assert_eq!(Reply::Help.message(), None);
    }
}
