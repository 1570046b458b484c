//! Nested, savepoint-style transactions.
//!
//! Every transaction works on its own full copy of its parent's state:
//! - **Isolation**: the copy is taken at open time, so later commits into
//!   the parent are invisible
//! - **Nesting**: a transaction may open one child at a time; children must
//!   be finalized before their parent (strict LIFO)
//! - **Propagation**: committing a child replaces the parent's working
//!   state; committing a root-level transaction merges into the store
//! - **Rollback**: discards the working state and never touches the parent

mod propagation;
mod scope;
mod state;

pub use scope::Transactional;
pub use state::Transaction;

pub(crate) use propagation::Propagation;
