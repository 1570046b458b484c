//! # nestkv Core
//!
//! In-memory key-value store with nested, savepoint-style transactions.
//!
//! This crate provides:
//! - [`KeyValueMap`], the plain string map every level owns a copy of
//! - [`Store`], the root container holding the committed state
//! - [`Transaction`], a snapshot-isolated unit of work that can nest
//! - [`Transactional`], the surface shared by both, including the scoped
//!   [`run_in_transaction`](Transactional::run_in_transaction) helper
//!
//! All state is memory resident and lost when the store is dropped.
//!
//! ## Example
//!
//! ```rust
//! use nestkv_core::Store;
//!
//! let store = Store::new();
//! store.set("a", "1");
//!
//! let txn = store.begin_transaction().unwrap();
//! let inner = txn.begin_transaction().unwrap();
//! inner.set("a", "2").unwrap();
//! inner.rollback().unwrap();
//! assert_eq!(txn.get("a").unwrap().as_deref(), Some("1"));
//!
//! txn.set("b", "1").unwrap();
//! txn.commit().unwrap();
//! assert_eq!(store.count("1"), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod map;
mod store;
mod transaction;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use map::KeyValueMap;
pub use store::Store;
pub use transaction::{Transaction, Transactional};
pub use types::{TransactionId, TransactionResult, TransactionState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
