//! # nestkv Testkit
//!
//! Test utilities for nestkv.
//!
//! This crate provides:
//! - Store fixtures and transaction chain helpers
//! - Property-based test generators using proptest
//! - A reference model of the nesting semantics
//! - A lockstep harness checking the real store against the model
//! - Fuzz testing harnesses
//! - Named scenario vectors
//!
//! ## Usage
//!
//! ```rust
//! use nestkv_testkit::prelude::*;
//!
//! let mut check = ModelCheck::new();
//! check.apply(&Op::set("a", "1"));
//! check.apply(&Op::Begin);
//! check.apply(&Op::Delete { key: "a".into() });
//! check.apply(&Op::Commit);
//! check.verify();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod model;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::model::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use model::*;
pub use vectors::*;
