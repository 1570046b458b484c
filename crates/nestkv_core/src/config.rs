//! Store configuration.

use crate::error::{CoreError, CoreResult};

/// Configuration for creating a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum transaction nesting depth (`None` = unlimited).
    ///
    /// A transaction opened on the store has depth 1, its child depth 2,
    /// and so on.
    pub max_depth: Option<usize>,

    /// Capacity hint for the root map.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: None,
            initial_capacity: 0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the capacity hint for the root map.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// Fails when `depth` is beyond `max_depth`.
pub(crate) fn ensure_depth(depth: usize, max_depth: Option<usize>) -> CoreResult<()> {
    match max_depth {
        Some(max) if depth > max => Err(CoreError::DepthExceeded { depth, max }),
        _ => Ok(()),
    }
}
