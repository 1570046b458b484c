//! Upward propagation of finalized transaction state.

use super::state::Frame;
use crate::map::KeyValueMap;
use crate::types::TransactionId;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// What happens to a transaction's working state when it is finalized.
///
/// There are exactly two shapes: a root-level transaction merges into the
/// store's map, a nested transaction replaces its parent's working state.
/// Rollback never transfers state; for a nested transaction it only clears
/// the parent's pending-child marker.
///
/// Both targets are held weakly: the link is used to hand off state, never
/// to keep the parent alive.
#[derive(Debug)]
pub(crate) enum Propagation {
    /// Merge into the store's root map.
    Root {
        /// The store's root map.
        root: Weak<Mutex<KeyValueMap>>,
        /// Copy of the root map taken when the transaction opened.
        snapshot: KeyValueMap,
    },
    /// Replace the parent transaction's working state.
    Parent {
        /// The parent's frame.
        parent: Weak<Mutex<Frame>>,
        /// The parent's id, for diagnostics.
        parent_id: TransactionId,
    },
}

impl Propagation {
    /// Upgrades the weak link to the target.
    ///
    /// Returns the propagation unchanged if the target no longer exists.
    pub(crate) fn attach(self) -> Result<Target, Self> {
        match self {
            Self::Root { root, snapshot } => match root.upgrade() {
                Some(map) => Ok(Target::Root {
                    root: map,
                    snapshot,
                }),
                None => Err(Self::Root { root, snapshot }),
            },
            Self::Parent { parent, parent_id } => match parent.upgrade() {
                Some(frame) => Ok(Target::Parent { parent: frame }),
                None => Err(Self::Parent { parent, parent_id }),
            },
        }
    }

    /// Releases the target after `id` was rolled back.
    pub(crate) fn on_rollback(self, id: TransactionId) {
        if let Self::Parent { parent, .. } = self {
            if let Some(frame) = parent.upgrade() {
                frame.lock().release_child(id);
            }
        }
    }
}

/// A propagation target held alive for the duration of a commit.
#[derive(Debug)]
pub(crate) enum Target {
    /// The store's root map.
    Root {
        /// The root map.
        root: Arc<Mutex<KeyValueMap>>,
        /// Copy of the root map taken when the transaction opened.
        snapshot: KeyValueMap,
    },
    /// The parent transaction's frame.
    Parent {
        /// The parent's frame.
        parent: Arc<Mutex<Frame>>,
    },
}

impl Target {
    /// Hands the final working state of `id` to the target.
    pub(crate) fn on_commit(self, id: TransactionId, state: KeyValueMap) {
        match self {
            Self::Root { root, snapshot } => merge_into_root(&mut root.lock(), &snapshot, state),
            Self::Parent { parent } => parent.lock().absorb_child(id, state),
        }
    }
}

/// Applies a root-level transaction's final state to the store.
///
/// Keys that were in the snapshot but are gone from `state` were deleted by
/// the transaction and are pruned from the root. Every key in `state` is
/// written over whatever the root holds. Keys the transaction never saw
/// (committed by others after the snapshot) are left alone.
pub(crate) fn merge_into_root(root: &mut KeyValueMap, snapshot: &KeyValueMap, state: KeyValueMap) {
    for key in snapshot.keys() {
        if !state.contains_key(key) {
            root.delete(key);
        }
    }
    for (key, value) in state {
        root.set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> KeyValueMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn merge_applies_sets_and_updates() {
        let mut root = map(&[("a", "1")]);
        let snapshot = root.clone();
        merge_into_root(&mut root, &snapshot, map(&[("a", "2"), ("b", "3")]));
        assert_eq!(root, map(&[("a", "2"), ("b", "3")]));
    }

    #[test]
    fn merge_prunes_deleted_keys() {
        let mut root = map(&[("a", "1"), ("b", "2")]);
        let snapshot = root.clone();
        merge_into_root(&mut root, &snapshot, map(&[("b", "2")]));
        assert_eq!(root, map(&[("b", "2")]));
    }

    #[test]
    fn merge_keeps_keys_committed_after_snapshot() {
        let snapshot = map(&[("a", "1")]);
        // Another transaction added "z" after the snapshot was taken.
        let mut root = map(&[("a", "1"), ("z", "9")]);
        merge_into_root(&mut root, &snapshot, map(&[("a", "1"), ("b", "2")]));
        assert_eq!(root, map(&[("a", "1"), ("b", "2"), ("z", "9")]));
    }

    #[test]
    fn attach_fails_once_root_is_dropped() {
        let root = Arc::new(Mutex::new(KeyValueMap::new()));
        let propagation = Propagation::Root {
            root: Arc::downgrade(&root),
            snapshot: KeyValueMap::new(),
        };
        drop(root);
        assert!(matches!(
            propagation.attach(),
            Err(Propagation::Root { .. })
        ));
    }

    #[test]
    fn attached_target_keeps_root_alive_until_commit() {
        let root = Arc::new(Mutex::new(map(&[("a", "1")])));
        let propagation = Propagation::Root {
            root: Arc::downgrade(&root),
            snapshot: map(&[("a", "1")]),
        };
        let target = propagation.attach().unwrap();
        assert_eq!(Arc::strong_count(&root), 2);

        target.on_commit(TransactionId::new(1), map(&[("b", "2")]));
        assert_eq!(Arc::strong_count(&root), 1);
        assert_eq!(*root.lock(), map(&[("b", "2")]));
    }
}
