//! Fuzz testing harnesses for nestkv.
//!
//! These targets take arbitrary bytes so they can be wired into cargo-fuzz
//! or driven from proptest.

use crate::generators::Op;
use crate::integration::ModelCheck;
use nestkv_core::{Config, CoreError, Store, Transaction, TransactionState};

const KEYS: [&str; 5] = ["a", "b", "c", "d", "e"];
const VALUES: [&str; 4] = ["0", "1", "2", "3"];

/// Decodes one operation per input byte.
///
/// The low three bits select the operation; the remaining bits pick the
/// key and value.
pub fn parse_ops(data: &[u8]) -> Vec<Op> {
    data.iter()
        .map(|&byte| {
            let key = KEYS[usize::from(byte >> 3) % KEYS.len()].to_string();
            let value = VALUES[usize::from(byte >> 5) % VALUES.len()].to_string();
            match byte & 0x07 {
                0 | 1 => Op::Set { key, value },
                2 => Op::Get { key },
                3 => Op::Delete { key },
                4 => Op::Count { value },
                5 => Op::Begin,
                6 => Op::Commit,
                _ => Op::Rollback,
            }
        })
        .collect()
}

/// Fuzz target for well-formed transaction sequences.
///
/// Runs the decoded operations through [`ModelCheck`], so any divergence
/// from the reference model panics.
pub fn fuzz_transaction_operations(data: &[u8]) {
    let mut check = ModelCheck::new();
    for op in parse_ops(data) {
        check.apply(&op);
    }
    check.verify();
}

/// Fuzz target for lifecycle misuse.
///
/// Keeps every transaction ever opened, including finalized ones, and
/// issues operations against arbitrary entries. Every call must either
/// succeed or fail with a lifecycle error; nothing may panic and a
/// finalized transaction must stay finalized.
pub fn fuzz_lifecycle_misuse(data: &[u8]) {
    let store = Store::with_config(Config::new().max_depth(Some(8)));
    let mut transactions: Vec<Transaction> = Vec::new();

    for pair in data.chunks(2) {
        let action = pair[0] % 8;
        let target = pair.get(1).map_or(0, |b| usize::from(*b));
        let key = KEYS[target % KEYS.len()];

        if transactions.is_empty() || action == 0 {
            if let Ok(txn) = store.begin_transaction() {
                transactions.push(txn);
            }
            continue;
        }

        let index = target % transactions.len();
        let before = transactions[index].state();
        let result = match action {
            1 => match transactions[index].begin_transaction() {
                Ok(child) => {
                    transactions.push(child);
                    Ok(())
                }
                Err(err) => Err(err),
            },
            2 => transactions[index].commit().map(|_| ()),
            3 => transactions[index].rollback().map(|_| ()),
            4 => transactions[index].set(key, "1"),
            5 => transactions[index].delete(key).map(|_| ()),
            6 => transactions[index].get(key).map(|_| ()),
            _ => {
                drop(transactions.swap_remove(index));
                continue;
            }
        };

        match result {
            Ok(()) => {}
            Err(
                CoreError::InvalidState { .. }
                | CoreError::NestedTransactionPending { .. }
                | CoreError::Detached { .. }
                | CoreError::DepthExceeded { .. },
            ) => {}
            Err(err) => panic!("Unexpected error: {err}"),
        }

        if before.is_terminal() {
            assert_eq!(transactions[index].state(), before);
        }
    }

    drop(transactions);
    let txn = store
        .begin_transaction()
        .expect("Store unusable after misuse");
    assert_eq!(txn.state(), TransactionState::Open);
    let result = txn.commit().expect("Failed to commit");
    assert_eq!(result.id(), txn.id());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ops_covers_every_kind() {
        let ops = parse_ops(&[0, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(ops[0], Op::Set { .. }));
        assert!(matches!(ops[1], Op::Get { .. }));
        assert!(matches!(ops[2], Op::Delete { .. }));
        assert!(matches!(ops[3], Op::Count { .. }));
        assert_eq!(&ops[4..], &[Op::Begin, Op::Commit, Op::Rollback]);
    }

    #[test]
    fn fuzz_empty_input() {
        fuzz_transaction_operations(&[]);
        fuzz_lifecycle_misuse(&[]);
    }

    #[test]
    fn fuzz_fixed_inputs() {
        let inputs: [&[u8]; 4] = [
            &[0x05, 0x08, 0x05, 0x13, 0x06, 0x07],
            &[0x06, 0x07, 0x05, 0x06],
            &[0xff; 32],
            &[0x05; 16],
        ];
        for data in inputs {
            fuzz_transaction_operations(data);
            fuzz_lifecycle_misuse(data);
        }
    }

    #[test]
    fn fuzz_misuse_sequences() {
        // begin, begin child of 0, commit 0 (pending), drop 0, commit child
        fuzz_lifecycle_misuse(&[0, 0, 1, 0, 2, 0, 7, 0, 2, 0]);
        // repeated commit and rollback of the same transaction
        fuzz_lifecycle_misuse(&[0, 0, 2, 0, 2, 0, 3, 0, 4, 0]);
    }
}
