//! Named scenarios with known final states.
//!
//! Each scenario seeds the store, runs a fixed operation list through the
//! lockstep harness and states the committed entries expected afterwards.
//! Transactions still open at the end are rolled back before comparing.

use crate::generators::Op;
use crate::integration::ModelCheck;

/// A fixed operation list and its expected outcome.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Short identifier.
    pub name: &'static str,
    /// Entries committed before the scenario starts.
    pub seed: &'static [(&'static str, &'static str)],
    /// Operations to apply.
    pub ops: Vec<Op>,
    /// Committed entries after the scenario, sorted by key.
    pub expected: &'static [(&'static str, &'static str)],
}

fn get(key: &str) -> Op {
    Op::Get { key: key.into() }
}

fn delete(key: &str) -> Op {
    Op::Delete { key: key.into() }
}

fn count(value: &str) -> Op {
    Op::Count { value: value.into() }
}

/// Returns all built-in scenarios.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "count_tracks_overwrites",
            seed: &[],
            ops: vec![
                Op::set("a", "1"),
                Op::set("b", "1"),
                Op::set("a", "2"),
                count("1"),
                delete("b"),
                count("1"),
            ],
            expected: &[("a", "2")],
        },
        Scenario {
            name: "nested_commit_replaces_parent",
            seed: &[("a", "1")],
            ops: vec![
                Op::Begin,
                Op::Begin,
                delete("a"),
                Op::set("b", "2"),
                Op::Commit,
                get("a"),
                Op::Commit,
            ],
            expected: &[("b", "2")],
        },
        Scenario {
            name: "rollback_keeps_parent",
            seed: &[],
            ops: vec![
                Op::Begin,
                Op::set("a", "1"),
                Op::Begin,
                Op::set("a", "2"),
                Op::Rollback,
                get("a"),
                Op::Commit,
            ],
            expected: &[("a", "1")],
        },
        Scenario {
            name: "root_commit_prunes_deleted",
            seed: &[("a", "1"), ("b", "2")],
            ops: vec![Op::Begin, delete("a"), Op::Commit, get("a")],
            expected: &[("b", "2")],
        },
        Scenario {
            name: "outer_rollback_discards_inner_commit",
            seed: &[("a", "1")],
            ops: vec![
                Op::Begin,
                Op::Begin,
                Op::set("a", "3"),
                Op::Commit,
                Op::Rollback,
            ],
            expected: &[("a", "1")],
        },
        Scenario {
            name: "unfinished_transactions_are_discarded",
            seed: &[("a", "1")],
            ops: vec![Op::Begin, Op::set("a", "2"), Op::Begin, delete("a")],
            expected: &[("a", "1")],
        },
        Scenario {
            name: "finalize_without_transaction",
            seed: &[("a", "1")],
            ops: vec![Op::Commit, Op::Rollback, Op::set("b", "1"), count("1")],
            expected: &[("a", "1"), ("b", "1")],
        },
    ]
}

/// Runs a scenario and returns the committed entries.
pub fn run_scenario(scenario: &Scenario) -> Vec<(String, String)> {
    let mut check = ModelCheck::new();
    for (key, value) in scenario.seed {
        check.apply(&Op::set(*key, *value));
    }
    check.apply_all(&scenario.ops);
    check.verify();
    check.unwind();
    check.verify();
    check.store.entries()
}

/// Runs a scenario and asserts its expected entries.
pub fn verify_scenario(scenario: &Scenario) {
    let expected: Vec<(String, String)> = scenario
        .expected
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    assert_eq!(
        run_scenario(scenario),
        expected,
        "Scenario {} failed",
        scenario.name
    );
}
