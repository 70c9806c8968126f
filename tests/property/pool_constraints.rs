// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Pool Size Alternatives
//!
//! Whatever sequence of writes, undefines and composites is applied, no pool
//! ever holds both a defined `max-pool-size` and a defined `derive-size`.

use cim_config_model::{Operation, ResourceTree};
use proptest::prelude::*;

use super::{booted, pool};

const POOLS: &[&str] = &["slsb", "mdb"];

fn single_op() -> impl Strategy<Value = Operation> {
    let target = prop::sample::select(POOLS.to_vec()).prop_map(pool);
    let derive = prop::sample::select(vec!["none", "from-worker-pools", "from-cpu-count", "bogus"]);

    (target, 0u8..4, -5i32..200, derive).prop_map(|(address, kind, size, derive)| match kind {
        0 => Operation::write_attribute(address, "max-pool-size", size),
        1 => Operation::write_attribute(address, "derive-size", derive),
        2 => Operation::undefine_attribute(address, "max-pool-size"),
        _ => Operation::undefine_attribute(address, "derive-size"),
    })
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => single_op(),
        1 => prop::collection::vec(single_op(), 1..4).prop_map(Operation::composite),
    ]
}

fn alternatives_hold(tree: &ResourceTree) -> bool {
    POOLS.iter().all(|name| {
        let address = pool(name);
        let max = tree.attribute_get(&address, "max-pool-size").map(|v| v.is_defined());
        let derive = tree.attribute_get(&address, "derive-size").map(|v| v.is_defined());
        !(max == Ok(true) && derive == Ok(true))
    })
}

proptest! {
    /// Property: max-pool-size and derive-size are never both defined
    #[test]
    fn prop_pool_sizes_mutually_exclusive(ops in prop::collection::vec(operation(), 1..24)) {
        let (engine, mut tree) = booted();
        prop_assert!(alternatives_hold(&tree));

        for op in &ops {
            engine.execute(&mut tree, op);
            prop_assert!(alternatives_hold(&tree), "violated after {:?}", op);
        }
    }

    /// Property: a failed operation leaves the tree exactly as it was
    #[test]
    fn prop_failed_operation_has_no_effect(ops in prop::collection::vec(operation(), 1..16)) {
        let (engine, mut tree) = booted();

        for op in &ops {
            let before = tree.clone();
            let outcome = engine.execute(&mut tree, op);
            if !outcome.is_success() {
                prop_assert_eq!(&tree, &before);
            }
        }
    }
}
