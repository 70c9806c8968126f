// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Add/Remove
//!
//! Adding then removing a resource restores the address set; adding twice
//! without a remove in between is a duplicate.

use cim_config_model::Operation;
use proptest::prelude::*;

use super::{booted, pool};

fn pool_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,12}".prop_filter("name taken by the fixture", |name| name != "slsb" && name != "mdb")
}

proptest! {
    /// Property: add followed by remove leaves the address set unchanged
    #[test]
    fn prop_add_remove_round_trip(name in pool_name(), size in 1i32..500) {
        let (engine, mut tree) = booted();
        let before = tree.addresses();
        let address = pool(&name);

        let add = Operation::add(address.clone()).with_parameter("max-pool-size", size);
        prop_assert!(engine.execute(&mut tree, &add).is_success());
        prop_assert!(tree.contains(&address));

        let duplicate = engine.execute(&mut tree, &add);
        prop_assert!(!duplicate.is_success());
        prop_assert!(duplicate.failure_description().contains("Duplicate"));

        prop_assert!(engine.execute(&mut tree, &Operation::remove(address)).is_success());
        prop_assert_eq!(tree.addresses(), before);
    }

    /// Property: add and remove inside one composite is a no-op
    #[test]
    fn prop_composite_add_remove_is_noop(names in prop::collection::hash_set(pool_name(), 1..5)) {
        let (engine, mut tree) = booted();
        let before = tree.clone();

        let steps = names
            .iter()
            .map(|name| Operation::add(pool(name)))
            .chain(names.iter().map(|name| Operation::remove(pool(name))))
            .collect();
        prop_assert!(engine.execute(&mut tree, &Operation::composite(steps)).is_success());
        prop_assert_eq!(tree, before);
    }
}
