// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Attribute Reads
//!
//! - undefine after write reads back the declared default
//! - reads are repeatable and return what was written

use cim_config_model::domain::ModelValue;
use cim_config_model::Operation;
use proptest::prelude::*;
use serde_json::json;

use super::{booted, pool};

fn timeout_unit() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["HOURS", "MINUTES", "SECONDS", "MILLISECONDS"])
}

proptest! {
    /// Property: write then undefine reads the schema default
    #[test]
    fn prop_default_after_undefine(timeout in 1i64..1_000_000, unit in timeout_unit()) {
        let (engine, mut tree) = booted();
        let address = pool("slsb");

        for (name, value, default) in [
            ("timeout", ModelValue::from(timeout), json!(5)),
            ("timeout-unit", ModelValue::from(unit), json!("MINUTES")),
        ] {
            let write = Operation::write_attribute(address.clone(), name, value);
            prop_assert!(engine.execute(&mut tree, &write).is_success());

            let undefine = Operation::undefine_attribute(address.clone(), name);
            prop_assert!(engine.execute(&mut tree, &undefine).is_success());

            let read = engine.execute_read(&tree, &Operation::read_attribute(address.clone(), name));
            prop_assert_eq!(read.result, Some(default));
        }
    }

    /// Property: an attribute without a default reads undefined after undefine
    #[test]
    fn prop_undefined_without_default(target in prop::sample::select(vec!["slsb", "mdb"])) {
        let (engine, mut tree) = booted();
        let ejb3 = cim_config_model::ResourceAddress::parse("/subsystem=ejb3").unwrap();

        let write = Operation::write_attribute(ejb3.clone(), "default-mdb-instance-pool", target);
        prop_assert!(engine.execute(&mut tree, &write).is_success());
        let undefine = Operation::undefine_attribute(ejb3.clone(), "default-mdb-instance-pool");
        prop_assert!(engine.execute(&mut tree, &undefine).is_success());

        let read = engine.execute_read(&tree, &Operation::read_attribute(ejb3, "default-mdb-instance-pool"));
        prop_assert!(read.is_success());
        prop_assert_eq!(read.result_string(), "undefined");
    }

    /// Property: write then read returns the written value, repeatedly
    #[test]
    fn prop_read_after_write(size in 1i32..i32::MAX, reads in 1usize..5) {
        let (engine, mut tree) = booted();
        let address = pool("slsb");

        let write = Operation::write_attribute(address.clone(), "max-pool-size", size);
        prop_assert!(engine.execute(&mut tree, &write).is_success());

        let read = Operation::read_attribute(address, "max-pool-size");
        let first = engine.execute_read(&tree, &read);
        prop_assert_eq!(first.result.clone(), Some(json!(size)));
        for _ in 0..reads {
            prop_assert_eq!(&engine.execute_read(&tree, &read), &first);
        }
    }
}
