// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Runs the operation engine directly against a tree booted from a fixed
//! ejb3 document; no async runtime is involved.

mod attribute_semantics;
mod pool_constraints;
mod tree_round_trip;

use cim_config_model::boot::boot_operations;
use cim_config_model::domain::ExpressionResolver;
use cim_config_model::subsystems::standard_model;
use cim_config_model::{Operation, OperationEngine, ResourceAddress, ResourceTree};

pub const POOLS_XML: &str = r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0" default-slsb-instance-pool="slsb">
    <strict-max-bean-instance-pool name="slsb" max-pool-size="20"/>
    <strict-max-bean-instance-pool name="mdb" derive-size="from-cpu-count"/>
</subsystem>"#;

pub fn booted() -> (OperationEngine, ResourceTree) {
    let model = standard_model().expect("Subsystem registration failed");
    let engine = OperationEngine::new(model.schema().clone(), ExpressionResolver::default());
    let mut tree = ResourceTree::new();
    let ops = boot_operations(&model, POOLS_XML).expect("Fixture document rejected");
    let outcome = engine.execute(&mut tree, &Operation::composite(ops));
    assert!(outcome.is_success(), "{:?}", outcome);
    (engine, tree)
}

pub fn pool(name: &str) -> ResourceAddress {
    ResourceAddress::parse(&format!("/subsystem=ejb3/strict-max-bean-instance-pool={}", name))
        .expect("Invalid pool address")
}
