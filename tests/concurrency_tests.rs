// Copyright (c) 2025 - Cowboy AI, Inc.
//! Concurrent Operation Tests
//!
//! Many writers racing on the pool size alternatives must never leave a pool
//! with both sizes defined, and readers never observe half a composite.

mod fixtures;

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use cim_config_model::{ManagementService, ModelValue, Operation};
use fixtures::*;

fn pool_is_consistent(model: &Value, pool: &str) -> bool {
    let pool = &model["subsystem"]["ejb3"]["strict-max-bean-instance-pool"][pool];
    pool["max-pool-size"].is_null() || pool["derive-size"].is_null()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_composites_keep_alternatives() {
    let kernel = Arc::new(booted_kernel(&[SUBSYSTEM_XML]).await);
    let pool = pool_address("slsb-strict-max-pool");

    let tasks = (0..32).map(|i| {
        let kernel = Arc::clone(&kernel);
        let pool = pool.clone();
        tokio::spawn(async move {
            let op = if i % 2 == 0 {
                Operation::composite(vec![
                    Operation::undefine_attribute(pool.clone(), "derive-size"),
                    Operation::write_attribute(pool.clone(), "max-pool-size", i + 1),
                ])
            } else {
                Operation::composite(vec![
                    Operation::undefine_attribute(pool.clone(), "max-pool-size"),
                    Operation::write_attribute(pool.clone(), "derive-size", "from-cpu-count"),
                ])
            };
            kernel.execute_operation(op).await
        })
    });

    let readers = (0..16).map(|_| {
        let kernel = Arc::clone(&kernel);
        tokio::spawn(async move { kernel.read_whole_model().await })
    });

    for outcome in join_all(tasks).await {
        assert!(outcome.unwrap().is_success());
    }
    for model in join_all(readers).await {
        assert!(pool_is_consistent(&model.unwrap(), "slsb-strict-max-pool"));
    }

    assert!(pool_is_consistent(&kernel.read_whole_model().await, "slsb-strict-max-pool"));
    assert!(kernel.controller().verify_integrity().await.is_ok());
    assert_eq!(kernel.controller().audit_records().await.len(), 32);
}

#[tokio::test]
async fn test_concurrent_reads_share_the_lock() {
    let kernel = booted_kernel(&[SUBSYSTEM_XML]).await;
    let controller = kernel.controller();
    let pool = pool_address("slsb-strict-max-pool");

    let reads = (0..8).map(|_| controller.execute(Operation::read_attribute(pool.clone(), "max-pool-size")));
    for outcome in join_all(reads).await {
        assert_eq!(outcome.result, Some(ModelValue::from(20).to_json()));
    }
}
