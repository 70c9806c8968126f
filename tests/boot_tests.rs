// Copyright (c) 2025 - Cowboy AI, Inc.
//! Boot Integration Tests
//!
//! Boot is all or nothing: a document that fails anywhere leaves an empty
//! model and a reported boot error.

mod fixtures;

use pretty_assertions::assert_eq;
use serde_json::json;

use cim_config_model::boot::BootError;
use cim_config_model::{KernelConfig, ModelError, Operation, ResourceAddress};
use fixtures::*;

#[tokio::test]
async fn test_sar_subsystem() {
    let kernel = booted_kernel(&[SAR_XML]).await;

    assert_eq!(kernel.read_whole_model().await, json!({ "subsystem": { "sar": {} } }));
    let sar = ResourceAddress::parse("/subsystem=sar").unwrap();
    let response = kernel.execute_operation(Operation::read_resource(sar)).await;
    assert_eq!(response.result, Some(json!({})));
}

#[tokio::test]
async fn test_full_document_boots() {
    let kernel = booted_kernel(&[SUBSYSTEM_XML]).await;
    let model = kernel.read_whole_model().await;
    let ejb3 = &model["subsystem"]["ejb3"];

    assert_eq!(ejb3["default-slsb-instance-pool"], json!("slsb-strict-max-pool"));
    assert_eq!(ejb3["default-stateful-bean-access-timeout"], json!("${ejb.stateful.timeout:5000}"));
    assert_eq!(ejb3["in-vm-remote-interface-invocation-pass-by-value"], json!(false));
    assert_eq!(ejb3["statistics-enabled"], json!(null));
    assert_eq!(
        ejb3["strict-max-bean-instance-pool"]["mdb-strict-max-pool"]["derive-size"],
        json!("from-cpu-count")
    );
    assert!(kernel.controller().verify_integrity().await.is_ok());
}

#[tokio::test]
async fn test_bad_documents_fail_boot() {
    for (label, document) in BAD_DOCUMENTS {
        let kernel = kernel_with_config(KernelConfig::default(), &[*document]).await;

        assert!(!kernel.is_successful_boot(), "{} should not boot", label);
        assert!(
            matches!(kernel.boot_error(), Some(ModelError::Boot(_))),
            "{}: {:?}",
            label,
            kernel.boot_error()
        );
        assert_eq!(kernel.read_whole_model().await, json!({}), "{} left resources behind", label);
    }
}

#[tokio::test]
async fn test_boot_error_kinds() {
    let kernel = kernel_with_config(KernelConfig::default(), &[BAD_DOCUMENTS[1].1]).await;
    assert!(matches!(
        kernel.boot_error(),
        Some(ModelError::Boot(BootError::UnknownNamespace(ns))) if ns == "urn:jboss:domain:ejb3:9.0"
    ));

    let kernel = kernel_with_config(KernelConfig::default(), &[BAD_DOCUMENTS[5].1]).await;
    assert!(matches!(
        kernel.boot_error(),
        Some(ModelError::Boot(BootError::Rejected(reason))) if reason.contains("derive-size")
    ));
}

#[tokio::test]
async fn test_one_bad_document_fails_all() {
    let kernel = kernel_with_config(KernelConfig::default(), &[SAR_XML, BAD_DOCUMENTS[6].1]).await;
    assert!(!kernel.is_successful_boot());
    assert_eq!(kernel.read_whole_model().await, json!({}));
}

#[tokio::test]
async fn test_legacy_document_checked_against_its_version() {
    let kernel = kernel_with_config(KernelConfig::default(), &[BAD_DOCUMENTS[7].1]).await;
    assert!(matches!(
        kernel.boot_error(),
        Some(ModelError::Boot(BootError::UnknownAttribute { attribute, .. })) if attribute == "statistics-enabled"
    ));

    let kernel = booted_kernel(&[SUBSYSTEM_LEGACY_SAFE_XML]).await;
    let model = kernel.read_whole_model().await;
    assert_eq!(
        model["subsystem"]["ejb3"]["strict-max-bean-instance-pool"]["slsb-strict-max-pool"]["max-pool-size"],
        json!(20)
    );
}
