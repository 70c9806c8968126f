// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-config-model
//!
//! Fixed subsystem documents, addresses and correlation ids. Every kernel in
//! the integration tests is booted from one of these documents.

#![allow(dead_code)]

use uuid::Uuid;

use cim_config_model::subsystems::{Ejb3Extension, SarExtension};
use cim_config_model::{
    KernelConfig, KernelServices, KernelServicesBuilder, ModelVersion, ResourceAddress,
    VersionBinding,
};

/// Full ejb3 document: both default pools point at existing pools
pub const SUBSYSTEM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<subsystem xmlns="urn:jboss:domain:ejb3:5.0"
           default-slsb-instance-pool="slsb-strict-max-pool"
           default-mdb-instance-pool="mdb-strict-max-pool"
           default-stateful-bean-access-timeout="${ejb.stateful.timeout:5000}"
           in-vm-remote-interface-invocation-pass-by-value="false">
    <strict-max-bean-instance-pool name="slsb-strict-max-pool" max-pool-size="20" timeout="5" timeout-unit="MINUTES"/>
    <strict-max-bean-instance-pool name="mdb-strict-max-pool" derive-size="from-cpu-count" timeout="${ejb.pool.timeout:5}" timeout-unit="MINUTES"/>
</subsystem>
"#;

/// Pools only; the default pool attributes are set by operations
pub const SUBSYSTEM_POOLS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<subsystem xmlns="urn:jboss:domain:ejb3:5.0"
           default-slsb-instance-pool="slsb-strict-max-pool"
           default-mdb-instance-pool="mdb-strict-max-pool">
    <strict-max-bean-instance-pool name="slsb-strict-max-pool" max-pool-size="20"/>
    <strict-max-bean-instance-pool name="mdb-strict-max-pool" derive-size="from-worker-pools"/>
</subsystem>
"#;

/// Document that a 3.0.0 or 4.0.0 caller can read without rejection
pub const SUBSYSTEM_LEGACY_SAFE_XML: &str = r#"<subsystem xmlns="urn:jboss:domain:ejb3:4.0">
    <strict-max-bean-instance-pool name="slsb-strict-max-pool" max-pool-size="20" timeout="5"/>
</subsystem>
"#;

pub const SAR_XML: &str = r#"<subsystem xmlns="urn:jboss:domain:sar:1.0"/>"#;

/// Documents that must fail boot, with a label
pub const BAD_DOCUMENTS: &[(&str, &str)] = &[
    ("not xml", "<subsystem xmlns="),
    ("unknown namespace", r#"<subsystem xmlns="urn:jboss:domain:ejb3:9.0"/>"#),
    (
        "unknown element",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0"><cache name="simple"/></subsystem>"#,
    ),
    (
        "unknown attribute",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0"><strict-max-bean-instance-pool name="p" size="1"/></subsystem>"#,
    ),
    (
        "bad value",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0"><strict-max-bean-instance-pool name="p" timeout-unit="DAYS"/></subsystem>"#,
    ),
    (
        "both pool sizes",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0"><strict-max-bean-instance-pool name="p" max-pool-size="5" derive-size="from-cpu-count"/></subsystem>"#,
    ),
    (
        "dangling default pool",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:5.0" default-slsb-instance-pool="missing"/>"#,
    ),
    (
        "attributes newer than the document schema",
        r#"<subsystem xmlns="urn:jboss:domain:ejb3:3.0" statistics-enabled="true"><strict-max-bean-instance-pool name="p" derive-size="from-cpu-count"/></subsystem>"#,
    ),
];

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn ejb3_address() -> ResourceAddress {
    ResourceAddress::parse("/subsystem=ejb3").expect("Invalid fixture address")
}

pub fn pool_address(name: &str) -> ResourceAddress {
    ejb3_address()
        .child("strict-max-bean-instance-pool", name)
        .expect("Invalid fixture pool name")
}

pub fn ejb3_binding(major: u32) -> VersionBinding {
    VersionBinding::new().bind("ejb3", ModelVersion::new(major, 0, 0))
}

pub async fn kernel_with_config(config: KernelConfig, documents: &[&str]) -> KernelServices {
    let builder = documents.iter().fold(
        KernelServicesBuilder::new(config)
            .extension(Ejb3Extension)
            .extension(SarExtension),
        |builder, document| builder.subsystem_xml(*document),
    );
    builder.build().await.expect("Extension registration failed")
}

/// Kernel booted from the given documents; boot must succeed
pub async fn booted_kernel(documents: &[&str]) -> KernelServices {
    let kernel = kernel_with_config(KernelConfig::default(), documents).await;
    assert!(
        kernel.is_successful_boot(),
        "Subsystem boot failed: {:?}",
        kernel.boot_error()
    );
    kernel
}
