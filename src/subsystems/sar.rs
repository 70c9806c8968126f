// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service archive deployer subsystem
//!
//! Has no attributes and no children; booting `<subsystem xmlns="urn:jboss:domain:sar:1.0"/>`
//! creates `/subsystem=sar` and nothing else.

use crate::domain::ModelVersion;
use crate::extension::SubsystemExtension;
use crate::schema::{ResourceDefinition, SchemaError, SchemaRegistry};

pub const SUBSYSTEM_NAME: &str = "sar";
pub const CURRENT_VERSION: ModelVersion = ModelVersion::new(1, 0, 0);
pub const NAMESPACE: &str = "urn:jboss:domain:sar:1.0";

#[derive(Debug, Clone, Copy, Default)]
pub struct SarExtension;

impl SubsystemExtension for SarExtension {
    fn subsystem_name(&self) -> &str {
        SUBSYSTEM_NAME
    }

    fn current_version(&self) -> ModelVersion {
        CURRENT_VERSION
    }

    fn namespaces(&self) -> Vec<String> {
        vec![NAMESPACE.to_string()]
    }

    fn register_schema(&self, schema: &mut SchemaRegistry) -> Result<(), SchemaError> {
        schema.register(ResourceDefinition::new(SUBSYSTEM_NAME))
    }
}
