// Copyright (c) 2025 - Cowboy AI, Inc.
//! EJB3 Subsystem
//!
//! ```text
//! subsystem=ejb3                                   (5.0.0)
//!  ├─ default-slsb-instance-pool      → strict-max-bean-instance-pool
//!  ├─ default-mdb-instance-pool       → strict-max-bean-instance-pool
//!  ├─ default-stateful-bean-access-timeout, statistics-enabled, ...
//!  └─ strict-max-bean-instance-pool=*
//!       max-pool-size | derive-size   (alternatives)
//!       timeout, timeout-unit
//! ```
//!
//! # Legacy Versions
//!
//! - 4.0.0: no `derive-size`
//! - 3.0.0: additionally no `statistics-enabled`; `max-pool-size` and
//!   `timeout` take literals only

use crate::domain::{ModelVersion, PathElement};
use crate::extension::SubsystemExtension;
use crate::schema::{
    AttributeDefinition, AttributeType, Constraint, ResourceDefinition, SchemaError, SchemaRegistry,
};
use crate::transform::{TransformationDescription, TransformerRegistry};

pub const SUBSYSTEM_NAME: &str = "ejb3";
pub const POOL: &str = "strict-max-bean-instance-pool";

pub const CURRENT_VERSION: ModelVersion = ModelVersion::new(5, 0, 0);
pub const VERSION_4_0_0: ModelVersion = ModelVersion::new(4, 0, 0);
pub const VERSION_3_0_0: ModelVersion = ModelVersion::new(3, 0, 0);

pub const DEFAULT_SLSB_INSTANCE_POOL: &str = "default-slsb-instance-pool";
pub const DEFAULT_MDB_INSTANCE_POOL: &str = "default-mdb-instance-pool";
pub const DEFAULT_STATEFUL_BEAN_ACCESS_TIMEOUT: &str = "default-stateful-bean-access-timeout";
pub const STATISTICS_ENABLED: &str = "statistics-enabled";
pub const PASS_BY_VALUE: &str = "in-vm-remote-interface-invocation-pass-by-value";

pub const MAX_POOL_SIZE: &str = "max-pool-size";
pub const DERIVE_SIZE: &str = "derive-size";
pub const TIMEOUT: &str = "timeout";
pub const TIMEOUT_UNIT: &str = "timeout-unit";

/// The EJB3 subsystem extension
#[derive(Debug, Clone, Copy, Default)]
pub struct Ejb3Extension;

fn subsystem_definition() -> Result<ResourceDefinition, SchemaError> {
    Ok(ResourceDefinition::new(SUBSYSTEM_NAME)
        .with_attribute(AttributeDefinition::new(DEFAULT_SLSB_INSTANCE_POOL, AttributeType::String).references(POOL))
        .with_attribute(AttributeDefinition::new(DEFAULT_MDB_INSTANCE_POOL, AttributeType::String).references(POOL))
        .with_attribute(
            AttributeDefinition::new(DEFAULT_STATEFUL_BEAN_ACCESS_TIMEOUT, AttributeType::Long)
                .with_default(5000i64)
                .with_range(-1, i64::MAX)
                .allow_expression(),
        )
        .with_attribute(
            AttributeDefinition::new(STATISTICS_ENABLED, AttributeType::Boolean)
                .with_default(false)
                .allow_expression(),
        )
        .with_attribute(
            AttributeDefinition::new(PASS_BY_VALUE, AttributeType::Boolean)
                .with_default(true)
                .allow_expression(),
        )
        .with_child(PathElement::wildcard(POOL).map_err(|_| SchemaError::UnknownType(POOL.to_string()))?, POOL))
}

fn pool_definition() -> ResourceDefinition {
    ResourceDefinition::new(POOL)
        .with_attribute(
            AttributeDefinition::new(MAX_POOL_SIZE, AttributeType::Int)
                .with_default(20)
                .with_range(1, i64::from(i32::MAX))
                .allow_expression(),
        )
        .with_attribute(
            AttributeDefinition::new(DERIVE_SIZE, AttributeType::String)
                .with_allowed_values(["none", "from-worker-pools", "from-cpu-count"])
                .with_undefined_alias("none"),
        )
        .with_attribute(
            AttributeDefinition::new(TIMEOUT, AttributeType::Long)
                .with_default(5i64)
                .with_range(1, i64::MAX)
                .allow_expression(),
        )
        .with_attribute(
            AttributeDefinition::new(TIMEOUT_UNIT, AttributeType::String)
                .with_default("MINUTES")
                .with_allowed_values(["HOURS", "MINUTES", "SECONDS", "MILLISECONDS"])
                .allow_expression(),
        )
        .with_constraint(Constraint::alternatives([MAX_POOL_SIZE, DERIVE_SIZE]))
}

impl SubsystemExtension for Ejb3Extension {
    fn subsystem_name(&self) -> &str {
        SUBSYSTEM_NAME
    }

    fn current_version(&self) -> ModelVersion {
        CURRENT_VERSION
    }

    fn namespaces(&self) -> Vec<String> {
        ["3.0", "4.0", "5.0"]
            .iter()
            .map(|v| format!("urn:jboss:domain:ejb3:{}", v))
            .collect()
    }

    fn register_schema(&self, schema: &mut SchemaRegistry) -> Result<(), SchemaError> {
        // Children first so the subsystem can point at them
        schema.register(pool_definition())?;
        schema.register(subsystem_definition()?)
    }

    fn register_transformers(&self, transformers: &mut TransformerRegistry) {
        transformers.register(
            POOL,
            TransformationDescription::new(VERSION_4_0_0)
                .reject_defined(DERIVE_SIZE)
                .discard(DERIVE_SIZE),
        );
        transformers.register(
            POOL,
            TransformationDescription::new(VERSION_3_0_0).reject_expressions([MAX_POOL_SIZE, TIMEOUT]),
        );
        transformers.register(
            SUBSYSTEM_NAME,
            TransformationDescription::new(VERSION_3_0_0)
                .reject_defined(STATISTICS_ENABLED)
                .discard(STATISTICS_ENABLED),
        );
    }
}
