// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subsystem Extensions and the Management Model
//!
//! Resource types, boot namespaces and version transformers are registered
//! explicitly by [`SubsystemExtension`]s into one [`ManagementModel`], built
//! once at process start and shared by reference:
//!
//! ```rust,ignore
//! let model = ManagementModel::builder()
//!     .extension(Ejb3Extension)
//!     .extension(SarExtension)
//!     .build()?;
//! ```

use std::sync::Arc;

use tracing::info;

use crate::domain::{ModelVersion, PathElement};
use crate::errors::{ModelError, ModelResult};
use crate::schema::{SchemaError, SchemaRegistry, ROOT_TYPE};
use crate::transform::TransformerRegistry;

/// A pluggable subsystem of the management model
pub trait SubsystemExtension: Send + Sync {
    /// Name used in `subsystem=<name>` addresses
    fn subsystem_name(&self) -> &str;

    /// Model version the tree holds for this subsystem
    fn current_version(&self) -> ModelVersion;

    /// XML namespaces a boot document for this subsystem may declare
    fn namespaces(&self) -> Vec<String>;

    /// Register resource definitions; the subsystem root type must be named
    /// after the subsystem
    fn register_schema(&self, schema: &mut SchemaRegistry) -> Result<(), SchemaError>;

    /// Register transformers for older model versions
    fn register_transformers(&self, _transformers: &mut TransformerRegistry) {}
}

/// Registration summary of one subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemInfo {
    pub name: String,
    pub current_version: ModelVersion,
    pub namespaces: Vec<String>,
}

/// Schema, transformers and subsystems of a running kernel
#[derive(Debug, Clone)]
pub struct ManagementModel {
    schema: Arc<SchemaRegistry>,
    transformers: TransformerRegistry,
    subsystems: Vec<SubsystemInfo>,
}

impl ManagementModel {
    pub fn builder() -> ManagementModelBuilder {
        ManagementModelBuilder::default()
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    pub fn subsystems(&self) -> &[SubsystemInfo] {
        &self.subsystems
    }

    pub fn subsystem(&self, name: &str) -> Option<&SubsystemInfo> {
        self.subsystems.iter().find(|s| s.name == name)
    }

    pub fn subsystem_for_namespace(&self, namespace: &str) -> Option<&SubsystemInfo> {
        self.subsystems
            .iter()
            .find(|s| s.namespaces.iter().any(|ns| ns == namespace))
    }
}

/// Collects extensions and builds the [`ManagementModel`]
#[derive(Default)]
pub struct ManagementModelBuilder {
    extensions: Vec<Box<dyn SubsystemExtension>>,
}

impl ManagementModelBuilder {
    pub fn extension<E: SubsystemExtension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn build(self) -> ModelResult<ManagementModel> {
        let mut schema = SchemaRegistry::new();
        let mut transformers = TransformerRegistry::new();
        let mut subsystems = Vec::with_capacity(self.extensions.len());

        for extension in &self.extensions {
            let name = extension.subsystem_name();
            extension.register_schema(&mut schema)?;

            let path = PathElement::new("subsystem", name)
                .map_err(|e| ModelError::Configuration(e.to_string()))?;
            schema.register_child(ROOT_TYPE, path, name)?;

            transformers.register_subsystem(name, extension.current_version());
            extension.register_transformers(&mut transformers);

            info!(
                subsystem = name,
                version = %extension.current_version(),
                "Registered subsystem"
            );
            subsystems.push(SubsystemInfo {
                name: name.to_string(),
                current_version: extension.current_version(),
                namespaces: extension.namespaces(),
            });
        }

        Ok(ManagementModel {
            schema: Arc::new(schema),
            transformers,
            subsystems,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceAddress;
    use crate::schema::ResourceDefinition;

    struct Empty(&'static str);

    impl SubsystemExtension for Empty {
        fn subsystem_name(&self) -> &str {
            self.0
        }

        fn current_version(&self) -> ModelVersion {
            ModelVersion::new(1, 0, 0)
        }

        fn namespaces(&self) -> Vec<String> {
            vec![format!("urn:jboss:domain:{}:1.0", self.0)]
        }

        fn register_schema(&self, schema: &mut SchemaRegistry) -> Result<(), SchemaError> {
            schema.register(ResourceDefinition::new(self.0))
        }
    }

    #[test]
    fn test_build_registers_subsystem_roots() {
        let model = ManagementModel::builder()
            .extension(Empty("alpha"))
            .extension(Empty("beta"))
            .build()
            .unwrap();

        let address = ResourceAddress::parse("/subsystem=beta").unwrap();
        assert_eq!(model.schema().resolve(&address).unwrap().name(), "beta");
        assert_eq!(
            model.subsystem_for_namespace("urn:jboss:domain:alpha:1.0").map(|s| s.name.as_str()),
            Some("alpha")
        );
        assert_eq!(
            model.transformers().current_version("beta"),
            Some(ModelVersion::new(1, 0, 0))
        );
    }

    #[test]
    fn test_duplicate_subsystem_rejected() {
        let result = ManagementModel::builder()
            .extension(Empty("alpha"))
            .extension(Empty("alpha"))
            .build();
        assert!(matches!(result, Err(ModelError::Schema(SchemaError::DuplicateType(_)))));
    }
}
