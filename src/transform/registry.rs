// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transformer Registry
//!
//! Maps (resource type, model version) to a [`ResourceTransformer`] and
//! chains them across a version crossing, the same way an upcaster chain
//! migrates an event one version at a time.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::{ResourceTransformer, TransformError, TransformationContext, VersionBinding};
use crate::domain::{ModelValue, ModelVersion, ResourceAddress};
use crate::operation::{Operation, OperationKind};
use crate::schema::SchemaRegistry;
use crate::tree::Resource;

const SUBSYSTEM: &str = "subsystem";

type Chain<'a> = Vec<&'a dyn ResourceTransformer>;

/// Explicit registry of version transformers
#[derive(Debug, Default, Clone)]
pub struct TransformerRegistry {
    transformers: HashMap<String, BTreeMap<ModelVersion, Arc<dyn ResourceTransformer>>>,
    current_versions: HashMap<String, ModelVersion>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current model version of a subsystem
    pub fn register_subsystem(&mut self, subsystem: impl Into<String>, current: ModelVersion) {
        self.current_versions.insert(subsystem.into(), current);
    }

    /// Register a transformer for one resource type at its version
    pub fn register<T>(&mut self, resource_type: impl Into<String>, transformer: T)
    where
        T: ResourceTransformer + 'static,
    {
        self.transformers
            .entry(resource_type.into())
            .or_default()
            .insert(transformer.version(), Arc::new(transformer));
    }

    pub fn current_version(&self, subsystem: &str) -> Option<ModelVersion> {
        self.current_versions.get(subsystem).copied()
    }

    /// Registered versions for a resource type, ascending
    pub fn versions(&self, resource_type: &str) -> Vec<ModelVersion> {
        self.transformers
            .get(resource_type)
            .map(|by_version| by_version.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Crossing for a subsystem under a binding, `None` when no transformation applies
    pub fn context(
        &self,
        subsystem: &str,
        binding: &VersionBinding,
    ) -> Result<Option<TransformationContext>, TransformError> {
        let (Some(target), Some(current)) =
            (binding.version_for(subsystem), self.current_version(subsystem))
        else {
            return Ok(None);
        };

        if target > current {
            return Err(TransformError::UnsupportedVersion {
                subsystem: subsystem.to_string(),
                version: target,
            });
        }
        if target == current {
            return Ok(None);
        }
        Ok(Some(TransformationContext {
            subsystem: subsystem.to_string(),
            current,
            target,
        }))
    }

    fn chain(&self, resource_type: &str, context: &TransformationContext) -> Chain<'_> {
        self.transformers
            .get(resource_type)
            .map(|by_version| {
                by_version
                    .iter()
                    .filter(|(version, _)| context.includes(**version))
                    .map(|(_, transformer)| transformer.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Newest first: the order in which a current subtree is walked down
    fn chain_down(&self, resource_type: &str, context: &TransformationContext) -> Chain<'_> {
        let mut chain = self.chain(resource_type, context);
        chain.reverse();
        chain
    }

    /// Transform a current-version subtree into the target version's shape
    pub fn transform_resource(
        &self,
        resource: &Resource,
        context: &TransformationContext,
    ) -> Result<Resource, TransformError> {
        let chain = self.chain_down(resource.resource_type(), context);

        let attributes = chain
            .iter()
            .try_fold(resource.attributes().clone(), |attributes, transformer| {
                transformer.transform_attributes(attributes)
            })?;
        let mut transformed = Resource::new(resource.resource_type(), attributes);

        for (child_type, named) in resource.children() {
            let mut keep = true;
            for transformer in &chain {
                keep &= transformer.transform_children(child_type, !named.is_empty())?;
            }
            if !keep {
                continue;
            }
            for (name, child) in named {
                transformed.push_child(child_type, name, self.transform_resource(child, context)?);
            }
        }
        Ok(transformed)
    }

    /// Legacy view of a whole model: every bound subsystem transformed
    pub fn transform_model(
        &self,
        root: &Resource,
        binding: &VersionBinding,
    ) -> Result<Resource, TransformError> {
        let mut transformed = Resource::new(root.resource_type(), root.attributes().clone());
        for (child_type, named) in root.children() {
            for (name, child) in named {
                let context = match child_type.as_str() {
                    SUBSYSTEM => self.context(name, binding)?,
                    _ => None,
                };
                let child = match context {
                    Some(context) => self.transform_resource(child, &context)?,
                    None => child.clone(),
                };
                transformed.push_child(child_type, name, child);
            }
        }
        Ok(transformed)
    }

    /// Legacy view of the subtree at `address`
    pub fn transform_view(
        &self,
        address: &ResourceAddress,
        resource: &Resource,
        binding: &VersionBinding,
    ) -> Result<Resource, TransformError> {
        match address.value_of(SUBSYSTEM) {
            None => self.transform_model(resource, binding),
            Some(subsystem) => match self.context(subsystem, binding)? {
                Some(context) => self.transform_resource(resource, &context),
                None => Ok(resource.clone()),
            },
        }
    }

    /// Legacy value of the current attribute `name` of the resource at `address`
    ///
    /// The resource's own attributes and child types are transformed first,
    /// so the read fails wherever a read of the resource would.
    pub fn transform_attribute(
        &self,
        address: &ResourceAddress,
        resource: &Resource,
        name: &str,
        binding: &VersionBinding,
    ) -> Result<ModelValue, TransformError> {
        let stored = resource.attribute(name).cloned().unwrap_or_default();
        let Some(subsystem) = address.value_of(SUBSYSTEM) else {
            return Ok(stored);
        };
        let Some(context) = self.context(subsystem, binding)? else {
            return Ok(stored);
        };

        self.transform_resource(&resource.shallow(), &context)?;

        let mut attributes = IndexMap::new();
        attributes.insert(name.to_string(), stored);
        let single = self.transform_resource(&Resource::new(resource.resource_type(), attributes), &context)?;
        Ok(single.attributes().values().next().cloned().unwrap_or_default())
    }

    /// Rewrite an operation written against bound versions into current terms
    ///
    /// Rejections happen here, before the operation reaches the engine.
    pub fn transform_operation(
        &self,
        schema: &SchemaRegistry,
        op: &Operation,
        binding: &VersionBinding,
    ) -> Result<Operation, TransformError> {
        let kind = match op.kind() {
            Some(OperationKind::Composite) => {
                let mut transformed = op.clone();
                transformed.steps = op
                    .steps
                    .iter()
                    .map(|step| self.transform_operation(schema, step, binding))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(transformed);
            }
            Some(kind) => kind,
            None => return Ok(op.clone()),
        };

        let Some(subsystem) = op.address.value_of(SUBSYSTEM) else {
            return Ok(op.clone());
        };
        let Some(context) = self.context(subsystem, binding)? else {
            return Ok(op.clone());
        };

        self.check_inbound_children(schema, &op.address, &context)?;

        // Unregistered addresses are left for the engine to report
        let Ok(definition) = schema.resolve(&op.address) else {
            return Ok(op.clone());
        };
        let chain = self.chain(definition.name(), &context);
        let map_name = |name: &str, value: Option<&ModelValue>| {
            chain
                .iter()
                .try_fold(name.to_string(), |name, transformer| {
                    transformer.transform_inbound_attribute(&name, value)
                })
        };

        let mut transformed = op.clone();
        match kind {
            OperationKind::WriteAttribute => {
                if let Some(name) = &op.name {
                    let value = op.value.clone().unwrap_or_default();
                    transformed.name = Some(map_name(name, Some(&value))?);
                }
            }
            OperationKind::ReadAttribute | OperationKind::UndefineAttribute => {
                if let Some(name) = &op.name {
                    transformed.name = Some(map_name(name, None)?);
                }
            }
            OperationKind::Add => {
                let mut parameters = IndexMap::with_capacity(op.parameters.len());
                for (name, value) in &op.parameters {
                    parameters.insert(map_name(name, Some(value))?, value.clone());
                }
                transformed.parameters = parameters;
            }
            OperationKind::Remove | OperationKind::ReadResource | OperationKind::Composite => {}
        }

        debug!(
            subsystem = %context.subsystem,
            target = %context.target,
            operation = %op.operation,
            "Transformed inbound operation"
        );
        Ok(transformed)
    }

    fn check_inbound_children(
        &self,
        schema: &SchemaRegistry,
        address: &ResourceAddress,
        context: &TransformationContext,
    ) -> Result<(), TransformError> {
        let elements = address.elements();
        let Some(start) = elements.iter().position(|e| e.key() == SUBSYSTEM) else {
            return Ok(());
        };

        for depth in (start + 1)..elements.len() {
            let parent = ResourceAddress::from(elements[..depth].to_vec());
            let Ok(parent_definition) = schema.resolve(&parent) else {
                return Ok(());
            };
            for transformer in self.chain(parent_definition.name(), context) {
                transformer.transform_inbound_child(elements[depth].key())?;
            }
        }
        Ok(())
    }
}
