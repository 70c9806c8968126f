// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Tree
//!
//! The authoritative in-memory configuration model. The tree always holds
//! the current schema version; legacy views are produced by the transformers
//! at the boundary and never stored.
//!
//! # Contracts
//!
//! - `get(address)` resolves through existing ancestors only; a missing
//!   intermediate segment is `NotFound`, nothing is auto-created
//! - `put(address, resource)` requires the parent and fails with `Duplicate`
//!   when the address is taken
//! - `remove(address, recursive)` fails with `HasChildren` unless recursive
//!   removal is requested; the whole subtree goes at once
//! - `attribute_set` validates through the schema before mutating
//! - defaults are never materialized: `Undefined` is stored as-is

pub mod resource;

use indexmap::IndexMap;
use thiserror::Error;

pub use resource::{Children, Resource};

use crate::domain::{ModelValue, ResourceAddress};
use crate::schema::{ConstraintViolation, SchemaError, SchemaRegistry, ValidationError, ROOT_TYPE};

/// Tree access errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Resource {0} not found")]
    NotFound(ResourceAddress),

    #[error("Duplicate resource {0}")]
    Duplicate(ResourceAddress),

    #[error("Resource {0} has children; use a recursive remove")]
    HasChildren(ResourceAddress),

    #[error("The root resource cannot be added or removed")]
    RootImmutable,

    #[error("Attribute '{attribute}' not found on resource {address}")]
    NoSuchAttribute {
        address: ResourceAddress,
        attribute: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Stored attribute key set does not match the declared one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Integrity failure at {address}: {reason}")]
pub struct IntegrityError {
    pub address: ResourceAddress,
    pub reason: String,
}

/// Ordered, addressable tree of resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTree {
    root: Resource,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    /// Create a tree holding only the attribute-less root
    pub fn new() -> Self {
        Self {
            root: Resource::new(ROOT_TYPE, IndexMap::new()),
        }
    }

    pub fn root(&self) -> &Resource {
        &self.root
    }

    pub fn get(&self, address: &ResourceAddress) -> Result<&Resource, TreeError> {
        let mut current = &self.root;
        for element in address.elements() {
            current = current
                .child(element)
                .ok_or_else(|| TreeError::NotFound(address.clone()))?;
        }
        Ok(current)
    }

    fn get_mut(&mut self, address: &ResourceAddress) -> Result<&mut Resource, TreeError> {
        let mut current = &mut self.root;
        for element in address.elements() {
            current = current
                .child_mut(element)
                .ok_or_else(|| TreeError::NotFound(address.clone()))?;
        }
        Ok(current)
    }

    pub fn contains(&self, address: &ResourceAddress) -> bool {
        self.get(address).is_ok()
    }

    /// Insert a resource under an existing parent
    pub fn put(&mut self, address: &ResourceAddress, resource: Resource) -> Result<(), TreeError> {
        self.insert_at(address, resource, None)
    }

    /// Insert at a position within the type group (used to undo removals)
    pub(crate) fn insert_at(
        &mut self,
        address: &ResourceAddress,
        resource: Resource,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        let (parent, element) = match (address.parent(), address.last()) {
            (Some(parent), Some(element)) => (parent, element.clone()),
            _ => return Err(TreeError::RootImmutable),
        };

        if self.contains(address) {
            return Err(TreeError::Duplicate(address.clone()));
        }

        let parent_resource = self
            .get_mut(&parent)
            .map_err(|_| TreeError::NotFound(parent.clone()))?;
        parent_resource.insert_child(&element, resource, index);
        Ok(())
    }

    /// Remove a resource, returning the subtree and its former position
    pub fn remove(
        &mut self,
        address: &ResourceAddress,
        recursive: bool,
    ) -> Result<(Resource, usize), TreeError> {
        let (parent, element) = match (address.parent(), address.last()) {
            (Some(parent), Some(element)) => (parent, element.clone()),
            _ => return Err(TreeError::RootImmutable),
        };

        if self.get(address)?.has_children() && !recursive {
            return Err(TreeError::HasChildren(address.clone()));
        }

        self.get_mut(&parent)?
            .take_child(&element)
            .ok_or_else(|| TreeError::NotFound(address.clone()))
    }

    /// Raw stored value, `Undefined` included
    pub fn attribute_get(&self, address: &ResourceAddress, name: &str) -> Result<&ModelValue, TreeError> {
        self.get(address)?
            .attribute(name)
            .ok_or_else(|| TreeError::NoSuchAttribute {
                address: address.clone(),
                attribute: name.to_string(),
            })
    }

    /// Validate and store an attribute value, returning the previous value
    ///
    /// The raw value is coerced by the schema and the constraints of the
    /// resource type are checked against the prospective attribute set
    /// before anything is mutated.
    pub fn attribute_set(
        &mut self,
        schema: &SchemaRegistry,
        address: &ResourceAddress,
        name: &str,
        raw: ModelValue,
    ) -> Result<ModelValue, TreeError> {
        let resource = self.get(address)?;
        let definition = schema.definition(resource.resource_type())?;
        let value = definition.require_attribute(name)?.validate(raw)?;
        definition.check_constraints(&resource.prospective_attributes(name, value.clone()))?;

        self.replace_attribute(address, name, value)
    }

    /// Store an already validated value
    pub(crate) fn replace_attribute(
        &mut self,
        address: &ResourceAddress,
        name: &str,
        value: ModelValue,
    ) -> Result<ModelValue, TreeError> {
        self.get_mut(address)?
            .replace_attribute(name, value)
            .ok_or_else(|| TreeError::NoSuchAttribute {
                address: address.clone(),
                attribute: name.to_string(),
            })
    }

    /// Overwrite the full attribute map of a resource
    pub(crate) fn replace_attributes(
        &mut self,
        address: &ResourceAddress,
        attributes: IndexMap<String, ModelValue>,
    ) -> Result<IndexMap<String, ModelValue>, TreeError> {
        let resource = self.get_mut(address)?;
        Ok(std::mem::replace(resource.attributes_mut(), attributes))
    }

    /// Every address in the tree, depth first, root excluded
    pub fn addresses(&self) -> Vec<ResourceAddress> {
        let mut out = Vec::new();
        collect_addresses(&self.root, &ResourceAddress::root(), &mut out);
        out
    }

    /// Check that every stored resource holds exactly its declared attributes
    pub fn verify(&self, schema: &SchemaRegistry) -> Result<(), IntegrityError> {
        verify_resource(&self.root, &ResourceAddress::root(), schema)
    }
}

fn collect_addresses(resource: &Resource, address: &ResourceAddress, out: &mut Vec<ResourceAddress>) {
    for (child_type, named) in resource.children() {
        for (name, child) in named {
            // Names were validated when the child was added
            if let Ok(child_address) = address.child(child_type, name) {
                out.push(child_address.clone());
                collect_addresses(child, &child_address, out);
            }
        }
    }
}

fn verify_resource(
    resource: &Resource,
    address: &ResourceAddress,
    schema: &SchemaRegistry,
) -> Result<(), IntegrityError> {
    let integrity = |reason: String| IntegrityError {
        address: address.clone(),
        reason,
    };

    let definition = schema
        .definition(resource.resource_type())
        .map_err(|e| integrity(e.to_string()))?;

    let declared: Vec<&str> = definition.attribute_names().collect();
    let stored: Vec<&str> = resource.attributes().keys().map(String::as_str).collect();
    if declared.len() != stored.len() || declared.iter().any(|name| !stored.contains(name)) {
        return Err(integrity(format!(
            "stored attributes [{}] do not match declared attributes [{}]",
            stored.join(", "),
            declared.join(", ")
        )));
    }

    for (child_type, named) in resource.children() {
        for (name, child) in named {
            let child_address = address
                .child(child_type, name)
                .map_err(|e| integrity(e.to_string()))?;
            verify_resource(child, &child_address, schema)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathElement;
    use crate::schema::{AttributeDefinition, AttributeType, Constraint, ResourceDefinition};

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema
            .register(
                ResourceDefinition::new("pool")
                    .with_attribute(AttributeDefinition::new("max-pool-size", AttributeType::Int))
                    .with_attribute(AttributeDefinition::new("derive-size", AttributeType::String))
                    .with_constraint(Constraint::alternatives(["max-pool-size", "derive-size"])),
            )
            .unwrap();
        schema
            .register(
                ResourceDefinition::new("demo")
                    .with_child(PathElement::wildcard("pool").unwrap(), "pool"),
            )
            .unwrap();
        schema
            .register_child(ROOT_TYPE, PathElement::new("subsystem", "demo").unwrap(), "demo")
            .unwrap();
        schema
    }

    fn address(text: &str) -> ResourceAddress {
        ResourceAddress::parse(text).unwrap()
    }

    fn tree_with_pool(schema: &SchemaRegistry) -> ResourceTree {
        let mut tree = ResourceTree::new();
        tree.put(&address("/subsystem=demo"), Resource::new("demo", IndexMap::new()))
            .unwrap();
        let pool = schema.definition("pool").unwrap().undefined_attributes();
        tree.put(&address("/subsystem=demo/pool=a"), Resource::new("pool", pool))
            .unwrap();
        tree
    }

    #[test]
    fn test_put_requires_parent() {
        let mut tree = ResourceTree::new();
        let err = tree
            .put(&address("/subsystem=demo/pool=a"), Resource::new("pool", IndexMap::new()))
            .unwrap_err();
        assert_eq!(err, TreeError::NotFound(address("/subsystem=demo")));
        assert!(tree.addresses().is_empty());
    }

    #[test]
    fn test_put_duplicate() {
        let schema = schema();
        let mut tree = tree_with_pool(&schema);
        let err = tree
            .put(&address("/subsystem=demo"), Resource::new("demo", IndexMap::new()))
            .unwrap_err();
        assert_eq!(err, TreeError::Duplicate(address("/subsystem=demo")));
    }

    #[test]
    fn test_get_missing_intermediate() {
        let tree = ResourceTree::new();
        assert!(matches!(
            tree.get(&address("/subsystem=demo/pool=a")),
            Err(TreeError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_requires_recursive_for_children() {
        let schema = schema();
        let mut tree = tree_with_pool(&schema);

        assert_eq!(
            tree.remove(&address("/subsystem=demo"), false).unwrap_err(),
            TreeError::HasChildren(address("/subsystem=demo"))
        );

        let (removed, _) = tree.remove(&address("/subsystem=demo"), true).unwrap();
        assert!(removed.has_children());
        assert!(tree.addresses().is_empty());
        assert_eq!(tree.remove(&ResourceAddress::root(), true).unwrap_err(), TreeError::RootImmutable);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let schema = schema();
        let mut tree = tree_with_pool(&schema);
        let pool = schema.definition("pool").unwrap().undefined_attributes();
        tree.put(&address("/subsystem=demo/pool=b"), Resource::new("pool", pool))
            .unwrap();

        let before = tree.addresses();
        let (removed, index) = tree.remove(&address("/subsystem=demo/pool=a"), false).unwrap();
        assert_eq!(index, 0);
        tree.insert_at(&address("/subsystem=demo/pool=a"), removed, Some(index))
            .unwrap();
        assert_eq!(tree.addresses(), before);
    }

    #[test]
    fn test_attribute_set_validates_before_mutating() {
        let schema = schema();
        let mut tree = tree_with_pool(&schema);
        let pool = address("/subsystem=demo/pool=a");

        let previous = tree
            .attribute_set(&schema, &pool, "max-pool-size", ModelValue::from("5"))
            .unwrap();
        assert_eq!(previous, ModelValue::Undefined);
        assert_eq!(tree.attribute_get(&pool, "max-pool-size").unwrap(), &ModelValue::Int(5));

        let err = tree
            .attribute_set(&schema, &pool, "derive-size", ModelValue::from("from-cpu-count"))
            .unwrap_err();
        assert!(matches!(err, TreeError::Constraint(_)));
        assert_eq!(tree.attribute_get(&pool, "derive-size").unwrap(), &ModelValue::Undefined);

        assert!(matches!(
            tree.attribute_set(&schema, &pool, "max-pool-size", ModelValue::from("x")),
            Err(TreeError::Validation(_))
        ));
        assert_eq!(tree.attribute_get(&pool, "max-pool-size").unwrap(), &ModelValue::Int(5));
    }

    #[test]
    fn test_verify_detects_missing_keys() {
        let schema = schema();
        let mut tree = tree_with_pool(&schema);
        assert!(tree.verify(&schema).is_ok());

        tree.replace_attributes(&address("/subsystem=demo/pool=a"), IndexMap::new())
            .unwrap();
        let err = tree.verify(&schema).unwrap_err();
        assert_eq!(err.address, address("/subsystem=demo/pool=a"));
    }
}
