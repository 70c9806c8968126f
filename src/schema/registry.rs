// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Definitions and the Schema Registry
//!
//! The [`SchemaRegistry`] is an explicit object built once at process start
//! and shared by reference with the operation engine and the transformers.
//! There is no global lookup.
//!
//! # Registration Tree
//!
//! ```text
//! root
//!  ├─ subsystem=ejb3 ─> "ejb3"
//!  │    └─ strict-max-bean-instance-pool=* ─> "strict-max-bean-instance-pool"
//!  └─ subsystem=sar  ─> "sar"
//! ```
//!
//! Each definition lists its child registrations; an address resolves by
//! walking from the root, preferring an exact element match over a wildcard.

use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

use super::attribute::{AttributeDefinition, ValidationError};
use super::constraint::{check_constraints, Constraint, ConstraintResult, ConstraintViolation};
use crate::domain::{ModelValue, PathElement, ResourceAddress};

/// Name of the implicit root resource type
pub const ROOT_TYPE: &str = "root";

/// Schema registration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Resource type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Unknown resource type '{0}'")]
    UnknownType(String),

    #[error("Child path '{path}' is already registered under '{parent}'")]
    DuplicateChild { parent: String, path: String },

    #[error("No resource definition is registered for address {0}")]
    NoRegistration(ResourceAddress),

    #[error("Constraint on '{resource_type}' names undeclared attribute '{attribute}'")]
    UndeclaredConstraintAttribute {
        resource_type: String,
        attribute: String,
    },

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
}

/// A child path under a parent definition and the type it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRegistration {
    pub path: PathElement,
    pub resource_type: String,
}

/// Attribute schema of one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    name: String,
    attributes: IndexMap<String, AttributeDefinition>,
    constraints: Vec<Constraint>,
    children: Vec<ChildRegistration>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            constraints: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.insert(attribute.name().to_string(), attribute);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_child(mut self, path: PathElement, resource_type: impl Into<String>) -> Self {
        self.children.push(ChildRegistration {
            path,
            resource_type: resource_type.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn children(&self) -> &[ChildRegistration] {
        &self.children
    }

    /// Child registration for a concrete element, exact match first
    pub fn child_registration(&self, element: &PathElement) -> Option<&ChildRegistration> {
        self.children
            .iter()
            .find(|c| !c.path.is_wildcard() && c.path == *element)
            .or_else(|| self.children.iter().find(|c| c.path.matches(element)))
    }

    /// Attribute map with every declared attribute present and undefined
    pub fn undefined_attributes(&self) -> IndexMap<String, ModelValue> {
        self.attributes
            .keys()
            .map(|name| (name.clone(), ModelValue::Undefined))
            .collect()
    }

    /// Look up an attribute, reporting unknown names as validation errors
    pub fn require_attribute(&self, name: &str) -> Result<&AttributeDefinition, ValidationError> {
        self.attribute(name)
            .ok_or_else(|| ValidationError::UnknownAttribute {
                resource_type: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    /// Run every cross-attribute constraint on a prospective attribute map
    pub fn check_constraints(&self, attributes: &IndexMap<String, ModelValue>) -> ConstraintResult {
        check_constraints(&self.constraints, attributes)
    }
}

/// Registry of resource definitions, keyed by type name
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    definitions: HashMap<String, ResourceDefinition>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Create a registry holding only the empty root definition
    pub fn new() -> Self {
        let mut definitions = HashMap::new();
        definitions.insert(ROOT_TYPE.to_string(), ResourceDefinition::new(ROOT_TYPE));
        Self { definitions }
    }

    /// Register a resource definition
    ///
    /// Constraints may only name attributes the definition declares.
    pub fn register(&mut self, definition: ResourceDefinition) -> Result<(), SchemaError> {
        if self.definitions.contains_key(definition.name()) {
            return Err(SchemaError::DuplicateType(definition.name().to_string()));
        }

        for constraint in definition.constraints() {
            if let Some(missing) = constraint
                .attributes()
                .into_iter()
                .find(|name| definition.attribute(name).is_none())
            {
                return Err(SchemaError::UndeclaredConstraintAttribute {
                    resource_type: definition.name().to_string(),
                    attribute: missing.to_string(),
                });
            }
        }

        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    /// Attach a child registration to an already registered parent type
    pub fn register_child(
        &mut self,
        parent_type: &str,
        path: PathElement,
        child_type: &str,
    ) -> Result<(), SchemaError> {
        if !self.definitions.contains_key(child_type) {
            return Err(SchemaError::UnknownType(child_type.to_string()));
        }

        let parent = self
            .definitions
            .get_mut(parent_type)
            .ok_or_else(|| SchemaError::UnknownType(parent_type.to_string()))?;

        if parent.children.iter().any(|c| c.path == path) {
            return Err(SchemaError::DuplicateChild {
                parent: parent_type.to_string(),
                path: path.to_string(),
            });
        }

        parent.children.push(ChildRegistration {
            path,
            resource_type: child_type.to_string(),
        });
        Ok(())
    }

    pub fn definition(&self, resource_type: &str) -> Result<&ResourceDefinition, SchemaError> {
        self.definitions
            .get(resource_type)
            .ok_or_else(|| SchemaError::UnknownType(resource_type.to_string()))
    }

    pub fn root(&self) -> &ResourceDefinition {
        // The root definition is inserted by `new` and never removed
        &self.definitions[ROOT_TYPE]
    }

    /// Resolve the definition governing a concrete address
    pub fn resolve(&self, address: &ResourceAddress) -> Result<&ResourceDefinition, SchemaError> {
        let mut current = self.root();
        for element in address.elements() {
            let registration = current
                .child_registration(element)
                .ok_or_else(|| SchemaError::NoRegistration(address.clone()))?;
            current = self.definition(&registration.resource_type)?;
        }
        Ok(current)
    }

    /// Type-coerce and check a raw attribute value
    pub fn validate_value(
        &self,
        resource_type: &str,
        attribute: &str,
        raw: ModelValue,
    ) -> Result<ModelValue, ValidationError> {
        let definition = self.definition(resource_type).map_err(|_| {
            ValidationError::UnknownAttribute {
                resource_type: resource_type.to_string(),
                attribute: attribute.to_string(),
            }
        })?;
        definition.require_attribute(attribute)?.validate(raw)
    }

    /// Check every constraint of a type against a prospective attribute map
    pub fn check_constraints(
        &self,
        resource_type: &str,
        attributes: &IndexMap<String, ModelValue>,
    ) -> Result<(), SchemaError> {
        Ok(self.definition(resource_type)?.check_constraints(attributes)?)
    }

    /// Stored value, or the declared default when undefined
    pub fn resolve_for_read(
        &self,
        resource_type: &str,
        attribute: &str,
        stored: &ModelValue,
    ) -> Result<ModelValue, ValidationError> {
        let definition = self.definition(resource_type).map_err(|_| {
            ValidationError::UnknownAttribute {
                resource_type: resource_type.to_string(),
                attribute: attribute.to_string(),
            }
        })?;
        Ok(definition.require_attribute(attribute)?.resolve_for_read(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::attribute::AttributeType;

    fn pool_definition() -> ResourceDefinition {
        ResourceDefinition::new("pool")
            .with_attribute(
                AttributeDefinition::new("max-pool-size", AttributeType::Int).with_default(20),
            )
            .with_attribute(
                AttributeDefinition::new("derive-size", AttributeType::String)
                    .with_allowed_values(["none", "from-cpu-count"])
                    .with_undefined_alias("none"),
            )
            .with_constraint(Constraint::alternatives(["max-pool-size", "derive-size"]))
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(pool_definition()).unwrap();
        registry
            .register(
                ResourceDefinition::new("demo")
                    .with_child(PathElement::wildcard("pool").unwrap(), "pool"),
            )
            .unwrap();
        registry
            .register_child(ROOT_TYPE, PathElement::new("subsystem", "demo").unwrap(), "demo")
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_through_wildcard() {
        let registry = registry();
        let address = ResourceAddress::parse("/subsystem=demo/pool=a").unwrap();
        assert_eq!(registry.resolve(&address).unwrap().name(), "pool");
        assert_eq!(registry.resolve(&ResourceAddress::root()).unwrap().name(), ROOT_TYPE);
    }

    #[test]
    fn test_resolve_unknown_path() {
        let registry = registry();
        let address = ResourceAddress::parse("/subsystem=other").unwrap();
        assert!(matches!(
            registry.resolve(&address),
            Err(SchemaError::NoRegistration(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        assert_eq!(
            registry.register(pool_definition()),
            Err(SchemaError::DuplicateType("pool".to_string()))
        );
        assert!(matches!(
            registry.register_child(ROOT_TYPE, PathElement::new("subsystem", "demo").unwrap(), "demo"),
            Err(SchemaError::DuplicateChild { .. })
        ));
    }

    #[test]
    fn test_constraint_must_name_declared_attributes() {
        let mut registry = SchemaRegistry::new();
        let broken = ResourceDefinition::new("broken")
            .with_constraint(Constraint::alternatives(["a", "b"]));
        assert!(matches!(
            registry.register(broken),
            Err(SchemaError::UndeclaredConstraintAttribute { .. })
        ));
    }

    #[test]
    fn test_schema_contracts() {
        let registry = registry();
        assert_eq!(
            registry.validate_value("pool", "max-pool-size", ModelValue::from("4")).unwrap(),
            ModelValue::Int(4)
        );
        assert!(matches!(
            registry.validate_value("pool", "unknown", ModelValue::Int(1)),
            Err(ValidationError::UnknownAttribute { .. })
        ));
        assert_eq!(
            registry
                .resolve_for_read("pool", "max-pool-size", &ModelValue::Undefined)
                .unwrap(),
            ModelValue::Int(20)
        );

        let mut attrs = pool_definition().undefined_attributes();
        attrs.insert("max-pool-size".to_string(), ModelValue::Int(1));
        assert!(registry.check_constraints("pool", &attrs).is_ok());
        attrs.insert("derive-size".to_string(), ModelValue::from("from-cpu-count"));
        assert!(matches!(
            registry.check_constraints("pool", &attrs),
            Err(SchemaError::Constraint(_))
        ));
    }

    #[test]
    fn test_check_constraints_unknown_type() {
        let registry = SchemaRegistry::new();
        let attrs = pool_definition().undefined_attributes();
        assert_eq!(
            registry.check_constraints("pool", &attrs),
            Err(SchemaError::UnknownType("pool".to_string()))
        );
    }
}
