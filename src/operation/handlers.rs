// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Handlers
//!
//! Handlers validate one operation against the tree as it currently stands
//! and describe the mutation as a [`ModelChange`]. They never mutate:
//!
//! ```text
//! handle_*(Schema, &Tree, Operation) → Result<ModelChange, OperationError>
//! apply_change(&mut Tree, ModelChange) → inverse ModelChange
//! ```
//!
//! The inverse returned by [`apply_change`] is what the engine records in
//! its undo log; replaying the log backwards restores the tree exactly.
//!
//! # Checks Performed Before Any Mutation
//!
//! - the address resolves (or, for `add`, the parent does and the target does not)
//! - every value passes the attribute schema
//! - the prospective attribute set satisfies every constraint of the type
//!
//! Child references are checked once the whole top-level operation has run,
//! so a composite may add a pool and point an attribute at it in any order.

use serde_json::{Map, Value};

use super::request::Operation;
use super::view::ReadView;
use crate::domain::{ExpressionResolver, ModelValue, ResourceAddress};
use crate::errors::OperationError;
use crate::schema::{AttributeDefinition, ConstraintViolation, SchemaRegistry, ValidationError};
use crate::tree::{Resource, ResourceTree};

/// A validated mutation of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChange {
    /// Insert a subtree; `index` restores a former position within its type group
    AddResource {
        address: ResourceAddress,
        resource: Resource,
        index: Option<usize>,
    },

    /// Remove the subtree at `address`
    RemoveResource { address: ResourceAddress },

    /// Store an already validated attribute value
    WriteAttribute {
        address: ResourceAddress,
        name: String,
        value: ModelValue,
    },
}

/// Apply a change, returning the change that undoes it
pub fn apply_change(tree: &mut ResourceTree, change: ModelChange) -> Result<ModelChange, OperationError> {
    match change {
        ModelChange::AddResource {
            address,
            resource,
            index,
        } => {
            tree.insert_at(&address, resource, index)?;
            Ok(ModelChange::RemoveResource { address })
        }
        ModelChange::RemoveResource { address } => {
            let (resource, index) = tree.remove(&address, true)?;
            Ok(ModelChange::AddResource {
                address,
                resource,
                index: Some(index),
            })
        }
        ModelChange::WriteAttribute {
            address,
            name,
            value,
        } => {
            let previous = tree.replace_attribute(&address, &name, value)?;
            Ok(ModelChange::WriteAttribute {
                address,
                name,
                value: previous,
            })
        }
    }
}

fn attribute_name<'a>(op: &'a Operation) -> Result<&'a str, OperationError> {
    op.name
        .as_deref()
        .ok_or_else(|| OperationError::missing_parameter(&op.operation, "name"))
}

fn unknown_attribute(address: &ResourceAddress, name: &str) -> OperationError {
    OperationError::NotFound(format!(
        "Attribute '{}' not found on resource {}",
        name, address
    ))
}

/// Validate an `add`: parent exists, target does not, parameters are valid
pub fn handle_add(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    op: &Operation,
) -> Result<ModelChange, OperationError> {
    let address = &op.address;
    let Some(parent) = address.parent() else {
        return Err(OperationError::Unsupported(
            "The root resource cannot be added".to_string(),
        ));
    };

    if tree.contains(address) {
        return Err(OperationError::Duplicate(format!("Duplicate resource {}", address)));
    }
    tree.get(&parent)?;

    let definition = schema.resolve(address)?;
    let mut attributes = definition.undefined_attributes();
    for (name, raw) in &op.parameters {
        let value = definition.require_attribute(name)?.validate(raw.clone())?;
        attributes.insert(name.clone(), value);
    }

    // Required attributes left out of the request
    for attribute in definition.attributes() {
        if !attributes[attribute.name()].is_defined() {
            attribute.validate(ModelValue::Undefined)?;
        }
    }
    definition.check_constraints(&attributes)?;

    Ok(ModelChange::AddResource {
        address: address.clone(),
        resource: Resource::new(definition.name(), attributes),
        index: None,
    })
}

/// Validate a `remove`: the resource exists and has no children unless recursive
pub fn handle_remove(tree: &ResourceTree, op: &Operation) -> Result<ModelChange, OperationError> {
    let address = &op.address;
    if address.is_root() {
        return Err(OperationError::Unsupported(
            "The root resource cannot be removed".to_string(),
        ));
    }

    if tree.get(address)?.has_children() && !op.recursive.unwrap_or(false) {
        return Err(OperationError::HasChildren(format!(
            "Resource {} has children; use a recursive remove",
            address
        )));
    }

    Ok(ModelChange::RemoveResource {
        address: address.clone(),
    })
}

fn attribute_change(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    address: &ResourceAddress,
    name: &str,
    raw: ModelValue,
) -> Result<ModelChange, OperationError> {
    let resource = tree.get(address)?;
    let definition = schema.definition(resource.resource_type())?;
    let value = definition
        .attribute(name)
        .ok_or_else(|| unknown_attribute(address, name))?
        .validate(raw)?;

    definition.check_constraints(&resource.prospective_attributes(name, value.clone()))?;

    Ok(ModelChange::WriteAttribute {
        address: address.clone(),
        name: name.to_string(),
        value,
    })
}

/// Validate a `write-attribute` against the prospective attribute set
pub fn handle_write_attribute(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    op: &Operation,
) -> Result<ModelChange, OperationError> {
    let name = attribute_name(op)?;
    let raw = op.value.clone().unwrap_or_default();
    attribute_change(schema, tree, &op.address, name, raw)
}

/// Validate an `undefine-attribute`; undefining may itself violate a constraint
pub fn handle_undefine_attribute(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    op: &Operation,
) -> Result<ModelChange, OperationError> {
    let name = attribute_name(op)?;
    attribute_change(schema, tree, &op.address, name, ModelValue::Undefined)
}

/// `read-attribute`: stored value, default when undefined, expressions on request
pub fn read_attribute(
    schema: &SchemaRegistry,
    resolver: &ExpressionResolver,
    tree: &ResourceTree,
    op: &Operation,
    view: &dyn ReadView,
) -> Result<Value, OperationError> {
    let name = attribute_name(op)?;
    let resource = tree.get(&op.address)?;
    let definition = schema.definition(resource.resource_type())?;
    let attribute = definition
        .attribute(name)
        .ok_or_else(|| unknown_attribute(&op.address, name))?;

    let stored = view.attribute(&op.address, resource, name)?;
    let value = if op.include_defaults.unwrap_or(true) {
        attribute.resolve_for_read(&stored)
    } else {
        stored
    };

    let value = if op.resolve_expressions.unwrap_or(false) {
        resolve_value(attribute, resolver, value)?
    } else {
        value
    };
    Ok(value.to_json())
}

/// Resolve expressions in a value and coerce the result to the attribute type
pub fn resolve_value(
    attribute: &AttributeDefinition,
    resolver: &ExpressionResolver,
    value: ModelValue,
) -> Result<ModelValue, OperationError> {
    let resolved = match value {
        ModelValue::Expression(text) => ModelValue::String(resolver.resolve(&text)?),
        ModelValue::List(items) => ModelValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    ModelValue::Expression(text) => resolver.resolve(&text).map(ModelValue::String),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        other => return Ok(other),
    };
    Ok(attribute.validate(resolved)?)
}

/// `read-resource`: the resource (and, when recursive, its subtree) as JSON
pub fn read_resource(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    op: &Operation,
    view: &dyn ReadView,
) -> Result<Value, OperationError> {
    let recursive = op.recursive.unwrap_or(false);
    let resource = view.resource(&op.address, tree.get(&op.address)?, recursive)?;
    Ok(render_resource(
        schema,
        &resource,
        op.include_defaults.unwrap_or(true),
        recursive,
    ))
}

/// Render a resource as a JSON object
///
/// Attributes come first, then one object per child type mapping child
/// names to their rendering (or `null` when not recursive). Attributes the
/// schema does not know (legacy views) are rendered as stored.
pub fn render_resource(
    schema: &SchemaRegistry,
    resource: &Resource,
    include_defaults: bool,
    recursive: bool,
) -> Value {
    let definition = schema.definition(resource.resource_type()).ok();
    let mut rendered = Map::new();

    for (name, stored) in resource.attributes() {
        let value = match definition.and_then(|d| d.attribute(name)) {
            Some(attribute) if include_defaults => attribute.resolve_for_read(stored),
            _ => stored.clone(),
        };
        rendered.insert(name.clone(), value.to_json());
    }

    for (child_type, named) in resource.children() {
        let children: Map<String, Value> = named
            .iter()
            .map(|(name, child)| {
                let value = if recursive {
                    render_resource(schema, child, include_defaults, true)
                } else {
                    Value::Null
                };
                (name.clone(), value)
            })
            .collect();
        rendered.insert(child_type.clone(), Value::Object(children));
    }

    Value::Object(rendered)
}

/// Every child-reference attribute of the resource names an existing child
pub fn check_references(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    address: &ResourceAddress,
) -> Result<(), OperationError> {
    // Removed again later in the same composite
    let Ok(resource) = tree.get(address) else {
        return Ok(());
    };
    let definition = schema.definition(resource.resource_type())?;

    for attribute in definition.attributes() {
        let Some(child_type) = attribute.referenced_child_type() else {
            continue;
        };
        if let Some(ModelValue::String(target)) = resource.attribute(attribute.name()) {
            if !resource.child_names(child_type).contains(&target.as_str()) {
                return Err(ValidationError::UnknownReference {
                    attribute: attribute.name().to_string(),
                    child_type: child_type.to_string(),
                    value: target.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// A removed resource is not still referenced by an attribute of its parent
pub fn check_removal(
    schema: &SchemaRegistry,
    tree: &ResourceTree,
    removed: &ResourceAddress,
) -> Result<(), OperationError> {
    // Re-added later in the same composite
    if tree.contains(removed) {
        return Ok(());
    }
    let (Some(parent_address), Some(element)) = (removed.parent(), removed.last()) else {
        return Ok(());
    };
    let Ok(parent) = tree.get(&parent_address) else {
        return Ok(());
    };
    let definition = schema.definition(parent.resource_type())?;

    for attribute in definition.attributes() {
        if attribute.referenced_child_type() != Some(element.key()) {
            continue;
        }
        if parent.attribute(attribute.name()).and_then(ModelValue::as_str) == Some(element.value()) {
            return Err(ConstraintViolation::new(
                format!(
                    "Resource {} is referenced by attribute '{}' of {}",
                    removed,
                    attribute.name(),
                    parent_address
                ),
                vec![attribute.name().to_string()],
            )
            .into());
        }
    }
    Ok(())
}
