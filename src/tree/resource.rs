// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Nodes
//!
//! A [`Resource`] holds exactly the attribute keys its type declares (missing
//! values are `Undefined`, never absent keys) and its children grouped by
//! child type. Insertion order is kept for enumeration only.

use indexmap::IndexMap;

use crate::domain::{ModelValue, PathElement};

/// Children of one resource: child type → (child name → resource)
pub type Children = IndexMap<String, IndexMap<String, Resource>>;

/// A node of the resource tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    resource_type: String,
    attributes: IndexMap<String, ModelValue>,
    children: Children,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, attributes: IndexMap<String, ModelValue>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes,
            children: IndexMap::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn attributes(&self) -> &IndexMap<String, ModelValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&ModelValue> {
        self.attributes.get(name)
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn child(&self, element: &PathElement) -> Option<&Resource> {
        self.children
            .get(element.key())
            .and_then(|named| named.get(element.value()))
    }

    pub(crate) fn child_mut(&mut self, element: &PathElement) -> Option<&mut Resource> {
        self.children
            .get_mut(element.key())
            .and_then(|named| named.get_mut(element.value()))
    }

    /// Names of the children of one type, in insertion order
    pub fn child_names(&self, child_type: &str) -> Vec<&str> {
        self.children
            .get(child_type)
            .map(|named| named.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self) -> bool {
        self.children.values().any(|named| !named.is_empty())
    }

    /// Copy of the attribute map with one value substituted
    pub fn prospective_attributes(&self, name: &str, value: ModelValue) -> IndexMap<String, ModelValue> {
        let mut attributes = self.attributes.clone();
        if let Some(slot) = attributes.get_mut(name) {
            *slot = value;
        }
        attributes
    }

    /// Replace a stored value, returning the previous one
    pub(crate) fn replace_attribute(&mut self, name: &str, value: ModelValue) -> Option<ModelValue> {
        self.attributes
            .get_mut(name)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut IndexMap<String, ModelValue> {
        &mut self.attributes
    }

    /// Insert a child at `index` within its type group (appends when out of range)
    pub(crate) fn insert_child(&mut self, element: &PathElement, child: Resource, index: Option<usize>) {
        let named = self
            .children
            .entry(element.key().to_string())
            .or_default();
        match index {
            Some(i) if i <= named.len() => {
                named.shift_insert(i, element.value().to_string(), child);
            }
            _ => {
                named.insert(element.value().to_string(), child);
            }
        }
    }

    /// Append a child by raw type and name (views built from validated trees)
    pub(crate) fn push_child(&mut self, child_type: &str, name: &str, child: Resource) {
        self.children
            .entry(child_type.to_string())
            .or_default()
            .insert(name.to_string(), child);
    }

    /// Copy keeping attributes and child names; children carry no attributes
    pub fn shallow(&self) -> Resource {
        let mut copy = Resource::new(self.resource_type.clone(), self.attributes.clone());
        for (child_type, named) in &self.children {
            for (name, child) in named {
                copy.push_child(child_type, name, Resource::new(child.resource_type(), IndexMap::new()));
            }
        }
        copy
    }

    /// Remove a child, returning it with its position in the type group
    pub(crate) fn take_child(&mut self, element: &PathElement) -> Option<(Resource, usize)> {
        let named = self.children.get_mut(element.key())?;
        let (index, _, child) = named.shift_remove_full(element.value())?;
        if named.is_empty() {
            self.children.shift_remove(element.key());
        }
        Some((child, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_keeps_child_names_only() {
        let mut attributes = IndexMap::new();
        attributes.insert("max-pool-size".to_string(), ModelValue::from(20));
        let mut subsystem = Resource::new("ejb3", IndexMap::new());
        subsystem.push_child("strict-max-bean-instance-pool", "slsb", Resource::new("pool", attributes));

        let shallow = subsystem.shallow();
        let child = &shallow.children()["strict-max-bean-instance-pool"]["slsb"];
        assert_eq!(child.resource_type(), "pool");
        assert!(child.attributes().is_empty());
        assert_eq!(shallow.child_names("strict-max-bean-instance-pool"), vec!["slsb"]);
    }
}
