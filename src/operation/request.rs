// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Requests
//!
//! Wire format of a management operation:
//!
//! ```json
//! {
//!   "operation": "write-attribute",
//!   "address": [{"subsystem": "ejb3"}, {"strict-max-bean-instance-pool": "slsb"}],
//!   "name": "max-pool-size",
//!   "value": 10,
//!   "operation-headers": {"correlation-id": "0190c6a4-..."}
//! }
//! ```
//!
//! Keys the request does not name explicitly are collected as parameters.
//! Only `add` accepts them (as attribute values); the engine fails any other
//! operation that carries one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::{ModelValue, ResourceAddress};

/// Operation names understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Remove,
    ReadAttribute,
    WriteAttribute,
    UndefineAttribute,
    ReadResource,
    Composite,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
            OperationKind::ReadAttribute => "read-attribute",
            OperationKind::WriteAttribute => "write-attribute",
            OperationKind::UndefineAttribute => "undefine-attribute",
            OperationKind::ReadResource => "read-resource",
            OperationKind::Composite => "composite",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "add" => Some(OperationKind::Add),
            "remove" => Some(OperationKind::Remove),
            "read-attribute" => Some(OperationKind::ReadAttribute),
            "write-attribute" => Some(OperationKind::WriteAttribute),
            "undefine-attribute" => Some(OperationKind::UndefineAttribute),
            "read-resource" => Some(OperationKind::ReadResource),
            "composite" => Some(OperationKind::Composite),
            _ => None,
        }
    }

    /// Whether the operation never mutates the tree
    pub fn is_read(&self) -> bool {
        matches!(self, OperationKind::ReadAttribute | OperationKind::ReadResource)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request metadata carried alongside the operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationHeaders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationHeaders {
    pub fn is_empty(&self) -> bool {
        self.correlation_id.is_none()
    }
}

/// A management operation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Operation {
    pub operation: String,

    #[serde(default)]
    pub address: ResourceAddress,

    /// Attribute name for the attribute operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Value for `write-attribute`; absent means undefined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ModelValue>,

    /// Ordered steps of a `composite`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_defaults: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_expressions: Option<bool>,

    #[serde(default, skip_serializing_if = "OperationHeaders::is_empty")]
    pub operation_headers: OperationHeaders,

    /// Remaining request keys: attribute values of an `add`
    #[serde(flatten)]
    pub parameters: IndexMap<String, ModelValue>,
}

impl Operation {
    pub fn new(kind: OperationKind, address: ResourceAddress) -> Self {
        Self {
            operation: kind.as_str().to_string(),
            address,
            name: None,
            value: None,
            steps: Vec::new(),
            recursive: None,
            include_defaults: None,
            resolve_expressions: None,
            operation_headers: OperationHeaders::default(),
            parameters: IndexMap::new(),
        }
    }

    pub fn add(address: ResourceAddress) -> Self {
        Self::new(OperationKind::Add, address)
    }

    pub fn remove(address: ResourceAddress) -> Self {
        Self::new(OperationKind::Remove, address)
    }

    pub fn read_attribute(address: ResourceAddress, name: impl Into<String>) -> Self {
        let mut op = Self::new(OperationKind::ReadAttribute, address);
        op.name = Some(name.into());
        op
    }

    pub fn write_attribute(
        address: ResourceAddress,
        name: impl Into<String>,
        value: impl Into<ModelValue>,
    ) -> Self {
        let mut op = Self::new(OperationKind::WriteAttribute, address);
        op.name = Some(name.into());
        op.value = Some(value.into());
        op
    }

    pub fn undefine_attribute(address: ResourceAddress, name: impl Into<String>) -> Self {
        let mut op = Self::new(OperationKind::UndefineAttribute, address);
        op.name = Some(name.into());
        op
    }

    pub fn read_resource(address: ResourceAddress) -> Self {
        Self::new(OperationKind::ReadResource, address)
    }

    pub fn composite(steps: Vec<Operation>) -> Self {
        let mut op = Self::new(OperationKind::Composite, ResourceAddress::root());
        op.steps = steps;
        op
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    pub fn include_defaults(mut self, include: bool) -> Self {
        self.include_defaults = Some(include);
        self
    }

    pub fn resolve_expressions(mut self, resolve: bool) -> Self {
        self.resolve_expressions = Some(resolve);
        self
    }

    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.operation_headers.correlation_id = Some(id);
        self
    }

    /// Parsed operation name, `None` for names the engine does not know
    pub fn kind(&self) -> Option<OperationKind> {
        OperationKind::parse(&self.operation)
    }

    pub fn correlation_id(&self) -> Option<Uuid> {
        self.operation_headers.correlation_id
    }

    /// Number of composite steps, nested steps included
    pub fn step_count(&self) -> usize {
        self.steps.iter().map(|step| 1 + step.step_count()).sum()
    }

    /// Whether this operation (and every nested step) only reads
    pub fn is_read_only(&self) -> bool {
        match self.kind() {
            Some(OperationKind::Composite) => self.steps.iter().all(Operation::is_read_only),
            Some(kind) => kind.is_read(),
            None => true,
        }
    }
}
