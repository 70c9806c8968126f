// Copyright (c) 2025 - Cowboy AI, Inc.
//! Boot Document Parsing
//!
//! A subsystem document is turned into the `add` operations that build its
//! part of the tree:
//!
//! ```text
//! <subsystem xmlns="urn:jboss:domain:ejb3:5.0"          add /subsystem=ejb3
//!            default-mdb-instance-pool="mdb">               default-mdb-instance-pool=mdb
//!     <strict-max-bean-instance-pool name="mdb"         add /subsystem=ejb3/strict-max-bean-instance-pool=mdb
//!            derive-size="from-cpu-count"/>                 derive-size=from-cpu-count
//! </subsystem>
//! ```
//!
//! Element names are child types, the `name` XML attribute is the instance
//! name and every other XML attribute is a resource attribute. Values are
//! passed through as strings; the operation engine coerces and validates
//! them, so the operations are executed as one composite on an empty tree.
//!
//! A document declaring an older schema version than its subsystem's model
//! is held to that version: its `add`s pass through the inbound transformers
//! exactly as operations from a caller bound to that version would.

pub mod xml;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{ModelValue, ModelVersion, ResourceAddress};
use crate::extension::ManagementModel;
use crate::operation::Operation;
use crate::transform::{TransformError, VersionBinding};

pub use xml::{parse_document, ParsedElement};

/// Root element of every subsystem document
pub const SUBSYSTEM_ELEMENT: &str = "subsystem";

/// XML attribute holding a child resource's instance name
pub const NAME_ATTRIBUTE: &str = "name";

const XMLNS: &str = "xmlns";

/// Boot document errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Subsystem element declares no namespace")]
    MissingNamespace,

    #[error("Invalid namespace '{0}', expected urn:<vendor>:domain:<subsystem>:<major>.<minor>")]
    InvalidNamespace(String),

    #[error("No subsystem is registered for namespace '{0}'")]
    UnknownNamespace(String),

    #[error("Unexpected root element <{0}>, expected <subsystem>")]
    UnexpectedRoot(String),

    #[error("Element <{element}> requires a 'name' attribute")]
    MissingName { element: String },

    #[error("Unexpected element <{element}> in <{parent}>")]
    UnknownElement { parent: String, element: String },

    #[error("Unexpected attribute '{attribute}' on <{element}>")]
    UnknownAttribute { element: String, attribute: String },

    /// Content the document's schema version cannot express
    #[error("Unsupported content for schema version {version}: {source}")]
    UnsupportedContent {
        version: ModelVersion,
        source: TransformError,
    },

    /// Document was well-formed but its operations failed
    #[error("Boot operations rejected: {0}")]
    Rejected(String),
}

/// Parts of a subsystem namespace URN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootNamespace {
    pub vendor: String,
    pub subsystem: String,
    pub schema_version: ModelVersion,
}

/// Parse `urn:<vendor>:domain:<subsystem>:<major>.<minor>`
pub fn parse_namespace(namespace: &str) -> Result<BootNamespace, BootError> {
    let invalid = || BootError::InvalidNamespace(namespace.to_string());

    match namespace.split(':').collect::<Vec<_>>().as_slice() {
        ["urn", vendor, "domain", subsystem, version]
            if !vendor.is_empty() && !subsystem.is_empty() =>
        {
            let schema_version = version.parse::<ModelVersion>().map_err(|_| invalid())?;
            Ok(BootNamespace {
                vendor: vendor.to_string(),
                subsystem: subsystem.to_string(),
                schema_version,
            })
        }
        _ => Err(invalid()),
    }
}

/// Translate a subsystem document into `add` operations, parents first
pub fn boot_operations(model: &ManagementModel, document: &str) -> Result<Vec<Operation>, BootError> {
    let root = parse_document(document)?;
    if root.name != SUBSYSTEM_ELEMENT {
        return Err(BootError::UnexpectedRoot(root.name));
    }

    let namespace = root.attribute(XMLNS).ok_or(BootError::MissingNamespace)?;
    let parsed = parse_namespace(namespace)?;
    let subsystem = model
        .subsystem_for_namespace(namespace)
        .ok_or_else(|| BootError::UnknownNamespace(namespace.to_string()))?;

    info!(
        subsystem = %subsystem.name,
        schema_version = %parsed.schema_version,
        "Parsing subsystem document"
    );

    let address = ResourceAddress::root()
        .child(SUBSYSTEM_ELEMENT, &subsystem.name)
        .map_err(|e| BootError::Malformed(e.to_string()))?;

    // Older documents are read the way a caller bound to that version writes
    let legacy = (parsed.schema_version < subsystem.current_version).then(|| LegacyDocument {
        binding: VersionBinding::new().bind(&subsystem.name, parsed.schema_version),
        version: parsed.schema_version,
    });

    let mut operations = Vec::new();
    collect_operations(model, legacy.as_ref(), &root, address, &mut operations)?;
    debug!(count = operations.len(), "Boot operations collected");
    Ok(operations)
}

/// Document whose schema version is older than its subsystem's model
struct LegacyDocument {
    binding: VersionBinding,
    version: ModelVersion,
}

fn collect_operations(
    model: &ManagementModel,
    legacy: Option<&LegacyDocument>,
    element: &ParsedElement,
    address: ResourceAddress,
    operations: &mut Vec<Operation>,
) -> Result<(), BootError> {
    let definition = model.schema().resolve(&address).map_err(|_| BootError::UnknownElement {
        parent: parent_element_name(&address),
        element: element.name.clone(),
    })?;

    let mut add = Operation::add(address.clone());
    for (key, value) in resource_attributes(element, address.len() > 1) {
        if definition.attribute(key).is_none() {
            return Err(BootError::UnknownAttribute {
                element: element.name.clone(),
                attribute: key.to_string(),
            });
        }
        add = add.with_parameter(key, ModelValue::from(value));
    }
    if let Some(legacy) = legacy {
        add = legacy_add(model, legacy, element, add)?;
    }
    operations.push(add);

    for child in &element.children {
        let name = child.attribute(NAME_ATTRIBUTE).ok_or_else(|| BootError::MissingName {
            element: child.name.clone(),
        })?;
        let child_address = address
            .child(&child.name, name)
            .map_err(|e| BootError::Malformed(e.to_string()))?;
        collect_operations(model, legacy, child, child_address, operations)?;
    }
    Ok(())
}

/// Rewrite an `add` read from an older document into current terms
fn legacy_add(
    model: &ManagementModel,
    legacy: &LegacyDocument,
    element: &ParsedElement,
    add: Operation,
) -> Result<Operation, BootError> {
    model
        .transformers()
        .transform_operation(model.schema(), &add, &legacy.binding)
        .map_err(|e| match e {
            TransformError::UnknownAttribute { attribute, .. } => BootError::UnknownAttribute {
                element: element.name.clone(),
                attribute,
            },
            TransformError::RejectedChild { .. } => BootError::UnknownElement {
                parent: parent_element_name(&add.address),
                element: element.name.clone(),
            },
            source => BootError::UnsupportedContent {
                version: legacy.version,
                source,
            },
        })
}

/// XML attributes that become resource attributes
fn resource_attributes(element: &ParsedElement, named: bool) -> impl Iterator<Item = (&str, &str)> {
    element
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .filter(move |(key, _)| {
            !(*key == XMLNS || key.starts_with("xmlns:") || (named && *key == NAME_ATTRIBUTE))
        })
}

fn parent_element_name(address: &ResourceAddress) -> String {
    address
        .parent()
        .and_then(|p| p.last().map(|e| e.key().to_string()))
        .unwrap_or_else(|| SUBSYSTEM_ELEMENT.to_string())
}
