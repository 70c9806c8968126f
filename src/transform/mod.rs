// Copyright (c) 2025 - Cowboy AI, Inc.
//! Version Transformation
//!
//! The tree always holds the current model version. Consumers bound to an
//! older version see it through transformers applied at the boundary:
//!
//! ```text
//!                outbound (descending)
//! current 5.0.0 ──> 4.0.0 rules ──> 3.0.0 rules ──> legacy view
//!
//!                inbound (ascending)
//! legacy op ──> 3.0.0 rules ──> 4.0.0 rules ──> current op ──> engine
//! ```
//!
//! Transformers are registered per (resource type, version) in an explicit
//! [`TransformerRegistry`]. They are pure: a rejection leaves the tree and the
//! request untouched.

pub mod description;
pub mod registry;

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::ModelVersion;

pub use description::{AttributeRule, ResourceTransformer, TransformationDescription};
pub use registry::TransformerRegistry;

/// Transformation rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Attribute '{attribute}' does not support expressions in model version {version}")]
    RejectedExpression {
        attribute: String,
        version: ModelVersion,
    },

    #[error("Attribute '{attribute}' must be undefined for model version {version}")]
    RejectedDefined {
        attribute: String,
        version: ModelVersion,
    },

    #[error("Attribute '{attribute}' is not known to model version {version}")]
    UnknownAttribute {
        attribute: String,
        version: ModelVersion,
    },

    #[error("Child resources of type '{child_type}' are not supported by model version {version}")]
    RejectedChild {
        child_type: String,
        version: ModelVersion,
    },

    #[error("Model version {version} of subsystem '{subsystem}' is not supported")]
    UnsupportedVersion {
        subsystem: String,
        version: ModelVersion,
    },
}

/// Versions a single subsystem is transformed between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationContext {
    pub subsystem: String,
    pub current: ModelVersion,
    pub target: ModelVersion,
}

impl TransformationContext {
    /// Whether a description registered at `version` takes part in this crossing
    pub fn includes(&self, version: ModelVersion) -> bool {
        version >= self.target && version < self.current
    }
}

/// Model versions a caller is bound to, per subsystem
///
/// Subsystems without an entry are read and written at their current version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionBinding {
    versions: HashMap<String, ModelVersion>,
}

impl VersionBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, subsystem: impl Into<String>, version: ModelVersion) -> Self {
        self.versions.insert(subsystem.into(), version);
        self
    }

    pub fn version_for(&self, subsystem: &str) -> Option<ModelVersion> {
        self.versions.get(subsystem).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
