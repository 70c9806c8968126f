// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the configuration model
//!
//! [`OperationError`] is what an operation fails with; it is always turned
//! into a `failed` outcome and never crosses the operation boundary.
//! [`ModelError`] covers everything outside a single operation: boot,
//! configuration, serialization and tree integrity.

use thiserror::Error;

use crate::boot::BootError;
use crate::domain::ValueError;
use crate::schema::{ConstraintViolation, SchemaError, ValidationError};
use crate::transform::TransformError;
use crate::tree::{IntegrityError, TreeError};

/// Errors that fail a single operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Address or attribute does not exist
    #[error("{0}")]
    NotFound(String),

    /// `add` targeting an already populated address
    #[error("{0}")]
    Duplicate(String),

    /// Non-recursive `remove` of a resource with children
    #[error("{0}")]
    HasChildren(String),

    /// Value fails type coercion, allowed values or range
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cross-attribute predicate failed
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolation),

    /// No safe representation at the caller's bound version
    #[error(transparent)]
    TransformRejection(#[from] TransformError),

    /// Expression could not be resolved on read
    #[error(transparent)]
    Expression(#[from] ValueError),

    /// Unknown operation name or malformed request
    #[error("{0}")]
    Unsupported(String),

    /// A composite step failed; all earlier steps were rolled back
    #[error("Composite operation failed and was rolled back. Step {step} failed: {source}")]
    CompositeStepFailed {
        step: usize,
        source: Box<OperationError>,
    },

    /// Stored resource no longer matches its schema
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl OperationError {
    pub fn missing_parameter(operation: &str, parameter: &str) -> Self {
        OperationError::Unsupported(format!(
            "Operation '{}' requires parameter '{}'",
            operation, parameter
        ))
    }

    /// Innermost error of a composite failure
    pub fn root_cause(&self) -> &OperationError {
        match self {
            OperationError::CompositeStepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<TreeError> for OperationError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(_) | TreeError::NoSuchAttribute { .. } => {
                OperationError::NotFound(err.to_string())
            }
            TreeError::Duplicate(_) => OperationError::Duplicate(err.to_string()),
            TreeError::HasChildren(_) => OperationError::HasChildren(err.to_string()),
            TreeError::RootImmutable => OperationError::Unsupported(err.to_string()),
            TreeError::Validation(e) => OperationError::Validation(e),
            TreeError::Constraint(e) => OperationError::ConstraintViolation(e),
            TreeError::Schema(e) => e.into(),
        }
    }
}

impl From<SchemaError> for OperationError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::NoRegistration(_) | SchemaError::UnknownType(_) => {
                OperationError::NotFound(err.to_string())
            }
            SchemaError::Constraint(violation) => OperationError::ConstraintViolation(violation),
            other => OperationError::Unsupported(other.to_string()),
        }
    }
}

/// Errors outside a single operation
#[derive(Debug, Error)]
pub enum ModelError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Boot document could not be turned into a model
    #[error("Boot failed: {0}")]
    Boot(#[from] BootError),

    /// Schema or extension registration failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Legacy view could not be produced
    #[error("Transformation failed: {0}")]
    Transform(#[from] TransformError),

    /// Tree invariant violated
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation expected to succeed (or fail) did not
    #[error("Unexpected outcome: {0}")]
    UnexpectedOutcome(String),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
