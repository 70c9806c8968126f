// Copyright (c) 2025 - Cowboy AI, Inc.
//! Read Views
//!
//! What a read step sees of a stored resource. Callers at the current model
//! version see stored values as they are; callers bound to an older version
//! see them through that version's transformer chain, so a read fails
//! wherever the same resource could not be represented to them.

use std::borrow::Cow;

use crate::domain::{ModelValue, ResourceAddress};
use crate::errors::OperationError;
use crate::tree::Resource;

/// Presentation of stored resources to read steps
pub trait ReadView: Send + Sync {
    /// Resource at `address` as the caller sees it; children only need their
    /// names unless `recursive`
    fn resource<'a>(
        &self,
        address: &ResourceAddress,
        resource: &'a Resource,
        recursive: bool,
    ) -> Result<Cow<'a, Resource>, OperationError>;

    /// Value of the current-version attribute `name` as the caller sees it
    fn attribute(
        &self,
        address: &ResourceAddress,
        resource: &Resource,
        name: &str,
    ) -> Result<ModelValue, OperationError>;
}

/// Stored values, untransformed
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentView;

impl ReadView for CurrentView {
    fn resource<'a>(
        &self,
        _address: &ResourceAddress,
        resource: &'a Resource,
        _recursive: bool,
    ) -> Result<Cow<'a, Resource>, OperationError> {
        Ok(Cow::Borrowed(resource))
    }

    fn attribute(
        &self,
        _address: &ResourceAddress,
        resource: &Resource,
        name: &str,
    ) -> Result<ModelValue, OperationError> {
        Ok(resource.attribute(name).cloned().unwrap_or_default())
    }
}
