// Copyright (c) 2025 - Cowboy AI, Inc.
//! Management Model Value Objects
//!
//! Immutable value types shared by the tree, schema, operation and
//! transformation layers.
//!
//! - [`ResourceAddress`] / [`PathElement`] - addressing into the resource tree
//! - [`ModelValue`] - typed attribute values with first-class `Undefined`
//! - [`ModelVersion`] - schema version of a subsystem model
//! - [`ExpressionResolver`] - `${name:default}` resolution

pub mod address;
pub mod expression;
pub mod value;
pub mod version;

pub use address::{AddressError, PathElement, ResourceAddress};
pub use expression::{is_expression, ExpressionResolver};
pub use value::{ModelValue, ValueError};
pub use version::{ModelVersion, VersionError};
