// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute Schema
//!
//! Per-resource-type attribute definitions, cross-attribute constraints and
//! the registry that maps addresses to definitions.
//!
//! # Contracts
//!
//! - `validate_value(type, attribute, raw)` → typed value or [`ValidationError`]
//! - `check_constraints(type, prospective_attributes)` → ok or [`ConstraintViolation`]
//! - `resolve_for_read(type, attribute, stored)` → stored value or declared default

pub mod attribute;
pub mod constraint;
pub mod registry;

pub use attribute::{AttributeDefinition, AttributeType, ValidationError};
pub use constraint::{check_constraints, Constraint, ConstraintResult, ConstraintViolation};
pub use registry::{ChildRegistration, ResourceDefinition, SchemaError, SchemaRegistry, ROOT_TYPE};
